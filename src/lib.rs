//! Record-level access to Oracle tables.
//!
//! A [`Schema`] wraps a database [`Session`] and resolves table, view and
//! synonym names to [`Table`]s. A table introspects its columns, including
//! object and collection types, and runs inserts, selects, counts, updates
//! and deletes built from [`Record`]s and [`Where`] conditions.
//!
//! The session is supplied by the caller: any driver that can run a
//! statement with positional binds and return rows can implement it.
//! Catalog lookups default to queries against the Oracle data dictionary.
//!
//! # Example
//!
//! ```no_run
//! use oracle_table_rs::{Record, Result, Schema, Session, Update, Where};
//!
//! async fn demo<S: Session>(session: S) -> Result<()> {
//!     let mut schema = Schema::new(session);
//!     let mut employees = schema.table("test_employees").await?;
//!
//!     // Column metadata
//!     for column in employees.columns().await?.descriptors() {
//!         println!("{} {}", column.name, column.data_type);
//!     }
//!
//!     // Insert and read back
//!     employees
//!         .insert(Record::new().with("employee_id", 1).with("last_name", "Last 1"))
//!         .await?;
//!     let first = employees.first("ORDER BY employee_id").await?;
//!     println!("{:?}", first);
//!
//!     // Update with a structured condition
//!     employees
//!         .update(
//!             Update::set(Record::new().with("first_name", "First 1"))
//!                 .filter(Record::new().with("employee_id", 1)),
//!         )
//!         .await?;
//!     assert_eq!(employees.count(Where::None).await?, 1);
//!
//!     schema.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod codec;
pub mod config;
pub mod cursor;
pub mod error;
pub mod query;
pub mod schema;
pub mod session;
pub mod table;
pub mod types;

// Re-export main types
pub use catalog::{CatalogCache, TableColumns, TableHandle, TypeDescriptor, TypeKey, TypeSet};
pub use codec::RecordCodec;
pub use config::TableConfig;
pub use cursor::{BufferedCursor, Cursor, CursorState, CursorStreamExt, RecordCursor};
pub use error::{Error, Result};
pub use query::{Criteria, OrderBy, Predicate, Where};
pub use schema::Schema;
pub use session::Session;
pub use table::{InsertInput, SelectMode, Selected, Table, Update};
pub use types::{
    CharUsed, ColumnDescriptor, ColumnInfo, ColumnMap, DataType, ObjectKind, OracleCollection,
    OracleObject, OracleValue, RawCollection, RawColumn, RawType, Record, Row, SynonymTarget,
    Value,
};
