//! Value, record and metadata types.

mod column;
mod data_type;
mod metadata;
mod record;
mod row;
mod value;

pub use column::{CharUsed, ColumnDescriptor, ColumnMap};
pub use data_type::DataType;
pub use metadata::{ObjectKind, RawCollection, RawColumn, RawType, SynonymTarget};
pub use record::{Record, Value};
pub(crate) use record::field_key;
pub use row::{ColumnInfo, Row};
pub use value::{OracleCollection, OracleObject, OracleValue};
