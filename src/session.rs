//! The database session collaborator.
//!
//! A [`Session`] executes parameterized statements with positional binds and
//! answers catalog lookups. The catalog methods have default
//! implementations that query the Oracle data dictionary through
//! [`Session::query`]; a driver only has to supply statement execution and
//! transaction control.

use std::future::Future;
use std::str::FromStr;

use tracing::debug;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::types::{ObjectKind, OracleValue, RawCollection, RawColumn, RawType, Row, SynonymTarget};

/// Rows per roundtrip for data dictionary lookups.
const DICTIONARY_FETCH_SIZE: u32 = 100;

const OBJECT_SQL: &str = "SELECT object_type FROM all_objects \
     WHERE owner = :1 AND object_name = :2 AND object_type IN ('TABLE', 'VIEW')";

const SYNONYM_SQL: &str = "SELECT table_owner, table_name FROM all_synonyms \
     WHERE owner = :1 AND synonym_name = :2";

const TABLE_COLUMNS_SQL: &str = "SELECT column_id, column_name, data_type, data_type_owner, \
     data_length, data_precision, data_scale, char_used FROM all_tab_columns \
     WHERE owner = :1 AND table_name = :2 ORDER BY column_id";

const TYPE_SQL: &str = "SELECT typecode FROM all_types WHERE owner = :1 AND type_name = :2";

const TYPE_ATTRS_SQL: &str = "SELECT attr_no, attr_name, attr_type_name, attr_type_owner, \
     length, precision, scale, char_used FROM all_type_attrs \
     WHERE owner = :1 AND type_name = :2 ORDER BY attr_no";

const COLL_TYPE_SQL: &str = "SELECT coll_type, upper_bound, elem_type_name, elem_type_owner, \
     length, precision, scale, char_used FROM all_coll_types \
     WHERE owner = :1 AND type_name = :2";

/// A database session bound to one schema.
///
/// Sessions are single-threaded: every method takes `&mut self`, and the
/// cursor returned by [`query`](Session::query) borrows the session until it
/// is dropped, so statements never overlap.
///
/// Bind values are positional. `binds[0]` is bound to the first
/// placeholder in the statement text, whatever its name.
pub trait Session: Send {
    /// Cursor over the raw rows of a query.
    type Rows<'a>: Cursor<Item = Row> + Send
    where
        Self: 'a;

    /// Schema that unqualified names resolve in (upper case).
    fn current_schema(&self) -> &str;

    /// Execute a DML statement and return the number of affected rows.
    fn execute(
        &mut self,
        sql: &str,
        binds: &[OracleValue],
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Execute a query and return a cursor over its rows.
    ///
    /// Each row is aligned to the select list.
    fn query(
        &mut self,
        sql: &str,
        binds: &[OracleValue],
        fetch_size: u32,
    ) -> impl Future<Output = Result<Self::Rows<'_>>> + Send;

    /// Commit the current transaction.
    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Roll back the current transaction.
    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Look up a table or view by owner and name.
    ///
    /// Returns `None` for missing objects and for objects of other kinds.
    fn describe_object(
        &mut self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<ObjectKind>>> + Send {
        async move {
            let rows = dictionary_rows(self, OBJECT_SQL, owner, name).await?;
            Ok(rows
                .iter()
                .filter_map(|row| text(row, "OBJECT_TYPE").ok().flatten())
                .find_map(|t| ObjectKind::from_catalog(&t)))
        }
    }

    /// Look up a synonym by owner (`PUBLIC` for public synonyms) and name.
    fn describe_synonym(
        &mut self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<SynonymTarget>>> + Send {
        async move {
            let rows = dictionary_rows(self, SYNONYM_SQL, owner, name).await?;
            match rows.first() {
                Some(row) => Ok(Some(SynonymTarget::new(
                    required_text(row, "TABLE_OWNER")?,
                    required_text(row, "TABLE_NAME")?,
                ))),
                None => Ok(None),
            }
        }
    }

    /// Columns of a table or view in `column_id` order.
    ///
    /// An empty vector means the object does not exist (any more).
    fn describe_table(
        &mut self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = Result<Vec<RawColumn>>> + Send {
        async move {
            let rows = dictionary_rows(self, TABLE_COLUMNS_SQL, owner, name).await?;
            rows.iter()
                .map(|row| {
                    Ok(RawColumn {
                        column_id: required_number(row, "COLUMN_ID")?,
                        column_name: required_text(row, "COLUMN_NAME")?,
                        data_type: required_text(row, "DATA_TYPE")?,
                        data_type_owner: text(row, "DATA_TYPE_OWNER")?,
                        data_length: number(row, "DATA_LENGTH")?,
                        data_precision: number(row, "DATA_PRECISION")?,
                        data_scale: number(row, "DATA_SCALE")?,
                        char_used: text(row, "CHAR_USED")?,
                    })
                })
                .collect::<Result<Vec<_>>>()
        }
    }

    /// Look up a user-defined type with its attributes or element type.
    fn describe_type(
        &mut self,
        owner: &str,
        name: &str,
    ) -> impl Future<Output = Result<Option<RawType>>> + Send {
        async move {
            let rows = dictionary_rows(self, TYPE_SQL, owner, name).await?;
            let typecode = match rows.first() {
                Some(row) => required_text(row, "TYPECODE")?,
                None => return Ok(None),
            };

            let attributes = dictionary_rows(self, TYPE_ATTRS_SQL, owner, name)
                .await?
                .iter()
                .map(|row| raw_attribute(row, "ATTR_NO", "ATTR_NAME", "ATTR_TYPE_NAME", "ATTR_TYPE_OWNER"))
                .collect::<Result<Vec<_>>>()?;

            let collection = match dictionary_rows(self, COLL_TYPE_SQL, owner, name).await?.first() {
                Some(row) => Some(RawCollection {
                    coll_type: required_text(row, "COLL_TYPE")?,
                    upper_bound: number(row, "UPPER_BOUND")?,
                    element: RawColumn {
                        column_id: 1,
                        column_name: "ELEMENT".to_string(),
                        ..raw_attribute(row, "", "", "ELEM_TYPE_NAME", "ELEM_TYPE_OWNER")?
                    },
                }),
                None => None,
            };

            Ok(Some(RawType {
                owner: owner.to_string(),
                name: name.to_string(),
                typecode,
                attributes,
                collection,
            }))
        }
    }
}

/// Run a dictionary query with `(owner, name)` binds and fetch every row.
async fn dictionary_rows<S: Session + ?Sized>(
    session: &mut S,
    sql: &str,
    owner: &str,
    name: &str,
) -> Result<Vec<Row>> {
    debug!(owner, name, sql, "catalog lookup");
    let binds = [
        OracleValue::String(owner.to_string()),
        OracleValue::String(name.to_string()),
    ];
    let mut cursor = session
        .query(sql, &binds, DICTIONARY_FETCH_SIZE)
        .await
        .map_err(|e| Error::statement(sql, e))?;
    cursor.fetch_all().await.map_err(|e| Error::statement(sql, e))
}

/// Shared shape of `ALL_TYPE_ATTRS` and `ALL_COLL_TYPES` rows.
///
/// An empty `id_column` or `name_column` leaves the field defaulted.
fn raw_attribute(
    row: &Row,
    id_column: &str,
    name_column: &str,
    type_column: &str,
    owner_column: &str,
) -> Result<RawColumn> {
    let column_id = if id_column.is_empty() {
        0
    } else {
        required_number(row, id_column)?
    };
    let column_name = if name_column.is_empty() {
        String::new()
    } else {
        required_text(row, name_column)?
    };
    Ok(RawColumn {
        column_id,
        column_name,
        data_type: required_text(row, type_column)?,
        data_type_owner: text(row, owner_column)?,
        data_length: number(row, "LENGTH")?,
        data_precision: number(row, "PRECISION")?,
        data_scale: number(row, "SCALE")?,
        char_used: text(row, "CHAR_USED")?,
    })
}

fn text(row: &Row, column: &str) -> Result<Option<String>> {
    match row.get_by_name(column) {
        None | Some(OracleValue::Null) => Ok(None),
        Some(OracleValue::String(s)) | Some(OracleValue::Number(s)) => Ok(Some(s.clone())),
        Some(other) => Err(Error::type_conversion(format!(
            "catalog column {} holds a {}, expected text",
            column,
            other.kind()
        ))),
    }
}

fn required_text(row: &Row, column: &str) -> Result<String> {
    text(row, column)?
        .ok_or_else(|| Error::type_conversion(format!("catalog column {} is NULL", column)))
}

fn number<T: FromStr>(row: &Row, column: &str) -> Result<Option<T>> {
    match text(row, column)? {
        None => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(|_| {
            Error::type_conversion(format!("catalog column {} is not a number: {}", column, s))
        }),
    }
}

fn required_number<T: FromStr>(row: &Row, column: &str) -> Result<T> {
    number(row, column)?
        .ok_or_else(|| Error::type_conversion(format!("catalog column {} is NULL", column)))
}
