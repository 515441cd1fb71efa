//! SQL text of the statements a table issues.
//!
//! Placeholders are `:1`, `:2`, ... in order of appearance, matching the
//! positional binds of [`Session`](crate::Session).

use super::condition::Predicate;
use crate::catalog::TableHandle;
use crate::types::ColumnMap;

/// Render a catalog identifier for use in SQL.
///
/// Names that Oracle would store unchanged when unquoted are emitted bare.
/// Anything else (lower case, spaces, reserved characters) is quoted.
pub fn identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '_' | '$' | '#'));
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// `OWNER.NAME` of a handle, quoted where needed.
pub fn table_name(table: &TableHandle) -> String {
    format!("{}.{}", identifier(&table.owner), identifier(&table.name))
}

fn with_predicate(mut sql: String, predicate: &Predicate) -> String {
    if !predicate.is_empty() {
        sql.push(' ');
        sql.push_str(&predicate.sql);
    }
    sql
}

fn placeholders(from: usize, count: usize) -> String {
    (from..from + count)
        .map(|n| format!(":{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `SELECT <every column> FROM owner.table [predicate]`.
///
/// The select list is explicit so each row lines up with the column map.
pub fn select(table: &TableHandle, columns: &ColumnMap, predicate: &Predicate) -> String {
    let list = columns
        .descriptors()
        .map(|desc| identifier(&desc.name))
        .collect::<Vec<_>>()
        .join(", ");
    with_predicate(format!("SELECT {} FROM {}", list, table_name(table)), predicate)
}

/// `SELECT COUNT(*) FROM owner.table [predicate]`.
pub fn count(table: &TableHandle, predicate: &Predicate) -> String {
    with_predicate(format!("SELECT COUNT(*) FROM {}", table_name(table)), predicate)
}

/// `INSERT INTO owner.table (a, b) VALUES (:1, :2)`.
pub fn insert(table: &TableHandle, columns: &[String]) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table_name(table),
        columns.join(", "),
        placeholders(1, columns.len())
    )
}

/// `UPDATE owner.table SET a = :1, b = :2 [predicate]`.
///
/// The predicate must number its placeholders from `columns.len() + 1`.
pub fn update(table: &TableHandle, columns: &[String], predicate: &Predicate) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = :{}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    with_predicate(
        format!("UPDATE {} SET {}", table_name(table), assignments),
        predicate,
    )
}

/// `DELETE FROM owner.table [predicate]`.
pub fn delete(table: &TableHandle, predicate: &Predicate) -> String {
    with_predicate(format!("DELETE FROM {}", table_name(table)), predicate)
}
