//! Conditions and ordering, and their translation into SQL.

use super::statement::identifier;
use crate::codec::{encode_bind, RecordCodec};
use crate::error::{Error, Result};
use crate::types::{OracleValue, Record, Value};

/// Row filter of a select, update or delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Where {
    /// No condition: every row.
    #[default]
    None,
    /// SQL fragment with positional binds, passed through unchanged.
    ///
    /// The fragment may start with `WHERE` or `ORDER BY`; otherwise it is
    /// taken as a predicate and `WHERE` is prepended.
    Raw { sql: String, binds: Vec<Value> },
    /// Column equality conditions joined with `AND`.
    ///
    /// A NULL value matches with `IS NULL`.
    Match(Record),
}

impl Where {
    /// Raw fragment with positional binds.
    ///
    /// ```
    /// use oracle_table_rs::Where;
    ///
    /// let filter = Where::raw("WHERE employee_id <= :1", [3]);
    /// assert!(!filter.is_none());
    /// ```
    pub fn raw<I, V>(sql: impl Into<String>, binds: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Where::Raw {
            sql: sql.into(),
            binds: binds.into_iter().map(Into::into).collect(),
        }
    }

    /// Raw fragment without binds.
    pub fn sql(sql: impl Into<String>) -> Self {
        Where::Raw {
            sql: sql.into(),
            binds: Vec::new(),
        }
    }

    /// Check if this filter selects every row.
    ///
    /// A raw fragment with binds but no text is not "no condition"; it is
    /// rejected when the statement is built.
    pub fn is_none(&self) -> bool {
        match self {
            Where::None => true,
            Where::Raw { sql, binds } => sql.trim().is_empty() && binds.is_empty(),
            Where::Match(record) => record.is_empty(),
        }
    }
}

impl From<&str> for Where {
    fn from(sql: &str) -> Self {
        Where::sql(sql)
    }
}

impl From<String> for Where {
    fn from(sql: String) -> Self {
        Where::sql(sql)
    }
}

impl From<Record> for Where {
    fn from(record: Record) -> Self {
        Where::Match(record)
    }
}

/// Trailing `ORDER BY` of a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    /// Column names, checked against the table.
    Columns(Vec<String>),
    /// Clause text appended verbatim.
    Raw(String),
}

impl OrderBy {
    pub fn column(name: impl Into<String>) -> Self {
        OrderBy::Columns(vec![name.into()])
    }

    pub fn columns<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        OrderBy::Columns(names.into_iter().map(Into::into).collect())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        OrderBy::Raw(sql.into())
    }
}

/// Filter plus optional ordering.
///
/// Every table read accepts `impl Into<Criteria>`, so a raw string, a
/// [`Record`] of column values, a [`Where`] or an [`OrderBy`] can be passed
/// directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    pub filter: Where,
    pub order_by: Option<OrderBy>,
}

impl Criteria {
    /// Criteria matching every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(filter: impl Into<Where>) -> Self {
        Self {
            filter: filter.into(),
            order_by: None,
        }
    }

    /// Builder: set the ordering.
    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

impl From<Where> for Criteria {
    fn from(filter: Where) -> Self {
        Criteria::new(filter)
    }
}

impl From<&str> for Criteria {
    fn from(sql: &str) -> Self {
        Criteria::new(sql)
    }
}

impl From<String> for Criteria {
    fn from(sql: String) -> Self {
        Criteria::new(sql)
    }
}

impl From<Record> for Criteria {
    fn from(record: Record) -> Self {
        Criteria::new(record)
    }
}

impl From<OrderBy> for Criteria {
    fn from(order_by: OrderBy) -> Self {
        Criteria::all().order_by(order_by)
    }
}

/// Generated `WHERE ... ORDER BY ...` text and its binds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    /// Clause text, empty when there is neither a filter nor an ordering.
    pub sql: String,
    pub binds: Vec<OracleValue>,
}

impl Predicate {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Translate a filter and ordering into SQL.
///
/// Structured conditions are emitted in column order, not in the order of
/// the record, so equal input always yields identical text. Placeholders
/// are numbered from `first_bind`.
pub fn build(
    codec: &RecordCodec<'_>,
    filter: &Where,
    order_by: Option<&OrderBy>,
    first_bind: usize,
) -> Result<Predicate> {
    let mut predicate = match filter {
        Where::None => Predicate::default(),
        Where::Raw { sql, binds } => raw_predicate(codec, sql, binds)?,
        Where::Match(record) => match_predicate(codec, record, first_bind)?,
    };

    if let Some(order_by) = order_by {
        let clause = order_clause(codec, order_by)?;
        if !clause.is_empty() {
            if !predicate.sql.is_empty() {
                predicate.sql.push(' ');
            }
            predicate.sql.push_str(&clause);
        }
    }

    Ok(predicate)
}

fn raw_predicate(codec: &RecordCodec<'_>, sql: &str, binds: &[Value]) -> Result<Predicate> {
    let sql = sql.trim();
    if sql.is_empty() && !binds.is_empty() {
        return Err(Error::encoding(
            codec.table(),
            "where",
            format!("{} binds given without a condition", binds.len()),
        ));
    }

    let binds = binds
        .iter()
        .map(|value| {
            encode_bind(value).map_err(|e| Error::encoding(codec.table(), "where", e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    let sql = if sql.is_empty() || starts_with_clause(sql) {
        sql.to_string()
    } else {
        format!("WHERE {}", sql)
    };
    Ok(Predicate { sql, binds })
}

fn match_predicate(codec: &RecordCodec<'_>, record: &Record, first_bind: usize) -> Result<Predicate> {
    let columns = codec.columns();
    if let Some(unknown) = record.keys().find(|k| !columns.contains(k)) {
        return Err(Error::encoding(codec.table(), unknown, "no such column"));
    }

    let mut conditions = Vec::with_capacity(record.len());
    let mut binds = Vec::with_capacity(record.len());
    for (key, desc) in columns.iter() {
        let Some(value) = record.get(key) else {
            continue;
        };
        if value.is_null() {
            conditions.push(format!("{} IS NULL", identifier(&desc.name)));
        } else {
            binds.push(codec.encode_value(key, desc, value)?);
            conditions.push(format!(
                "{} = :{}",
                identifier(&desc.name),
                first_bind + binds.len() - 1
            ));
        }
    }

    let sql = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    Ok(Predicate { sql, binds })
}

fn order_clause(codec: &RecordCodec<'_>, order_by: &OrderBy) -> Result<String> {
    match order_by {
        OrderBy::Raw(sql) => Ok(sql.trim().to_string()),
        OrderBy::Columns(names) if names.is_empty() => Ok(String::new()),
        OrderBy::Columns(names) => {
            let keys = names
                .iter()
                .map(|name| {
                    codec
                        .columns()
                        .get(name)
                        .map(|desc| identifier(&desc.name))
                        .ok_or_else(|| Error::encoding(codec.table(), name, "no such column to order by"))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("ORDER BY {}", keys.join(", ")))
        }
    }
}

/// Check if a raw fragment already starts with `WHERE` or `ORDER BY`.
fn starts_with_clause(sql: &str) -> bool {
    let mut words = sql.split_whitespace();
    match words.next() {
        Some(w) if w.eq_ignore_ascii_case("WHERE") => true,
        Some(w) if w.eq_ignore_ascii_case("ORDER") => {
            words.next().is_some_and(|w| w.eq_ignore_ascii_case("BY"))
        }
        _ => false,
    }
}
