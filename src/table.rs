//! Record-level access to one table or view.

use std::ops::ControlFlow;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{TableColumns, TableHandle};
use crate::codec::RecordCodec;
use crate::cursor::{Cursor, RecordCursor};
use crate::error::{Error, Result};
use crate::query::{self, statement, Criteria, Predicate, Where};
use crate::schema::Schema;
use crate::session::Session;
use crate::types::{ColumnMap, OracleValue, Record, Value};

/// Records to insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertInput {
    Single(Record),
    /// Inserted one statement per record, in order.
    Batch(Vec<Record>),
}

impl From<Record> for InsertInput {
    fn from(record: Record) -> Self {
        InsertInput::Single(record)
    }
}

impl From<Vec<Record>> for InsertInput {
    fn from(records: Vec<Record>) -> Self {
        InsertInput::Batch(records)
    }
}

/// What a [`Table::select`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    First,
    All,
    Count,
}

/// Result of a [`Table::select`], shaped by its [`SelectMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selected {
    Record(Option<Record>),
    Records(Vec<Record>),
    Count(u64),
}

/// Column assignments and the rows they apply to.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub assignments: Record,
    pub filter: Where,
}

impl Update {
    /// Assign `assignments` to every row.
    pub fn set(assignments: Record) -> Self {
        Self {
            assignments,
            filter: Where::None,
        }
    }

    /// Builder: restrict the update to matching rows.
    pub fn filter(mut self, filter: impl Into<Where>) -> Self {
        self.filter = filter.into();
        self
    }
}

impl From<Record> for Update {
    fn from(assignments: Record) -> Self {
        Update::set(assignments)
    }
}

/// A resolved table or view of a [`Schema`].
///
/// Holds the schema mutably, so statements of different tables never
/// interleave on the session. The column map and its types are described on
/// first use, shared through the schema's cache and kept by the table, so a
/// cache clear does not affect a table already in use.
///
/// Every read takes `impl Into<Criteria>`:
///
/// ```no_run
/// use oracle_table_rs::{Criteria, OrderBy, Record, Schema, Session, Where, Result};
///
/// async fn demo<S: Session>(schema: &mut Schema<S>) -> Result<()> {
///     let mut employees = schema.table("test_employees").await?;
///
///     let first = employees.first("ORDER BY employee_id").await?;
///     let three = employees.count(Where::raw("WHERE employee_id <= :1", [3])).await?;
///     let smiths = employees
///         .all(Criteria::new(Record::new().with("last_name", "Smith"))
///             .order_by(OrderBy::column("employee_id")))
///         .await?;
///     # let _ = (first, three, smiths);
///     Ok(())
/// }
/// ```
pub struct Table<'s, S: Session> {
    schema: &'s mut Schema<S>,
    handle: TableHandle,
    described: Option<TableColumns>,
}

impl<'s, S: Session> Table<'s, S> {
    /// Resolve `name` in `schema`. `Ok(None)` when nothing matches.
    pub async fn find(schema: &'s mut Schema<S>, name: &str) -> Result<Option<Self>> {
        let handle = schema.resolve(name).await?;
        Ok(handle.map(|handle| Self {
            schema,
            handle,
            described: None,
        }))
    }

    /// The resolved table or view.
    pub fn handle(&self) -> &TableHandle {
        &self.handle
    }

    /// `OWNER.NAME` of the resolved object.
    pub fn name(&self) -> String {
        self.handle.qualified_name()
    }

    /// Column descriptors in position order.
    pub async fn columns(&mut self) -> Result<Arc<ColumnMap>> {
        Ok(self.described().await?.columns)
    }

    async fn described(&mut self) -> Result<TableColumns> {
        if let Some(described) = &self.described {
            return Ok(described.clone());
        }
        let described = self.schema.columns(&self.handle).await?;
        self.described = Some(described.clone());
        Ok(described)
    }

    /// Insert one record or a batch, one statement per record.
    ///
    /// Stops at the first failure; rows inserted before it are left to the
    /// caller's transaction. Returns the number of rows inserted.
    pub async fn insert(&mut self, input: impl Into<InsertInput>) -> Result<u64> {
        let records = match input.into() {
            InsertInput::Single(record) => vec![record],
            InsertInput::Batch(records) => records,
        };

        let TableColumns { columns, types } = self.described().await?;
        let table = self.name();
        let codec = RecordCodec::new(&table, &columns, &types);

        let mut inserted = 0;
        for record in &records {
            let encoded = codec.encode(record)?;
            if encoded.is_empty() {
                return Err(Error::encoding(&table, "*", "record has no fields to insert"));
            }
            let (names, binds) = split_columns(&columns, encoded);
            let sql = statement::insert(&self.handle, &names);
            inserted += self.execute(sql, &binds).await?;
        }
        Ok(inserted)
    }

    /// Insert positional rows for a fixed column list.
    ///
    /// ```no_run
    /// # use oracle_table_rs::{Schema, Session, Value, Result};
    /// # async fn demo<S: Session>(schema: &mut Schema<S>) -> Result<()> {
    /// let mut employees = schema.table("test_employees").await?;
    /// employees
    ///     .insert_values(
    ///         &["employee_id", "last_name"],
    ///         vec![
    ///             vec![Value::from(11), Value::from("Last 11")],
    ///             vec![Value::from(12), Value::from("Last 12")],
    ///         ],
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn insert_values(&mut self, columns: &[&str], rows: Vec<Vec<Value>>) -> Result<u64> {
        let table = self.name();
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != columns.len() {
                    return Err(Error::encoding(
                        &table,
                        "*",
                        format!(
                            "row {} has {} values for {} columns",
                            i + 1,
                            row.len(),
                            columns.len()
                        ),
                    ));
                }
                Ok(columns.iter().copied().zip(row).collect::<Record>())
            })
            .collect::<Result<Vec<_>>>()?;
        self.insert(InsertInput::Batch(records)).await
    }

    /// Run a select in the given mode.
    pub async fn select(&mut self, mode: SelectMode, criteria: impl Into<Criteria>) -> Result<Selected> {
        let criteria = criteria.into();
        Ok(match mode {
            SelectMode::First => Selected::Record(self.first(criteria).await?),
            SelectMode::All => Selected::Records(self.all(criteria).await?),
            SelectMode::Count => Selected::Count(self.count(criteria).await?),
        })
    }

    /// First matching record, if any.
    pub async fn first(&mut self, criteria: impl Into<Criteria>) -> Result<Option<Record>> {
        let mut cursor = self.open(criteria.into(), 1).await?;
        let record = cursor.next().await?;
        cursor.close().await?;
        Ok(record)
    }

    /// Every matching record.
    pub async fn all(&mut self, criteria: impl Into<Criteria>) -> Result<Vec<Record>> {
        let fetch_size = self.schema.config.fetch_size;
        self.open(criteria.into(), fetch_size).await?.fetch_all().await
    }

    /// Hand matching records to `callback` one at a time.
    ///
    /// Stops early when the callback returns `ControlFlow::Break`. Returns
    /// the number of records delivered.
    pub async fn all_with<F>(&mut self, criteria: impl Into<Criteria>, mut callback: F) -> Result<u64>
    where
        F: FnMut(Record) -> ControlFlow<()>,
    {
        let fetch_size = self.schema.config.fetch_size;
        let mut cursor = self.open(criteria.into(), fetch_size).await?;
        let mut delivered = 0;
        while let Some(record) = cursor.next().await? {
            delivered += 1;
            if callback(record).is_break() {
                break;
            }
        }
        cursor.close().await?;
        Ok(delivered)
    }

    /// Open a cursor over matching records.
    ///
    /// The cursor borrows the session; drop or exhaust it before issuing
    /// another statement.
    pub async fn stream(&mut self, criteria: impl Into<Criteria>) -> Result<RecordCursor<S::Rows<'_>>> {
        let fetch_size = self.schema.config.fetch_size;
        self.open(criteria.into(), fetch_size).await
    }

    /// Number of matching rows. Ordering is ignored.
    pub async fn count(&mut self, criteria: impl Into<Criteria>) -> Result<u64> {
        let criteria = criteria.into();
        let predicate = self.predicate(&criteria.filter, None, 1).await?;
        let sql = statement::count(&self.handle, &predicate);
        debug!(table = %self.handle, sql = %sql, binds = predicate.binds.len(), "counting");

        let mut rows = self
            .schema
            .session
            .query(&sql, &predicate.binds, 1)
            .await
            .map_err(|e| Error::statement(sql.clone(), e))?;
        let row = rows
            .next()
            .await
            .map_err(|e| Error::statement(sql.clone(), e))?
            .ok_or_else(|| Error::statement(sql.clone(), Error::driver("COUNT(*) returned no row")))?;
        rows.close().await.map_err(|e| Error::statement(sql.clone(), e))?;

        let count = row.get(0).and_then(OracleValue::to_i64).ok_or_else(|| {
            Error::type_conversion(format!("COUNT(*) returned {:?}", row.get(0)))
        })?;
        u64::try_from(count).map_err(|_| Error::type_conversion(format!("negative count {}", count)))
    }

    /// Update matching rows and return how many changed.
    ///
    /// An update without a condition touches every row. It is logged, and
    /// rejected when [`TableConfig::require_where_for_update`](crate::TableConfig)
    /// is set.
    pub async fn update(&mut self, update: impl Into<Update>) -> Result<u64> {
        let Update { assignments, filter } = update.into();
        if filter.is_none() {
            if self.schema.config.require_where_for_update {
                return Err(Error::UnguardedUpdate { table: self.name() });
            }
            warn!(table = %self.handle, "updating every row");
        }

        let TableColumns { columns, types } = self.described().await?;
        let table = self.name();
        let codec = RecordCodec::new(&table, &columns, &types);

        let encoded = codec.encode(&assignments)?;
        if encoded.is_empty() {
            return Err(Error::encoding(&table, "*", "nothing to update"));
        }
        let (names, mut binds) = split_columns(&columns, encoded);
        let predicate = query::build(&codec, &filter, None, names.len() + 1)?;
        let sql = statement::update(&self.handle, &names, &predicate);
        binds.extend(predicate.binds);
        self.execute(sql, &binds).await
    }

    /// Delete matching rows and return how many were removed.
    pub async fn delete(&mut self, filter: impl Into<Where>) -> Result<u64> {
        let predicate = self.predicate(&filter.into(), None, 1).await?;
        let sql = statement::delete(&self.handle, &predicate);
        self.execute(sql, &predicate.binds).await
    }

    async fn predicate(
        &mut self,
        filter: &Where,
        order_by: Option<&query::OrderBy>,
        first_bind: usize,
    ) -> Result<Predicate> {
        let TableColumns { columns, types } = self.described().await?;
        let table = self.name();
        let codec = RecordCodec::new(&table, &columns, &types);
        query::build(&codec, filter, order_by, first_bind)
    }

    async fn open(&mut self, criteria: Criteria, fetch_size: u32) -> Result<RecordCursor<S::Rows<'_>>> {
        let TableColumns { columns, types } = self.described().await?;
        let predicate = self
            .predicate(&criteria.filter, criteria.order_by.as_ref(), 1)
            .await?;
        let sql = statement::select(&self.handle, &columns, &predicate);
        debug!(table = %self.handle, sql = %sql, binds = predicate.binds.len(), "selecting");

        let rows = self
            .schema
            .session
            .query(&sql, &predicate.binds, fetch_size)
            .await
            .map_err(|e| Error::statement(sql.clone(), e))?;
        Ok(RecordCursor::new(
            rows,
            self.handle.qualified_name(),
            sql,
            columns,
            types,
        ))
    }

    async fn execute(&mut self, sql: String, binds: &[OracleValue]) -> Result<u64> {
        debug!(table = %self.handle, sql = %sql, binds = binds.len(), "executing");
        self.schema
            .session
            .execute(&sql, binds)
            .await
            .map_err(|e| Error::statement(sql, e))
    }
}

/// Split encoded `(key, bind)` pairs into SQL column names and binds.
fn split_columns(columns: &ColumnMap, encoded: Vec<(&str, OracleValue)>) -> (Vec<String>, Vec<OracleValue>) {
    encoded
        .into_iter()
        .map(|(key, bind)| {
            let name = columns
                .get(key)
                .map(|desc| statement::identifier(&desc.name))
                .unwrap_or_else(|| key.to_uppercase());
            (name, bind)
        })
        .unzip()
}
