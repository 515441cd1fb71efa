//! Cursors for iterating over query results.
//!
//! The `Cursor` trait defines the common interface. Sessions return a
//! cursor of raw [`Row`]s; [`RecordCursor`] wraps one and decodes each row
//! into a [`Record`] using the table's column map.

use std::future::Future;
use std::sync::Arc;

use futures::Stream;
use tracing::trace;

use crate::catalog::TypeSet;
use crate::codec::RecordCodec;
use crate::error::{Error, Result};
use crate::types::{ColumnMap, Record, Row};

/// Base trait for all cursor types.
///
/// Each cursor implementation specifies its Item type and implements
/// the async methods for fetching items. A cursor returned by a session
/// holds a mutable borrow of it, so only one statement is in flight per
/// session at a time.
///
/// # Example
///
/// ```no_run
/// use oracle_table_rs::{BufferedCursor, Cursor, Row};
///
/// async fn count_rows<C: Cursor<Item = Row>>(cursor: &mut C) -> u64 {
///     let mut count = 0;
///     while let Some(_) = cursor.next().await.unwrap() {
///         count += 1;
///     }
///     count
/// }
///
/// # async fn demo() {
/// let mut cursor = BufferedCursor::new(Vec::new());
/// assert_eq!(count_rows(&mut cursor).await, 0);
/// # }
/// ```
pub trait Cursor {
    /// The type of item this cursor yields.
    type Item;

    /// Number of items returned so far.
    fn rowcount(&self) -> u64;

    /// Check if the cursor is closed or exhausted.
    fn is_closed(&self) -> bool;

    /// Close the cursor and release server resources.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Get the next item.
    ///
    /// Returns `Ok(None)` when exhausted.
    fn next(&mut self) -> impl Future<Output = Result<Option<Self::Item>>> + Send;

    /// Fetch all remaining items into a vector.
    ///
    /// The cursor will be closed after this call.
    fn fetch_all(&mut self) -> impl Future<Output = Result<Vec<Self::Item>>> + Send;
}

/// Cursor over rows that were fetched in full up front.
///
/// Useful for session implementations whose driver returns the complete
/// result set of a statement at once.
#[derive(Debug)]
pub struct BufferedCursor {
    /// Buffered rows.
    buffer: Vec<Row>,
    /// Current position in buffer.
    buffer_pos: usize,
    /// Set once exhausted or closed.
    closed: bool,
}

impl BufferedCursor {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            buffer: rows,
            buffer_pos: 0,
            closed: false,
        }
    }

    /// Get the number of rows not yet returned.
    pub fn buffered_count(&self) -> usize {
        self.buffer.len().saturating_sub(self.buffer_pos)
    }
}

impl Cursor for BufferedCursor {
    type Item = Row;

    fn rowcount(&self) -> u64 {
        self.buffer_pos as u64
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.buffer.clear();
        self.buffer_pos = 0;
        Ok(())
    }

    async fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.closed {
            return Ok(None);
        }
        match self.buffer.get(self.buffer_pos) {
            Some(row) => {
                let row = row.clone();
                self.buffer_pos += 1;
                Ok(Some(row))
            }
            None => {
                self.closed = true;
                Ok(None)
            }
        }
    }

    async fn fetch_all(&mut self) -> Result<Vec<Self::Item>> {
        if self.closed {
            return Ok(Vec::new());
        }
        let rows = self.buffer.split_off(self.buffer_pos);
        self.buffer_pos += rows.len();
        self.closed = true;
        Ok(rows)
    }
}

/// Lifecycle of a [`RecordCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Statement executed, rows may be pending.
    Streaming,
    /// All rows returned, or the cursor was closed.
    Exhausted,
    /// Fetching or decoding a row failed. The cursor yields nothing more.
    Failed,
}

/// Forward-only cursor yielding decoded records.
///
/// Created by [`Table::stream`](crate::Table::stream). Not restartable:
/// re-run the select to iterate again.
pub struct RecordCursor<C> {
    inner: C,
    table: String,
    sql: String,
    columns: Arc<ColumnMap>,
    types: Arc<TypeSet>,
    state: CursorState,
    records: u64,
}

impl<C: Cursor<Item = Row> + Send> RecordCursor<C> {
    pub(crate) fn new(
        inner: C,
        table: String,
        sql: String,
        columns: Arc<ColumnMap>,
        types: Arc<TypeSet>,
    ) -> Self {
        Self {
            inner,
            table,
            sql,
            columns,
            types,
            state: CursorState::Streaming,
            records: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Column map used for decoding.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// SQL text of the underlying statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn decode(&self, row: &Row) -> Result<Record> {
        RecordCodec::new(&self.table, &self.columns, &self.types).decode(row)
    }
}

impl<C: Cursor<Item = Row> + Send> Cursor for RecordCursor<C> {
    type Item = Record;

    fn rowcount(&self) -> u64 {
        self.records
    }

    fn is_closed(&self) -> bool {
        self.state != CursorState::Streaming
    }

    async fn close(&mut self) -> Result<()> {
        if self.state == CursorState::Streaming {
            self.state = CursorState::Exhausted;
            self.inner
                .close()
                .await
                .map_err(|e| Error::statement(self.sql.clone(), e))?;
        }
        Ok(())
    }

    async fn next(&mut self) -> Result<Option<Self::Item>> {
        if self.state != CursorState::Streaming {
            return Ok(None);
        }

        let row = match self.inner.next().await {
            Ok(Some(row)) => row,
            Ok(None) => {
                self.state = CursorState::Exhausted;
                return Ok(None);
            }
            Err(e) => {
                self.state = CursorState::Failed;
                return Err(Error::statement(self.sql.clone(), e));
            }
        };

        match self.decode(&row) {
            Ok(record) => {
                self.records += 1;
                trace!(table = %self.table, row = self.records, "decoded row");
                Ok(Some(record))
            }
            Err(e) => {
                self.state = CursorState::Failed;
                Err(e)
            }
        }
    }

    async fn fetch_all(&mut self) -> Result<Vec<Self::Item>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }
}

/// Extension trait for converting Cursor to Stream.
///
/// # Example
///
/// ```no_run
/// use futures::stream::TryStreamExt;
/// use oracle_table_rs::{CursorStreamExt, Schema, Session, Where};
///
/// async fn names<S: Session>(schema: &mut Schema<S>) -> oracle_table_rs::Result<Vec<String>> {
///     let mut employees = schema.table("employees").await?;
///     let cursor = employees.stream(Where::None).await?;
///     cursor
///         .into_stream()
///         .map_ok(|record| record["first_name"].as_str().unwrap_or_default().to_string())
///         .try_collect()
///         .await
/// }
/// ```
pub trait CursorStreamExt: Cursor + Sized {
    /// Convert this cursor into a Stream yielding `Result<Item>`.
    ///
    /// The stream takes ownership of the cursor. Each call to `poll_next`
    /// will call `cursor.next()` internally.
    fn into_stream(self) -> impl Stream<Item = Result<Self::Item>>;
}

impl<C: Cursor> CursorStreamExt for C {
    fn into_stream(self) -> impl Stream<Item = Result<Self::Item>> {
        use futures::stream;

        stream::unfold(Some(self), |opt_cursor| async move {
            let mut cursor = opt_cursor?;
            match cursor.next().await {
                Ok(Some(item)) => Some((Ok(item), Some(cursor))),
                Ok(None) => None,
                // Stop after surfacing the error once.
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnInfo, OracleValue};
    use futures::TryStreamExt;

    fn rows(n: usize) -> Vec<Row> {
        let info = Arc::new(ColumnInfo::new(["N"]));
        (1..=n)
            .map(|i| Row::new(vec![OracleValue::Number(i.to_string())], info.clone()))
            .collect()
    }

    #[test]
    fn test_buffered_cursor_next() {
        tokio_test::block_on(async {
            let mut cursor = BufferedCursor::new(rows(2));
            assert_eq!(cursor.buffered_count(), 2);
            assert!(cursor.next().await.unwrap().is_some());
            assert!(cursor.next().await.unwrap().is_some());
            assert!(cursor.next().await.unwrap().is_none());
            assert!(cursor.is_closed());
            assert_eq!(cursor.rowcount(), 2);
        });
    }

    #[test]
    fn test_buffered_cursor_fetch_all_after_next() {
        tokio_test::block_on(async {
            let mut cursor = BufferedCursor::new(rows(3));
            cursor.next().await.unwrap();
            let rest = cursor.fetch_all().await.unwrap();
            assert_eq!(rest.len(), 2);
            assert_eq!(rest[0].get(0).unwrap().to_i64(), Some(2));
            assert_eq!(cursor.rowcount(), 3);
            assert!(cursor.fetch_all().await.unwrap().is_empty());
        });
    }

    #[tokio::test]
    async fn test_into_stream() {
        let values: Vec<i64> = BufferedCursor::new(rows(3))
            .into_stream()
            .map_ok(|row| row.get(0).and_then(OracleValue::to_i64).unwrap())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }
}
