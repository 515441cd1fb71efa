//! Table registry bound to one session.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{self, normalize_identifier, CatalogCache, TableColumns, TableHandle};
use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::table::Table;

/// Entry point: a session plus the catalog cache of its current schema.
///
/// # Example
///
/// ```no_run
/// use oracle_table_rs::{Record, Schema, Session, Result};
///
/// async fn hire<S: Session>(session: S) -> Result<u64> {
///     let mut schema = Schema::new(session);
///     let inserted = schema
///         .table("test_employees")
///         .await?
///         .insert(Record::new().with("employee_id", 11).with("last_name", "Last 11"))
///         .await?;
///     schema.commit().await?;
///     Ok(inserted)
/// }
/// ```
pub struct Schema<S: Session> {
    pub(crate) session: S,
    current_schema: String,
    pub(crate) config: TableConfig,
    pub(crate) cache: Arc<CatalogCache>,
}

impl<S: Session> Schema<S> {
    /// Wrap a session, resolving unqualified names in its current schema.
    pub fn new(session: S) -> Self {
        let current_schema = session.current_schema().to_uppercase();
        Self {
            session,
            current_schema,
            config: TableConfig::default(),
            cache: Arc::new(CatalogCache::new()),
        }
    }

    /// Builder: replace the configuration.
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: share a catalog cache with other schemas of the same database.
    pub fn with_cache(mut self, cache: Arc<CatalogCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Schema that unqualified names resolve in.
    pub fn current_schema(&self) -> &str {
        &self.current_schema
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Look up a table, view or synonym by name.
    ///
    /// Returns `Ok(None)` when the name does not resolve.
    pub async fn find_table(&mut self, name: &str) -> Result<Option<Table<'_, S>>> {
        Table::find(self, name).await
    }

    /// Like [`find_table`](Self::find_table), but a missing table is
    /// [`Error::TableNotFound`].
    pub async fn table(&mut self, name: &str) -> Result<Table<'_, S>> {
        Table::find(self, name)
            .await?
            .ok_or_else(|| Error::TableNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve a name to the underlying table or view, using the cache.
    ///
    /// A name that cannot denote an object (empty, or more than two parts)
    /// resolves to `None`.
    pub async fn resolve(&mut self, name: &str) -> Result<Option<TableHandle>> {
        let Ok((owner, object)) = normalize_identifier(name) else {
            return Ok(None);
        };
        let key = match &owner {
            Some(owner) => format!("{}.{}", owner, object),
            None => object,
        };
        if let Some(handle) = self.cache.get_handle(&self.current_schema, &key) {
            return Ok(Some(handle));
        }

        debug!(schema = %self.current_schema, name = %key, "handle cache miss");
        let handle = catalog::resolve(
            &mut self.session,
            name,
            &self.current_schema,
            self.config.max_synonym_depth,
        )
        .await?;
        if let Some(handle) = &handle {
            self.cache.put_handle(&self.current_schema, &key, handle.clone());
        }
        Ok(handle)
    }

    /// Column map of a resolved table and the types it uses, via the cache.
    pub async fn columns(&mut self, handle: &TableHandle) -> Result<TableColumns> {
        if let Some(described) = self.cache.get_columns(handle) {
            return Ok(described);
        }

        debug!(table = %handle, "column cache miss");
        let (columns, types) = catalog::describe(
            &mut self.session,
            &self.cache,
            handle,
            self.config.max_type_depth,
        )
        .await?;
        let described = TableColumns {
            columns: Arc::new(columns),
            types: Arc::new(types),
        };
        self.cache.put_columns(handle, described.clone());
        Ok(described)
    }

    /// Commit the session's transaction.
    pub async fn commit(&mut self) -> Result<()> {
        self.session.commit().await
    }

    /// Roll back the session's transaction.
    pub async fn rollback(&mut self) -> Result<()> {
        self.session.rollback().await
    }

    /// Forget every cached handle, column map and type.
    ///
    /// Needed after DDL that changes a table, type or synonym.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }
}
