//! Configuration for table resolution and statement generation.

/// Default limit on synonym hops while resolving a name.
pub const DEFAULT_MAX_SYNONYM_DEPTH: usize = 16;

/// Default limit on nested user-defined type levels.
pub const DEFAULT_MAX_TYPE_DEPTH: usize = 16;

/// Default number of rows requested per fetch roundtrip.
pub const DEFAULT_FETCH_SIZE: u32 = 100;

/// Settings shared by every table of a [`Schema`](crate::Schema).
///
/// # Example
///
/// ```
/// use oracle_table_rs::TableConfig;
///
/// let config = TableConfig::default()
///     .with_fetch_size(500)
///     .with_require_where_for_update(true);
/// assert_eq!(config.fetch_size, 500);
/// assert_eq!(config.max_synonym_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Maximum number of synonym hops before resolution fails.
    pub max_synonym_depth: usize,
    /// Maximum nesting of object/collection types in a column.
    pub max_type_depth: usize,
    /// Rows per fetch, forwarded to the session.
    pub fetch_size: u32,
    /// Reject `update` calls that carry no condition.
    pub require_where_for_update: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_synonym_depth: DEFAULT_MAX_SYNONYM_DEPTH,
            max_type_depth: DEFAULT_MAX_TYPE_DEPTH,
            fetch_size: DEFAULT_FETCH_SIZE,
            require_where_for_update: false,
        }
    }
}

impl TableConfig {
    /// Set the synonym hop limit.
    pub fn with_max_synonym_depth(mut self, depth: usize) -> Self {
        self.max_synonym_depth = depth;
        self
    }

    /// Set the type nesting limit.
    pub fn with_max_type_depth(mut self, depth: usize) -> Self {
        self.max_type_depth = depth;
        self
    }

    /// Set the fetch size.
    pub fn with_fetch_size(mut self, rows: u32) -> Self {
        self.fetch_size = rows;
        self
    }

    /// Require a condition on every update.
    pub fn with_require_where_for_update(mut self, required: bool) -> Self {
        self.require_where_for_update = required;
        self
    }
}
