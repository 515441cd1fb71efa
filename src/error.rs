//! Error types for the table access layer.

use thiserror::Error;

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for table resolution, introspection and statement execution.
#[derive(Error, Debug)]
pub enum Error {
    /// Oracle database error reported by the session.
    #[error("ORA-{code:05}: {message}")]
    Oracle { code: u32, message: String },

    /// Driver failure that carries no Oracle error code.
    #[error("Driver error: {message}")]
    Driver { message: String },

    /// A generated or caller-supplied statement failed.
    ///
    /// The session error is kept verbatim as the source.
    #[error("Statement failed: {sql}: {source}")]
    Statement {
        sql: String,
        #[source]
        source: Box<Error>,
    },

    /// Table lookup by name found nothing.
    ///
    /// Only [`Schema::table`](crate::Schema::table) reports this; `find`
    /// returns `None` instead.
    #[error("Table or view not found: {name}")]
    TableNotFound { name: String },

    /// Synonym chain could not be followed (cycle or too deep).
    #[error("Cannot resolve {name}: {message}")]
    Resolution { name: String, message: String },

    /// Catalog metadata query failed or returned inconsistent data.
    #[error("Cannot describe {object}: {message}")]
    Introspection { object: String, message: String },

    /// Record value does not fit the column it is bound to or read from.
    #[error("Encoding error in {table}.{column}: {message}")]
    Encoding {
        table: String,
        column: String,
        message: String,
    },

    /// UPDATE without a condition while the guard is enabled.
    #[error("Refusing to update every row of {table} without a condition")]
    UnguardedUpdate { table: String },

    /// Unexpected shape of a catalog or driver value.
    #[error("Type conversion error: {message}")]
    TypeConversion { message: String },
}

impl Error {
    /// Create an Oracle database error.
    pub fn oracle(code: u32, message: impl Into<String>) -> Self {
        Self::Oracle {
            code,
            message: message.into(),
        }
    }

    /// Create a driver error.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Wrap a session error with the statement that produced it.
    pub fn statement(sql: impl Into<String>, source: Error) -> Self {
        Self::Statement {
            sql: sql.into(),
            source: Box::new(source),
        }
    }

    /// Create a resolution error.
    pub fn resolution(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an introspection error.
    pub fn introspection(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Introspection {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Create an encoding error.
    pub fn encoding(
        table: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Encoding {
            table: table.into(),
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a type conversion error.
    pub fn type_conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion {
            message: message.into(),
        }
    }

    /// Oracle error code, looking through statement wrappers.
    pub fn oracle_code(&self) -> Option<u32> {
        match self {
            Error::Oracle { code, .. } => Some(*code),
            Error::Statement { source, .. } => source.oracle_code(),
            _ => None,
        }
    }
}
