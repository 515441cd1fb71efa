//! Catalog data type names.
//!
//! This enum mirrors the `DATA_TYPE` column of `ALL_TAB_COLUMNS`. Size
//! attributes (length, precision, scale) live on the column descriptor,
//! since the catalog reports them separately and they must be passed through
//! unchanged.
//!
//! User-defined types (objects, VARRAYs, nested tables) are all reported as
//! [`DataType::Object`] at column level.

/// Oracle data type as reported by the data dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// VARCHAR2 - variable-length string.
    Varchar2,
    /// NVARCHAR2 - national character set string.
    NVarchar2,
    /// CHAR - fixed-length string.
    Char,
    /// NCHAR - fixed-length national string.
    NChar,
    /// NUMBER - decimal numeric type.
    Number,
    /// FLOAT - NUMBER with binary precision.
    Float,
    /// BINARY_FLOAT.
    BinaryFloat,
    /// BINARY_DOUBLE.
    BinaryDouble,
    /// DATE - date/time (no timezone).
    Date,
    /// TIMESTAMP(n), without time zone.
    Timestamp,
    /// LONG - legacy large text type.
    Long,
    /// CLOB - Character Large Object.
    Clob,
    /// NCLOB - National Character Large Object.
    NClob,
    /// BLOB - Binary Large Object.
    Blob,
    /// RAW - binary value.
    Raw,
    /// User-defined object or collection type.
    Object,
    /// Anything else, kept by catalog name.
    Other(String),
}

impl DataType {
    /// Parse a catalog type name (`DATA_TYPE`, `ATTR_TYPE_NAME`,
    /// `ELEM_TYPE_NAME`).
    pub fn from_catalog(name: &str) -> Self {
        let upper = name.trim().to_uppercase();
        match upper.as_str() {
            "VARCHAR2" | "VARCHAR" => DataType::Varchar2,
            "NVARCHAR2" => DataType::NVarchar2,
            "CHAR" => DataType::Char,
            "NCHAR" => DataType::NChar,
            "NUMBER" | "INTEGER" => DataType::Number,
            "FLOAT" => DataType::Float,
            "BINARY_FLOAT" => DataType::BinaryFloat,
            "BINARY_DOUBLE" => DataType::BinaryDouble,
            "DATE" => DataType::Date,
            "LONG" => DataType::Long,
            "CLOB" => DataType::Clob,
            "NCLOB" => DataType::NClob,
            "BLOB" => DataType::Blob,
            "RAW" => DataType::Raw,
            "OBJECT" => DataType::Object,
            // TIMESTAMP(6), TIMESTAMP(9) ...
            t if t.starts_with("TIMESTAMP") && !t.contains("ZONE") => DataType::Timestamp,
            _ => DataType::Other(upper),
        }
    }

    /// Catalog spelling of the type.
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Varchar2 => "VARCHAR2",
            DataType::NVarchar2 => "NVARCHAR2",
            DataType::Char => "CHAR",
            DataType::NChar => "NCHAR",
            DataType::Number => "NUMBER",
            DataType::Float => "FLOAT",
            DataType::BinaryFloat => "BINARY_FLOAT",
            DataType::BinaryDouble => "BINARY_DOUBLE",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Long => "LONG",
            DataType::Clob => "CLOB",
            DataType::NClob => "NCLOB",
            DataType::Blob => "BLOB",
            DataType::Raw => "RAW",
            DataType::Object => "OBJECT",
            DataType::Other(name) => name,
        }
    }

    /// Character types carry `CHAR_USED` semantics.
    pub fn is_character(&self) -> bool {
        matches!(
            self,
            DataType::Varchar2
                | DataType::NVarchar2
                | DataType::Char
                | DataType::NChar
                | DataType::Clob
                | DataType::NClob
                | DataType::Long
        )
    }

    /// Numeric types are bound as decimal text.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Number | DataType::Float | DataType::BinaryFloat | DataType::BinaryDouble
        )
    }

    /// Types holding a date and time of day.
    pub fn is_datetime(&self) -> bool {
        matches!(self, DataType::Date | DataType::Timestamp)
    }

    /// Types holding raw bytes.
    pub fn is_binary(&self) -> bool {
        matches!(self, DataType::Raw | DataType::Blob)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
