//! Driver-native values exchanged with a [`Session`](crate::Session).

use chrono::NaiveDateTime;
use std::fmt;

/// Oracle value as bound to, or fetched from, a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleValue {
    /// NULL value.
    Null,
    /// String value (VARCHAR2, CHAR, CLOB, etc.).
    String(String),
    /// Number value as string (preserves precision).
    /// Can be converted to i64/f64 as needed.
    Number(String),
    /// Date/time value (DATE type).
    Date(NaiveDateTime),
    /// Raw binary value (RAW, BLOB).
    Raw(Vec<u8>),
    /// Instance of a user-defined object type.
    Object(OracleObject),
    /// Instance of a VARRAY or nested table type.
    Collection(OracleCollection),
}

/// Object type instance with attributes in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleObject {
    /// Fully qualified type name, e.g. `HR.T_ADDRESS`.
    pub type_name: String,
    /// Attribute values in `attr_no` order.
    pub attributes: Vec<OracleValue>,
}

/// Collection type instance.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleCollection {
    /// Fully qualified type name, e.g. `HR.T_PHONES`.
    pub type_name: String,
    /// Elements in collection order.
    pub elements: Vec<OracleValue>,
}

impl OracleValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, OracleValue::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OracleValue::String(s) => Some(s),
            OracleValue::Number(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to i64.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            OracleValue::Number(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to u32.
    pub fn to_u32(&self) -> Option<u32> {
        match self {
            OracleValue::Number(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            OracleValue::Number(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a NaiveDateTime.
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            OracleValue::Date(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            OracleValue::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            OracleValue::Null => "NULL",
            OracleValue::String(_) => "string",
            OracleValue::Number(_) => "number",
            OracleValue::Date(_) => "date",
            OracleValue::Raw(_) => "raw",
            OracleValue::Object(_) => "object",
            OracleValue::Collection(_) => "collection",
        }
    }
}

impl fmt::Display for OracleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleValue::Null => write!(f, "NULL"),
            OracleValue::String(s) => write!(f, "{}", s),
            OracleValue::Number(n) => write!(f, "{}", n),
            OracleValue::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            OracleValue::Raw(bytes) => write!(f, "<RAW: {} bytes>", bytes.len()),
            OracleValue::Object(obj) => {
                write!(f, "{}(", obj.type_name)?;
                for (i, attr) in obj.attributes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", attr)?;
                }
                write!(f, ")")
            }
            OracleValue::Collection(coll) => {
                write!(f, "{}(<{} elements>)", coll.type_name, coll.elements.len())
            }
        }
    }
}
