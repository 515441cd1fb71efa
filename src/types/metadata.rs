//! Raw catalog metadata as returned by the data dictionary.
//!
//! These structs preserve the dictionary values unchanged. The
//! introspector turns them into [`ColumnDescriptor`](super::ColumnDescriptor)s
//! and type descriptors.

/// Kind of a schema object that can be queried as a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Table,
    View,
}

impl ObjectKind {
    /// Parse `ALL_OBJECTS.OBJECT_TYPE`. Other object types are not tables.
    pub fn from_catalog(object_type: &str) -> Option<Self> {
        match object_type.trim() {
            "TABLE" => Some(ObjectKind::Table),
            "VIEW" => Some(ObjectKind::View),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
        }
    }
}

/// Target of a synonym (`ALL_SYNONYMS.TABLE_OWNER`, `TABLE_NAME`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymTarget {
    pub owner: String,
    pub name: String,
}

impl SynonymTarget {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// A table column or type attribute as reported by the catalog.
///
/// Rows of `ALL_TAB_COLUMNS`, `ALL_TYPE_ATTRS` and the element part of
/// `ALL_COLL_TYPES` share this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    /// `COLUMN_ID` / `ATTR_NO`.
    pub column_id: u32,
    pub column_name: String,
    /// Built-in type name, or the type name of a user-defined type.
    pub data_type: String,
    /// Set only for user-defined types.
    pub data_type_owner: Option<String>,
    pub data_length: Option<u32>,
    pub data_precision: Option<u32>,
    pub data_scale: Option<i32>,
    pub char_used: Option<String>,
}

impl RawColumn {
    /// Create a raw column with no size attributes.
    pub fn new(column_id: u32, column_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            column_id,
            column_name: column_name.into(),
            data_type: data_type.into(),
            data_type_owner: None,
            data_length: None,
            data_precision: None,
            data_scale: None,
            char_used: None,
        }
    }

    /// Builder: length and `CHAR_USED` of a character column.
    pub fn with_length(mut self, length: u32, char_used: &str) -> Self {
        self.data_length = Some(length);
        self.char_used = Some(char_used.to_string());
        self
    }

    /// Builder: size attributes of a numeric column.
    pub fn with_number(mut self, length: u32, precision: Option<u32>, scale: Option<i32>) -> Self {
        self.data_length = Some(length);
        self.data_precision = precision;
        self.data_scale = scale;
        self
    }

    /// Builder: user-defined type owner.
    pub fn with_type_owner(mut self, owner: impl Into<String>) -> Self {
        self.data_type_owner = Some(owner.into());
        self
    }
}

/// A user-defined type as reported by `ALL_TYPES` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawType {
    pub owner: String,
    pub name: String,
    /// `ALL_TYPES.TYPECODE`: `OBJECT` or `COLLECTION`.
    pub typecode: String,
    /// Attributes of an object type, from `ALL_TYPE_ATTRS`.
    pub attributes: Vec<RawColumn>,
    /// Collection details, from `ALL_COLL_TYPES`.
    pub collection: Option<RawCollection>,
}

/// Collection part of a user-defined type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCollection {
    /// `VARYING ARRAY` or `TABLE`.
    pub coll_type: String,
    /// Maximum element count of a VARRAY.
    pub upper_bound: Option<u32>,
    pub element: RawColumn,
}
