//! Column descriptors and the ordered column map of a table.
//!
//! Descriptors are built from catalog rows by the introspector. The same
//! shape describes object type attributes and collection elements.

use indexmap::IndexMap;

use super::data_type::DataType;
use super::record::field_key;
use crate::error::{Error, Result};

/// Length semantics of a character column (`CHAR_USED`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharUsed {
    /// `B` - length counted in bytes.
    Byte,
    /// `C` - length counted in characters.
    Char,
}

impl CharUsed {
    /// Parse the catalog flag. Unknown flags read as absent.
    pub fn from_catalog(flag: &str) -> Option<Self> {
        match flag.trim() {
            "B" => Some(CharUsed::Byte),
            "C" => Some(CharUsed::Char),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CharUsed::Byte => "B",
            CharUsed::Char => "C",
        }
    }
}

/// Metadata for one table column.
///
/// Optional fields are `None` when the catalog reports no value or the
/// field does not apply to the data type. `Some(0)` is kept distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// 1-based position in the table.
    pub position: u32,
    /// Catalog column name (upper case).
    pub name: String,
    pub data_type: DataType,
    pub data_length: Option<u32>,
    pub data_precision: Option<u32>,
    pub data_scale: Option<i32>,
    pub char_used: Option<CharUsed>,
    /// Owner of the user-defined type, for `OBJECT` columns.
    pub type_owner: Option<String>,
    /// Name of the user-defined type, for `OBJECT` columns.
    pub type_name: Option<String>,
    /// `OWNER.TYPE_NAME`, for `OBJECT` columns.
    pub sql_type_name: Option<String>,
}

impl ColumnDescriptor {
    /// Create a scalar descriptor with no size attributes.
    pub fn new(position: u32, name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            position,
            name: name.into(),
            data_type,
            data_length: None,
            data_precision: None,
            data_scale: None,
            char_used: None,
            type_owner: None,
            type_name: None,
            sql_type_name: None,
        }
    }

    /// Canonical lower-case key used in records and column maps.
    pub fn key(&self) -> String {
        field_key(&self.name)
    }

    /// Whether the column holds an object or collection type.
    pub fn is_object(&self) -> bool {
        self.data_type == DataType::Object
    }

    /// `(owner, name)` of the user-defined type, if any.
    pub fn type_ref(&self) -> Option<(&str, &str)> {
        match (&self.type_owner, &self.type_name) {
            (Some(owner), Some(name)) => Some((owner.as_str(), name.as_str())),
            _ => None,
        }
    }
}

/// Ordered mapping from lower-case column name to descriptor.
///
/// Positions are always the contiguous sequence `1..=len()` in map order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMap {
    columns: IndexMap<String, ColumnDescriptor>,
}

impl ColumnMap {
    /// Build a map from descriptors in any order.
    ///
    /// `object` names the table or type in error messages. Fails if the
    /// positions are not exactly `1..=N` or a name repeats.
    pub fn from_descriptors(object: &str, mut descriptors: Vec<ColumnDescriptor>) -> Result<Self> {
        descriptors.sort_by_key(|d| d.position);

        let mut columns = IndexMap::with_capacity(descriptors.len());
        for (i, desc) in descriptors.into_iter().enumerate() {
            let expected = i as u32 + 1;
            if desc.position != expected {
                return Err(Error::introspection(
                    object,
                    format!(
                        "column {} has position {}, expected {}",
                        desc.name, desc.position, expected
                    ),
                ));
            }
            let key = desc.key();
            if columns.contains_key(&key) {
                return Err(Error::introspection(
                    object,
                    format!("duplicate column {}", desc.name),
                ));
            }
            columns.insert(key, desc);
        }

        Ok(Self { columns })
    }

    /// Get a descriptor by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(&field_key(name))
    }

    /// Get a descriptor by 0-based index.
    pub fn get_index(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get_index(index).map(|(_, d)| d)
    }

    /// 0-based index of a column (case-insensitive).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(&field_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(&field_key(name))
    }

    /// Column keys in position order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Iterate over `(key, descriptor)` in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDescriptor)> {
        self.columns.iter().map(|(k, d)| (k.as_str(), d))
    }

    /// Iterate over descriptors in position order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
