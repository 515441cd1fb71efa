//! Schema catalog: name resolution, column introspection and their caches.
//!
//! [`resolve`] turns a logical name into a [`TableHandle`], following
//! private and public synonyms. [`describe`] builds the [`ColumnMap`] of a
//! handle together with the [`TypeSet`] of user-defined types its columns
//! use. Described types are also shared through the [`CatalogCache`], so
//! the next table using them skips the dictionary.
//!
//! ## Caches
//!
//! | Key                         | Value                   |
//! |-----------------------------|-------------------------|
//! | (current schema, name)      | [`TableHandle`]         |
//! | (owner, object name)        | [`TableColumns`]        |
//! | (type owner, type name)     | `Arc<TypeDescriptor>`   |
//!
//! Entries are never invalidated automatically. After DDL, call
//! [`CatalogCache::clear`]. Tables already holding a [`TableColumns`] keep
//! working with what they were described with.

mod introspect;
mod resolve;

pub use introspect::describe;
pub use resolve::{normalize_identifier, resolve};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::{ColumnDescriptor, ColumnMap, ObjectKind};

/// A resolved table or view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableHandle {
    /// Owning schema (upper case).
    pub owner: String,
    /// Object name (upper case).
    pub name: String,
    pub kind: ObjectKind,
}

impl TableHandle {
    /// `OWNER.NAME`, as used in generated statements.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }
}

impl fmt::Display for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// Identity of a user-defined type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeKey {
    pub owner: String,
    pub name: String,
}

impl TypeKey {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Key of the type referenced by an `OBJECT` descriptor.
    pub fn of(desc: &ColumnDescriptor) -> Option<Self> {
        desc.type_ref().map(|(owner, name)| Self::new(owner, name))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner, self.name)
    }
}

/// Storage kind of a collection type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// `VARYING ARRAY` - bounded, ordered.
    Varray,
    /// `TABLE` - nested table, unbounded.
    NestedTable,
}

/// Structure of a user-defined type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Object type with named attributes in declaration order.
    Object { attributes: ColumnMap },
    /// Collection of a single element type.
    Collection {
        kind: CollectionKind,
        /// Maximum element count, for VARRAYs.
        upper_bound: Option<u32>,
        element: ColumnDescriptor,
    },
}

/// A resolved user-defined type.
///
/// Nested user-defined types are referenced through descriptors
/// (`type_owner`/`type_name`) and looked up in the cache by [`TypeKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// `OWNER.TYPE_NAME`.
    pub fn sql_type_name(&self) -> String {
        self.key.to_string()
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Collection { .. })
    }

    /// User-defined types used by the attributes or the element type.
    pub fn references(&self) -> Vec<TypeKey> {
        match &self.kind {
            TypeKind::Object { attributes } => attributes.descriptors().filter_map(TypeKey::of).collect(),
            TypeKind::Collection { element, .. } => TypeKey::of(element).into_iter().collect(),
        }
    }
}

/// Every user-defined type reachable from one column map.
///
/// Belongs to the map it was described with, so clearing the shared type
/// cache never strands a table that is already in use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSet {
    types: HashMap<TypeKey, Arc<TypeDescriptor>>,
}

impl TypeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TypeKey) -> Option<&Arc<TypeDescriptor>> {
        self.types.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    pub fn insert(&mut self, descriptor: impl Into<Arc<TypeDescriptor>>) {
        let descriptor = descriptor.into();
        self.types.insert(descriptor.key.clone(), descriptor);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.types.keys()
    }
}

impl FromIterator<TypeDescriptor> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeDescriptor>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for descriptor in iter {
            set.insert(descriptor);
        }
        set
    }
}

/// Column map of a table with the types its columns use.
#[derive(Debug, Clone, Default)]
pub struct TableColumns {
    pub columns: Arc<ColumnMap>,
    pub types: Arc<TypeSet>,
}

/// In-memory cache for catalog lookups.
///
/// Shared between a [`Schema`](crate::Schema), its tables and their
/// cursors.
#[derive(Debug, Default)]
pub struct CatalogCache {
    /// (current schema, canonical name) -> handle
    handles: RwLock<HashMap<(String, String), TableHandle>>,
    /// (owner, name) -> columns and their types
    columns: RwLock<HashMap<(String, String), TableColumns>>,
    /// type key -> type descriptor
    types: RwLock<HashMap<TypeKey, Arc<TypeDescriptor>>>,
}

impl CatalogCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a cached handle for a name as seen from `schema`.
    pub fn get_handle(&self, schema: &str, name: &str) -> Option<TableHandle> {
        self.handles
            .read()
            .get(&(schema.to_string(), name.to_string()))
            .cloned()
    }

    /// Caches a resolved handle.
    pub fn put_handle(&self, schema: &str, name: &str, handle: TableHandle) {
        self.handles
            .write()
            .insert((schema.to_string(), name.to_string()), handle);
    }

    /// Gets cached columns for a table.
    pub fn get_columns(&self, handle: &TableHandle) -> Option<TableColumns> {
        self.columns
            .read()
            .get(&(handle.owner.clone(), handle.name.clone()))
            .cloned()
    }

    /// Caches columns for a table.
    pub fn put_columns(&self, handle: &TableHandle, columns: TableColumns) {
        self.columns
            .write()
            .insert((handle.owner.clone(), handle.name.clone()), columns);
    }

    /// Gets a cached type descriptor.
    pub fn get_type(&self, key: &TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(key).cloned()
    }

    /// Check if a type is cached.
    pub fn has_type(&self, key: &TypeKey) -> bool {
        self.types.read().contains_key(key)
    }

    /// Caches a type descriptor.
    pub fn put_type(&self, descriptor: impl Into<Arc<TypeDescriptor>>) -> Arc<TypeDescriptor> {
        let descriptor = descriptor.into();
        self.types
            .write()
            .insert(descriptor.key.clone(), descriptor.clone());
        descriptor
    }

    /// Drops everything cached for one table.
    pub fn invalidate(&self, handle: &TableHandle) {
        self.handles.write().retain(|_, h| h != handle);
        self.columns
            .write()
            .remove(&(handle.owner.clone(), handle.name.clone()));
    }

    /// Clears all cached data.
    pub fn clear(&self) {
        self.handles.write().clear();
        self.columns.write().clear();
        self.types.write().clear();
    }
}
