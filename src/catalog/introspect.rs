//! Column introspection of resolved tables.

use std::sync::Arc;

use tracing::debug;

use super::{CatalogCache, CollectionKind, TableHandle, TypeDescriptor, TypeKey, TypeKind, TypeSet};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::{CharUsed, ColumnDescriptor, ColumnMap, DataType, RawColumn, RawType};

/// Build the column map of a table or view and the types it uses.
///
/// Every user-defined type used by a column, directly or through nested
/// attributes and collection elements, ends up in the returned [`TypeSet`].
/// Types already in `cache` are reused; newly described ones are added to
/// it once the whole tree is known. Nothing is cached when this fails.
///
/// Fails with [`Error::Introspection`] when the object has no columns
/// (dropped since resolution), a type cannot be found, types nest deeper
/// than `max_type_depth`, or a catalog query fails.
pub async fn describe<S: Session>(
    session: &mut S,
    cache: &CatalogCache,
    handle: &TableHandle,
    max_type_depth: usize,
) -> Result<(ColumnMap, TypeSet)> {
    let object = handle.qualified_name();
    debug!(table = %object, "describing columns");

    let raw_columns = session
        .describe_table(&handle.owner, &handle.name)
        .await
        .map_err(|e| Error::introspection(&object, e.to_string()))?;
    if raw_columns.is_empty() {
        return Err(Error::introspection(
            &object,
            "no columns found, object may have been dropped",
        ));
    }

    let roots = raw_columns.iter().filter_map(user_type_key).collect();
    let types = resolve_types(session, cache, &object, roots, max_type_depth).await?;

    let descriptors = raw_columns.iter().map(descriptor).collect();
    let columns = ColumnMap::from_descriptors(&object, descriptors)?;
    Ok((columns, types))
}

/// Collect `roots` and every type they reference.
async fn resolve_types<S: Session>(
    session: &mut S,
    cache: &CatalogCache,
    object: &str,
    roots: Vec<TypeKey>,
    max_depth: usize,
) -> Result<TypeSet> {
    let mut types = TypeSet::new();
    let mut described = Vec::new();
    let mut pending: Vec<(TypeKey, usize)> = roots.into_iter().map(|key| (key, 1)).collect();

    while let Some((key, depth)) = pending.pop() {
        if types.contains(&key) {
            continue;
        }
        if depth > max_depth {
            return Err(Error::introspection(
                object,
                format!("type {} is nested more than {} levels deep", key, max_depth),
            ));
        }

        let descriptor = match cache.get_type(&key) {
            Some(descriptor) => descriptor,
            None => {
                debug!(table = object, type_name = %key, depth, "describing type");
                let raw = session
                    .describe_type(&key.owner, &key.name)
                    .await
                    .map_err(|e| Error::introspection(object, e.to_string()))?
                    .ok_or_else(|| Error::introspection(object, format!("type {} not found", key)))?;
                let descriptor = Arc::new(type_descriptor(key, &raw)?);
                described.push(descriptor.clone());
                descriptor
            }
        };
        pending.extend(descriptor.references().into_iter().map(|k| (k, depth + 1)));
        types.insert(descriptor);
    }

    for descriptor in described {
        cache.put_type(descriptor);
    }
    Ok(types)
}

/// Build a type descriptor from its dictionary rows.
fn type_descriptor(key: TypeKey, raw: &RawType) -> Result<TypeDescriptor> {
    let type_name = key.to_string();
    match raw.typecode.as_str() {
        "OBJECT" => {
            if raw.attributes.is_empty() {
                return Err(Error::introspection(&type_name, "object type has no attributes"));
            }
            let attributes =
                ColumnMap::from_descriptors(&type_name, raw.attributes.iter().map(descriptor).collect())?;
            Ok(TypeDescriptor {
                key,
                kind: TypeKind::Object { attributes },
            })
        }
        "COLLECTION" => {
            let coll = raw
                .collection
                .as_ref()
                .ok_or_else(|| Error::introspection(&type_name, "collection type has no element type"))?;
            let kind = match coll.coll_type.as_str() {
                "VARYING ARRAY" => CollectionKind::Varray,
                "TABLE" => CollectionKind::NestedTable,
                other => {
                    return Err(Error::introspection(
                        &type_name,
                        format!("unsupported collection kind {}", other),
                    ))
                }
            };
            Ok(TypeDescriptor {
                key,
                kind: TypeKind::Collection {
                    kind,
                    upper_bound: coll.upper_bound,
                    element: descriptor(&coll.element),
                },
            })
        }
        other => Err(Error::introspection(
            &type_name,
            format!("unsupported typecode {}", other),
        )),
    }
}

/// Key of the user-defined type of a raw column, if it has one.
fn user_type_key(raw: &RawColumn) -> Option<TypeKey> {
    raw.data_type_owner
        .as_ref()
        .map(|owner| TypeKey::new(owner, &raw.data_type))
}

/// Turn a raw catalog row into a descriptor.
///
/// Size attributes pass through unchanged for built-in types. `CHAR_USED`
/// is kept for character types only.
fn descriptor(raw: &RawColumn) -> ColumnDescriptor {
    if let Some(key) = user_type_key(raw) {
        let sql_type_name = key.to_string();
        return ColumnDescriptor {
            type_owner: Some(key.owner),
            type_name: Some(key.name),
            sql_type_name: Some(sql_type_name),
            ..ColumnDescriptor::new(raw.column_id, &raw.column_name, DataType::Object)
        };
    }

    let data_type = DataType::from_catalog(&raw.data_type);
    let char_used = if data_type.is_character() {
        raw.char_used.as_deref().and_then(CharUsed::from_catalog)
    } else {
        None
    };
    ColumnDescriptor {
        data_length: raw.data_length,
        data_precision: raw.data_precision,
        data_scale: raw.data_scale,
        char_used,
        ..ColumnDescriptor::new(raw.column_id, &raw.column_name, data_type)
    }
}
