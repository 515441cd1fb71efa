//! Name resolution through private and public synonyms.

use std::collections::HashSet;

use tracing::debug;

use super::TableHandle;
use crate::error::{Error, Result};
use crate::session::Session;

/// Owner of public synonyms in `ALL_SYNONYMS`.
const PUBLIC: &str = "PUBLIC";

/// Split a possibly qualified name into `(owner, name)` in catalog form.
///
/// Unquoted identifiers are upper-cased, quoted ones (`"Mixed"`) are kept
/// as written. An unqualified name has no owner. Empty parts and more than
/// two parts are an [`Error::Resolution`].
pub fn normalize_identifier(name: &str) -> Result<(Option<String>, String)> {
    let parts = split_qualified(name.trim());
    let parts = parts
        .iter()
        .map(|p| normalize_part(p).ok_or_else(|| Error::resolution(name, "empty identifier")))
        .collect::<Result<Vec<_>>>()?;

    match parts.as_slice() {
        [object] => Ok((None, object.clone())),
        [owner, object] => Ok((Some(owner.clone()), object.clone())),
        _ => Err(Error::resolution(name, "expected NAME or OWNER.NAME")),
    }
}

/// Split on dots outside double quotes.
fn split_qualified(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in name.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => {
                parts.push(&name[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&name[start..]);
    parts
}

fn normalize_part(part: &str) -> Option<String> {
    let part = part.trim();
    let normalized = match part.strip_prefix('"').and_then(|p| p.strip_suffix('"')) {
        Some(quoted) => quoted.to_string(),
        None => part.to_uppercase(),
    };
    (!normalized.is_empty()).then_some(normalized)
}

/// Resolve a table, view or synonym name to the underlying table or view.
///
/// Lookup order for an unqualified name: object in `current_schema`,
/// private synonym in `current_schema`, public synonym. A qualified name
/// is looked up in its owner only. Synonym targets are always qualified.
///
/// Returns `Ok(None)` when nothing matches, when `name` is not a valid
/// `NAME` or `OWNER.NAME`, or when a synonym points at a missing object.
/// Fails with [`Error::Resolution`] on a synonym cycle or when more
/// than `max_depth` synonyms would have to be followed.
pub async fn resolve<S: Session>(
    session: &mut S,
    name: &str,
    current_schema: &str,
    max_depth: usize,
) -> Result<Option<TableHandle>> {
    let Ok((owner, object)) = normalize_identifier(name) else {
        debug!(lookup = name, "not a table name");
        return Ok(None);
    };
    let mut allow_public = owner.is_none();
    let mut owner = owner.unwrap_or_else(|| current_schema.to_uppercase());
    let mut object = object;

    let mut visited = HashSet::new();
    let mut hops = 0usize;

    loop {
        if !visited.insert((owner.clone(), object.clone())) {
            return Err(Error::resolution(
                name,
                format!("synonym cycle at {}.{}", owner, object),
            ));
        }

        if let Some(kind) = session.describe_object(&owner, &object).await? {
            debug!(lookup = name, owner = %owner, object = %object, ?kind, "resolved");
            return Ok(Some(TableHandle {
                owner,
                name: object,
                kind,
            }));
        }

        let mut target = session.describe_synonym(&owner, &object).await?;
        if target.is_none() && allow_public {
            visited.insert((PUBLIC.to_string(), object.clone()));
            target = session.describe_synonym(PUBLIC, &object).await?;
        }
        allow_public = false;

        match target {
            Some(target) => {
                hops += 1;
                if hops > max_depth {
                    return Err(Error::resolution(
                        name,
                        format!("more than {} synonym levels", max_depth),
                    ));
                }
                debug!(
                    lookup = name,
                    synonym = %format!("{}.{}", owner, object),
                    to = %format!("{}.{}", target.owner, target.name),
                    "following synonym"
                );
                owner = target.owner;
                object = target.name;
            }
            None => return Ok(None),
        }
    }
}
