//! Conversion between records and driver values.
//!
//! The write path turns [`Value`]s into [`OracleValue`] binds, checking each
//! value against its column descriptor. The read path turns the raw values
//! of a row back into a [`Record`].
//!
//! | Data type          | Record value                  | Driver value           |
//! |--------------------|-------------------------------|------------------------|
//! | NUMBER, FLOAT      | `Integer` / `Number`          | `Number` (text)        |
//! | VARCHAR2, CHAR ... | `Text`                        | `String`               |
//! | DATE, TIMESTAMP    | `Date`                        | `Date`                 |
//! | RAW, BLOB          | `Raw`                         | `Raw`                  |
//! | object type        | `Record`                      | `Object` (positional)  |
//! | VARRAY / TABLE     | `Array`                       | `Collection`           |

use std::sync::Arc;

use crate::catalog::{TypeDescriptor, TypeKey, TypeKind, TypeSet};
use crate::error::{Error, Result};
use crate::types::{
    ColumnDescriptor, ColumnMap, DataType, OracleCollection, OracleObject, OracleValue, Record, Row,
    Value,
};

/// Encoder/decoder for the records of one table.
pub struct RecordCodec<'a> {
    table: &'a str,
    columns: &'a ColumnMap,
    types: &'a TypeSet,
}

impl<'a> RecordCodec<'a> {
    pub fn new(table: &'a str, columns: &'a ColumnMap, types: &'a TypeSet) -> Self {
        Self {
            table,
            columns,
            types,
        }
    }

    /// Qualified name of the table, used in errors.
    pub fn table(&self) -> &'a str {
        self.table
    }

    pub fn columns(&self) -> &'a ColumnMap {
        self.columns
    }

    /// Encode a record into `(column key, bind)` pairs in column order.
    ///
    /// Only columns present in the record are returned. A field with no
    /// matching column is an error.
    pub fn encode(&self, record: &Record) -> Result<Vec<(&'a str, OracleValue)>> {
        if let Some(unknown) = record.keys().find(|k| !self.columns.contains(k)) {
            return Err(Error::encoding(self.table, unknown, "no such column"));
        }

        self.columns
            .iter()
            .filter_map(|(key, desc)| record.get(key).map(|value| (key, desc, value)))
            .map(|(key, desc, value)| Ok((key, self.encode_value(key, desc, value)?)))
            .collect()
    }

    /// Encode one value for a column or attribute.
    ///
    /// `path` names the value in errors, e.g. `phones[1].type`.
    pub fn encode_value(
        &self,
        path: &str,
        desc: &ColumnDescriptor,
        value: &Value,
    ) -> Result<OracleValue> {
        if value.is_null() {
            return Ok(OracleValue::Null);
        }
        if desc.is_object() {
            return self.encode_user_type(path, desc, value);
        }

        let data_type = &desc.data_type;
        match value {
            Value::Integer(i) if data_type.is_numeric() || data_type.is_character() => {
                Ok(if data_type.is_numeric() {
                    OracleValue::Number(i.to_string())
                } else {
                    OracleValue::String(i.to_string())
                })
            }
            Value::Number(n) if data_type.is_numeric() || data_type.is_character() => {
                if !is_decimal(n) {
                    return Err(self.mismatch(path, data_type, value));
                }
                let n = n.trim().to_string();
                Ok(if data_type.is_numeric() {
                    OracleValue::Number(n)
                } else {
                    OracleValue::String(n)
                })
            }
            Value::Text(s) if data_type.is_character() => Ok(OracleValue::String(s.clone())),
            Value::Date(dt) if data_type.is_datetime() => Ok(OracleValue::Date(*dt)),
            Value::Raw(bytes) if data_type.is_binary() => Ok(OracleValue::Raw(bytes.clone())),
            Value::Record(_) | Value::Array(_) => Err(self.mismatch(path, data_type, value)),
            // Types this layer does not model are handed to the driver as is.
            _ if matches!(data_type, DataType::Other(_)) => encode_bind(value)
                .map_err(|_| self.mismatch(path, data_type, value)),
            _ => Err(self.mismatch(path, data_type, value)),
        }
    }

    fn encode_user_type(
        &self,
        path: &str,
        desc: &ColumnDescriptor,
        value: &Value,
    ) -> Result<OracleValue> {
        let ty = self.type_of(path, desc)?;
        let type_name = ty.sql_type_name();

        match (&ty.kind, value) {
            (TypeKind::Object { attributes }, Value::Record(record)) => {
                if let Some(unknown) = record.keys().find(|k| !attributes.contains(k)) {
                    return Err(self.error(
                        path,
                        format!("type {} has no attribute {}", type_name, unknown),
                    ));
                }
                let attributes = attributes
                    .iter()
                    .map(|(key, attr)| {
                        let value = record.get(key).unwrap_or(&Value::Null);
                        self.encode_value(&format!("{}.{}", path, key), attr, value)
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(OracleValue::Object(OracleObject {
                    type_name,
                    attributes,
                }))
            }
            (
                TypeKind::Collection {
                    upper_bound,
                    element,
                    ..
                },
                Value::Array(items),
            ) => {
                if let Some(max) = upper_bound {
                    if items.len() > *max as usize {
                        return Err(self.error(
                            path,
                            format!(
                                "{} elements exceed the limit of {} for {}",
                                items.len(),
                                max,
                                type_name
                            ),
                        ));
                    }
                }
                let elements = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.encode_value(&format!("{}[{}]", path, i + 1), element, item))
                    .collect::<Result<Vec<_>>>()?;
                Ok(OracleValue::Collection(OracleCollection {
                    type_name,
                    elements,
                }))
            }
            (TypeKind::Object { .. }, _) => Err(self.error(
                path,
                format!("expected a record for {}, got {}", type_name, value),
            )),
            (TypeKind::Collection { .. }, _) => Err(self.error(
                path,
                format!("expected an array for {}, got {}", type_name, value),
            )),
        }
    }

    /// Decode a row aligned to this codec's column map.
    pub fn decode(&self, row: &Row) -> Result<Record> {
        if row.len() != self.columns.len() {
            return Err(self.error(
                "*",
                format!(
                    "row has {} values, table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            ));
        }

        let mut record = Record::new();
        for ((key, desc), raw) in self.columns.iter().zip(row.iter()) {
            record.insert(key, self.decode_value(key, desc, raw)?);
        }
        Ok(record)
    }

    /// Decode one driver value for a column or attribute.
    pub fn decode_value(
        &self,
        path: &str,
        desc: &ColumnDescriptor,
        raw: &OracleValue,
    ) -> Result<Value> {
        match raw {
            OracleValue::Null => Ok(Value::Null),
            OracleValue::Number(n) => Ok(decode_number(n, desc.data_scale)),
            OracleValue::String(s) => Ok(Value::Text(s.clone())),
            OracleValue::Date(dt) => Ok(Value::Date(*dt)),
            OracleValue::Raw(bytes) => Ok(Value::Raw(bytes.clone())),
            OracleValue::Object(obj) => {
                let ty = self.type_of(path, desc)?;
                let TypeKind::Object { attributes } = &ty.kind else {
                    return Err(self.error(path, format!("{} is not an object type", ty.key)));
                };
                if obj.attributes.len() != attributes.len() {
                    return Err(self.error(
                        path,
                        format!(
                            "object has {} attributes, type {} has {}",
                            obj.attributes.len(),
                            ty.key,
                            attributes.len()
                        ),
                    ));
                }
                let mut record = Record::new();
                for ((key, attr), value) in attributes.iter().zip(&obj.attributes) {
                    let value = self.decode_value(&format!("{}.{}", path, key), attr, value)?;
                    record.insert(key, value);
                }
                Ok(Value::Record(record))
            }
            OracleValue::Collection(coll) => {
                let ty = self.type_of(path, desc)?;
                let TypeKind::Collection { element, .. } = &ty.kind else {
                    return Err(self.error(path, format!("{} is not a collection type", ty.key)));
                };
                coll.elements
                    .iter()
                    .enumerate()
                    .map(|(i, value)| self.decode_value(&format!("{}[{}]", path, i + 1), element, value))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
        }
    }

    fn type_of(&self, path: &str, desc: &ColumnDescriptor) -> Result<Arc<TypeDescriptor>> {
        let key = TypeKey::of(desc)
            .ok_or_else(|| self.error(path, format!("{} column has no type name", desc.data_type)))?;
        self.types
            .get(&key)
            .cloned()
            .ok_or_else(|| self.error(path, format!("type {} is not described", key)))
    }

    fn mismatch(&self, path: &str, data_type: &DataType, value: &Value) -> Error {
        self.error(
            path,
            format!("cannot bind {} value {} to {} column", value.kind(), value, data_type),
        )
    }

    fn error(&self, path: &str, message: impl Into<String>) -> Error {
        Error::encoding(self.table, path, message)
    }
}

/// Encode a scalar bind that is not tied to a column (raw condition binds).
pub fn encode_bind(value: &Value) -> Result<OracleValue> {
    match value {
        Value::Null => Ok(OracleValue::Null),
        Value::Integer(i) => Ok(OracleValue::Number(i.to_string())),
        Value::Number(n) if is_decimal(n) => Ok(OracleValue::Number(n.trim().to_string())),
        Value::Text(s) => Ok(OracleValue::String(s.clone())),
        Value::Date(dt) => Ok(OracleValue::Date(*dt)),
        Value::Raw(bytes) => Ok(OracleValue::Raw(bytes.clone())),
        other => Err(Error::type_conversion(format!(
            "cannot bind {} value {} without a column type",
            other.kind(),
            other
        ))),
    }
}

/// Integral NUMBERs decode to `Value::Integer` when they fit in `i64`.
///
/// A zero scale marks an integral column. Without a declared scale the
/// value itself decides.
fn decode_number(text: &str, scale: Option<i32>) -> Value {
    let integral = match scale {
        Some(s) => s <= 0,
        None => !text.contains(['.', 'e', 'E']),
    };
    if integral {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Integer(i);
        }
    }
    Value::Number(text.to_string())
}

/// Decimal text: optional sign, digits with optional fraction, optional
/// exponent.
fn is_decimal(text: &str) -> bool {
    let s = text.trim();
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits_ok = !(int.is_empty() && frac.is_empty())
        && int.chars().all(|c| c.is_ascii_digit())
        && frac.chars().all(|c| c.is_ascii_digit());
    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['-', '+']).unwrap_or(e);
        !e.is_empty() && e.chars().all(|c| c.is_ascii_digit())
    });
    digits_ok && exponent_ok
}
