//! Type-inference engine: JSON value tree → ordered field-path/type map
//!
//! Pure function of (value, path prefix, depth limits); no I/O. The only
//! error the engine raises is the depth violation. Everything shape-ambiguous
//! degrades to `String` / `Array(String)` instead of failing.

use crate::error::{Error, Result};
use crate::schema::types::{ColumnType, ScalarKind};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered mapping from dotted field path to inferred column type.
pub type FieldMap = BTreeMap<String, ColumnType>;

/// Recursively analyze a JSON value and map field paths to column types.
///
/// `max_depth <= 0` disables the depth check. A root-level array is sampled
/// through its first element at the same depth; nested objects and arrays of
/// objects recurse one level deeper with the path prefix reset, so each
/// `Nested` record carries its own flattening scope.
pub fn infer_structure(
    value: &Value,
    prefix: &str,
    max_depth: i32,
    current_depth: i32,
) -> Result<FieldMap> {
    if max_depth > 0 && current_depth >= max_depth {
        return Err(Error::depth_exceeded(max_depth, current_depth));
    }

    let mut structure = FieldMap::new();

    let object = match value {
        Value::Array(items) => match items.first() {
            Some(first) => return infer_structure(first, prefix, max_depth, current_depth),
            None => return Ok(structure),
        },
        Value::Object(object) => object,
        _ => return Ok(structure),
    };

    for (name, value) in object {
        let safe_key = name.replace(' ', "_");
        let field_path = if prefix.is_empty() {
            safe_key
        } else {
            format!("{}.{}", prefix, safe_key)
        };

        if is_identifier_field(field_name_of(&field_path)) {
            structure.insert(field_path, ColumnType::Scalar(ScalarKind::UInt64));
            continue;
        }

        let column = match value {
            Value::Object(_) => {
                let nested = infer_structure(value, "", max_depth, current_depth + 1)?;
                if nested.is_empty() {
                    ColumnType::Scalar(ScalarKind::String)
                } else {
                    ColumnType::Nested(nested.into_iter().collect())
                }
            }
            Value::Array(items) => infer_array(items, max_depth, current_depth)?,
            _ => detect_scalar(value),
        };

        structure.insert(field_path, column);
    }

    Ok(structure)
}

/// Infer the column type for an array value.
fn infer_array(items: &[Value], max_depth: i32, current_depth: i32) -> Result<ColumnType> {
    if items.is_empty() {
        return Ok(ColumnType::Array(ScalarKind::String));
    }

    if items.iter().all(Value::is_object) {
        // An array of objects maps to the same Nested record representation
        // as a singular nested object: both are ClickHouse Nested columns.
        let sample = &items[0];
        let nested = infer_structure(sample, "", max_depth, current_depth + 1)?;
        if nested.is_empty() {
            return Ok(ColumnType::Array(ScalarKind::String));
        }
        return Ok(ColumnType::Nested(nested.into_iter().collect()));
    }

    let all_scalar_or_null = items.iter().all(|item| {
        matches!(
            item,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    });
    if !all_scalar_or_null {
        // Mixed object/scalar arrays have no common element type.
        return Ok(ColumnType::Array(ScalarKind::String));
    }

    let kinds: Vec<ScalarKind> = items
        .iter()
        .filter(|item| !item.is_null())
        .map(detect_scalar_kind)
        .collect();

    if kinds.is_empty() {
        return Ok(ColumnType::Array(ScalarKind::String));
    }

    Ok(ColumnType::Array(widen_scalar_kinds(&kinds)))
}

/// ID heuristic: a field named `id` or ending in `_id` is always typed
/// `UInt64`, regardless of the value's actual shape. Applied uniformly,
/// including inside nested records. Load-bearing for output compatibility.
pub fn is_identifier_field(name: &str) -> bool {
    name == "id" || name.ends_with("_id")
}

/// Widen a set of observed scalar kinds to the least-lossy common type.
///
/// All unsigned integers widen to `UInt64`; any signed observation pulls the
/// whole set to `Int64`; a single float forces `Float64`; homogeneous
/// timestamps stay `DateTime64(3)`; anything else falls back to `String`.
pub fn widen_scalar_kinds(kinds: &[ScalarKind]) -> ScalarKind {
    if kinds.iter().all(|k| k.is_unsigned_integer()) {
        ScalarKind::UInt64
    } else if kinds.iter().all(|k| k.is_integer()) {
        ScalarKind::Int64
    } else if kinds.iter().any(|k| *k == ScalarKind::Float64) {
        ScalarKind::Float64
    } else if kinds.iter().all(|k| *k == ScalarKind::DateTime64) {
        ScalarKind::DateTime64
    } else {
        ScalarKind::String
    }
}

/// Detect the column type of a scalar leaf.
pub fn detect_scalar(value: &Value) -> ColumnType {
    match value {
        Value::Null => ColumnType::Nullable(ScalarKind::String),
        _ => ColumnType::Scalar(detect_scalar_kind(value)),
    }
}

/// Scalar kind of a non-null leaf value. Integers are uniformly typed at the
/// widest width, which avoids narrowing surprises when arrays mix magnitudes.
fn detect_scalar_kind(value: &Value) -> ScalarKind {
    match value {
        Value::Bool(_) => ScalarKind::UInt8,
        Value::Number(n) => {
            if n.as_u64().is_some() {
                ScalarKind::UInt64
            } else if n.as_i64().is_some() {
                ScalarKind::Int64
            } else {
                ScalarKind::Float64
            }
        }
        Value::String(s) => detect_string_kind(s),
        // Null is handled by detect_scalar; containers never reach here.
        _ => ScalarKind::String,
    }
}

/// Shape-check a string for date/datetime forms with fast byte-offset tests
/// before attempting any real parse. Parse failures fall through to `String`.
fn detect_string_kind(s: &str) -> ScalarKind {
    let bytes = s.as_bytes();

    if bytes.len() >= 19
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && (bytes[10] == b'T' || bytes[10] == b' ')
        && bytes[13] == b':'
        && bytes[16] == b':'
    {
        if is_datetime(s, bytes[10]) {
            return ScalarKind::DateTime64;
        }
    } else if bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-' {
        if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
            return ScalarKind::Date;
        }
    }

    ScalarKind::String
}

fn is_datetime(s: &str, separator: u8) -> bool {
    // Only the leading `yyyy-MM-ddTHH:mm:ss` portion is validated; fractional
    // seconds and timezone suffixes are accepted as-is.
    let head = match s.get(..19) {
        Some(head) => head,
        None => return false,
    };
    let format = if separator == b'T' {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%d %H:%M:%S"
    };
    NaiveDateTime::parse_from_str(head, format).is_ok()
}

/// Last path segment, i.e. the field's own name within its record.
fn field_name_of(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
