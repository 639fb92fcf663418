//! Column-type algebra for inferred ClickHouse schemas
//!
//! The inference engine produces a tree of `ColumnType` values; the renderer
//! consumes that tree. Keeping the type structured (instead of passing raw
//! type strings around) lets widening and rendering match exhaustively.

use std::fmt;

/// A leaf ClickHouse column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float64,
    String,
    Date,
    /// Millisecond-precision timestamp, `DateTime64(3)`.
    DateTime64,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKind::UInt8 => "UInt8",
            ScalarKind::UInt16 => "UInt16",
            ScalarKind::UInt32 => "UInt32",
            ScalarKind::UInt64 => "UInt64",
            ScalarKind::Int8 => "Int8",
            ScalarKind::Int16 => "Int16",
            ScalarKind::Int32 => "Int32",
            ScalarKind::Int64 => "Int64",
            ScalarKind::Float64 => "Float64",
            ScalarKind::String => "String",
            ScalarKind::Date => "Date",
            ScalarKind::DateTime64 => "DateTime64(3)",
        }
    }

    /// True for the `UInt*` family.
    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            ScalarKind::UInt8 | ScalarKind::UInt16 | ScalarKind::UInt32 | ScalarKind::UInt64
        )
    }

    /// True for any integer kind, signed or unsigned. Every integer kind can
    /// widen into `Int64`, so mixed-sign collections stay numeric.
    pub fn is_integer(self) -> bool {
        self.is_unsigned_integer()
            || matches!(
                self,
                ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 | ScalarKind::Int64
            )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inferred column type: either a leaf, an array of leaves, or a nested
/// record (ClickHouse `Nested` semantics).
///
/// A `Nested` is never empty when built from a non-empty source object; empty
/// containers degrade to `String` / `Array(String)` during inference instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Scalar(ScalarKind),
    Nullable(ScalarKind),
    Array(ScalarKind),
    /// Named sub-columns, sorted by field name.
    Nested(Vec<(String, ColumnType)>),
}

impl ColumnType {
    /// Count `Nested` nodes in this type tree. Two or more means a record
    /// nested inside another record, which requires `SET flatten_nested=0;`
    /// for ClickHouse to round-trip the declaration.
    pub fn nested_count(&self) -> usize {
        match self {
            ColumnType::Nested(fields) => {
                1 + fields.iter().map(|(_, t)| t.nested_count()).sum::<usize>()
            }
            _ => 0,
        }
    }
}

impl fmt::Display for ColumnType {
    /// Serializes to the analyzer's wire form. `Nested` uses a fixed inner
    /// indent; the renderer re-indents proportionally to nesting depth.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Scalar(kind) => write!(f, "{}", kind),
            ColumnType::Nullable(kind) => write!(f, "Nullable({})", kind),
            ColumnType::Array(kind) => write!(f, "Array({})", kind),
            ColumnType::Nested(fields) => {
                let rendered: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("`{}` {}", name, ty))
                    .collect();
                write!(f, "Nested(\n        {}\n    )", rendered.join(",\n        "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(ColumnType::Scalar(ScalarKind::UInt64).to_string(), "UInt64");
        assert_eq!(
            ColumnType::Nullable(ScalarKind::String).to_string(),
            "Nullable(String)"
        );
        assert_eq!(
            ColumnType::Array(ScalarKind::Float64).to_string(),
            "Array(Float64)"
        );
        assert_eq!(
            ColumnType::Scalar(ScalarKind::DateTime64).to_string(),
            "DateTime64(3)"
        );
    }

    #[test]
    fn test_nested_display() {
        let ty = ColumnType::Nested(vec![
            ("color".to_string(), ColumnType::Scalar(ScalarKind::String)),
            ("size".to_string(), ColumnType::Scalar(ScalarKind::UInt64)),
        ]);
        assert_eq!(
            ty.to_string(),
            "Nested(\n        `color` String,\n        `size` UInt64\n    )"
        );
    }

    #[test]
    fn test_integer_families() {
        assert!(ScalarKind::UInt8.is_unsigned_integer());
        assert!(ScalarKind::UInt64.is_unsigned_integer());
        assert!(!ScalarKind::Int64.is_unsigned_integer());
        assert!(ScalarKind::Int8.is_integer());
        assert!(ScalarKind::UInt32.is_integer());
        assert!(!ScalarKind::Float64.is_integer());
        assert!(!ScalarKind::Date.is_integer());
    }

    #[test]
    fn test_nested_count() {
        let flat = ColumnType::Scalar(ScalarKind::String);
        assert_eq!(flat.nested_count(), 0);

        let single = ColumnType::Nested(vec![(
            "a".to_string(),
            ColumnType::Scalar(ScalarKind::UInt64),
        )]);
        assert_eq!(single.nested_count(), 1);

        let double = ColumnType::Nested(vec![(
            "inner".to_string(),
            single.clone(),
        )]);
        assert_eq!(double.nested_count(), 2);
    }
}
