//! Dynamically typed member values.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::types::ValueType;

/// A value read from, or written to, a member.
///
/// Enum values carry only their discriminant; the variant table lives in the
/// member's [`ValueType::Enum`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    /// Absent value of a nullable slot.
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Enum(i64),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::Enum(_) => "enum",
        }
    }

    /// Kind plus rendered value, e.g. `i32 5` or `string "abc"`.
    pub fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Str(s) => format!("string {s:?}"),
            other => format!("{} {other}", other.kind()),
        }
    }

    /// Whether this value is a legal inhabitant of `value_type`.
    pub fn conforms_to(&self, value_type: &ValueType) -> bool {
        match (self, value_type) {
            (Self::Null, ValueType::Nullable(_)) => true,
            (value, ValueType::Nullable(inner)) => value.conforms_to(inner),
            (Self::Bool(_), ValueType::Bool)
            | (Self::Char(_), ValueType::Char)
            | (Self::I8(_), ValueType::I8)
            | (Self::I16(_), ValueType::I16)
            | (Self::I32(_), ValueType::I32)
            | (Self::I64(_), ValueType::I64)
            | (Self::U8(_), ValueType::U8)
            | (Self::U16(_), ValueType::U16)
            | (Self::U32(_), ValueType::U32)
            | (Self::U64(_), ValueType::U64)
            | (Self::F32(_), ValueType::F32)
            | (Self::F64(_), ValueType::F64)
            | (Self::Str(_), ValueType::String) => true,
            (Self::Enum(discriminant), ValueType::Enum(enum_type)) => {
                enum_type.contains(*discriminant)
            }
            _ => false,
        }
    }

    /// Integral view of integer, bool, char and enum values.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Bool(v) => Some(i128::from(*v)),
            Self::Char(v) => Some(i128::from(u32::from(*v))),
            Self::I8(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::U8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            Self::Enum(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Floating-point view of numeric and bool values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Bitwise identity: like `==`, except floats compare by bit pattern so
    /// that the relation is reflexive.
    pub fn identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }

    /// Hashes consistently with [`Value::identical`].
    pub fn hash_identity<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Char(v) => v.hash(state),
            Self::I8(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::U8(v) => v.hash(state),
            Self::U16(v) => v.hash(state),
            Self::U32(v) => v.hash(state),
            Self::U64(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::Str(v) => v.hash(state),
            Self::Enum(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Enum(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnumType;

    #[test]
    fn test_conforms_to_nullable_and_plain() {
        let nullable = ValueType::nullable(ValueType::I32);
        assert!(Value::Null.conforms_to(&nullable));
        assert!(Value::I32(4).conforms_to(&nullable));
        assert!(!Value::Null.conforms_to(&ValueType::I32));
        assert!(!Value::I64(4).conforms_to(&ValueType::I32));
    }

    #[test]
    fn test_enum_conformance_checks_table() {
        let color = ValueType::Enum(EnumType::new("Color", &[("Red", 0), ("Blue", 2)]));
        assert!(Value::Enum(2).conforms_to(&color));
        assert!(!Value::Enum(1).conforms_to(&color));
    }

    #[test]
    fn test_identical_is_reflexive_for_nan() {
        let nan = Value::F64(f64::NAN);
        assert_ne!(nan, nan.clone());
        assert!(nan.identical(&nan.clone()));
    }

    #[test]
    fn test_serializes_tagged() {
        let json = serde_json::to_string(&Value::I32(5)).unwrap();
        assert_eq!(json, r#"{"kind":"I32","value":5}"#);
        let round: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(round, Value::I32(5));
    }
}
