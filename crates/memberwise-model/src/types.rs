//! Static value types of members.
//!
//! A [`ValueType`] is the declared type of a member slot. Coercion between
//! two members is decided from their value types alone, before any value is
//! ever read.

use std::fmt;

use crate::value::Value;

/// Declared type of a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// A registered enumeration.
    Enum(EnumType),
    /// Optional value of the inner type. Never nests.
    Nullable(Box<ValueType>),
}

impl ValueType {
    /// Wraps `inner` as nullable, leaving already nullable types untouched.
    pub fn nullable(inner: ValueType) -> Self {
        match inner {
            Self::Nullable(_) => inner,
            other => Self::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// The type with any nullable wrapper removed.
    pub fn underlying(&self) -> &ValueType {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integral() || self.is_floating()
    }

    /// The zero/default value of this type.
    ///
    /// Nullable types default to [`Value::Null`]; enums default to their
    /// zero variant (see [`EnumType::zero`]).
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Char => Value::Char('\0'),
            Self::I8 => Value::I8(0),
            Self::I16 => Value::I16(0),
            Self::I32 => Value::I32(0),
            Self::I64 => Value::I64(0),
            Self::U8 => Value::U8(0),
            Self::U16 => Value::U16(0),
            Self::U32 => Value::U32(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::String => Value::Str(String::new()),
            Self::Enum(enum_type) => Value::Enum(enum_type.zero()),
            Self::Nullable(_) => Value::Null,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Char => f.write_str("char"),
            Self::I8 => f.write_str("i8"),
            Self::I16 => f.write_str("i16"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::U8 => f.write_str("u8"),
            Self::U16 => f.write_str("u16"),
            Self::U32 => f.write_str("u32"),
            Self::U64 => f.write_str("u64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::String => f.write_str("string"),
            Self::Enum(enum_type) => f.write_str(enum_type.name()),
            Self::Nullable(inner) => write!(f, "Option<{inner}>"),
        }
    }
}

/// Descriptor of a registered enumeration.
///
/// Holds the type name and the ordered `(variant name, discriminant)` table.
/// Usually produced by [`member_enum!`](crate::member_enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumType {
    name: &'static str,
    variants: &'static [(&'static str, i64)],
}

impl EnumType {
    pub const fn new(name: &'static str, variants: &'static [(&'static str, i64)]) -> Self {
        Self { name, variants }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn variants(&self) -> &'static [(&'static str, i64)] {
        self.variants
    }

    /// Discriminant of the zero value.
    ///
    /// This is the variant declared with discriminant `0`, or the first
    /// declared variant when no such variant exists.
    pub fn zero(&self) -> i64 {
        if self.contains(0) {
            return 0;
        }
        self.variants.first().map_or(0, |(_, discriminant)| *discriminant)
    }

    /// Looks up a variant by exact, case-sensitive name.
    pub fn parse(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(variant, _)| *variant == name)
            .map(|(_, discriminant)| *discriminant)
    }

    /// Name of the variant with the given discriminant.
    pub fn name_of(&self, discriminant: i64) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|(_, value)| *value == discriminant)
            .map(|(variant, _)| *variant)
    }

    pub fn contains(&self, discriminant: i64) -> bool {
        self.variants.iter().any(|(_, value)| *value == discriminant)
    }
}
