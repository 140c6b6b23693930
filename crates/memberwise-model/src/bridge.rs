//! Bridges between Rust types and [`Value`]/[`ValueType`].
//!
//! [`MemberValue`] is implemented for the primitive types, `String`,
//! `Option<T>` and every enum registered through [`member_enum!`](crate::member_enum).
//! Typed member constructors use it to erase field types into values.

use crate::error::{ModelError, Result};
use crate::types::{EnumType, ValueType};
use crate::value::Value;

/// A Rust type that can live in a member slot.
pub trait MemberValue: Sized + 'static {
    /// Declared type of slots holding `Self`.
    fn value_type() -> ValueType;

    fn into_value(self) -> Value;

    /// Converts a value back, failing when it does not conform to
    /// [`MemberValue::value_type`].
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! primitive_member_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl MemberValue for $ty {
                fn value_type() -> ValueType {
                    ValueType::$variant
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(ModelError::type_mismatch(Self::value_type(), &other)),
                    }
                }
            }
        )*
    };
}

primitive_member_value! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

impl MemberValue for String {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn into_value(self) -> Value {
        Value::Str(self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(ModelError::type_mismatch(ValueType::String, &other)),
        }
    }
}

impl<T: MemberValue> MemberValue for Option<T> {
    fn value_type() -> ValueType {
        ValueType::nullable(T::value_type())
    }

    fn into_value(self) -> Value {
        match self {
            Some(inner) => inner.into_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A fieldless enum registered for member mapping.
///
/// Implement through [`member_enum!`](crate::member_enum) rather than by hand.
pub trait MemberEnum: Copy + 'static {
    const ENUM_TYPE: EnumType;

    fn discriminant(self) -> i64;

    fn from_discriminant(discriminant: i64) -> Option<Self>;
}

/// Registers a fieldless enum as a member value type.
///
/// Variant names default to the Rust identifier; `Variant => "NAME"` renames
/// the variant for string parsing and rendering.
///
/// ```
/// use memberwise_model::{member_enum, MemberEnum};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Priority {
///     Low,
///     High = 10,
/// }
///
/// member_enum!(Priority { Low, High => "HIGH" });
///
/// assert_eq!(Priority::ENUM_TYPE.parse("HIGH"), Some(10));
/// assert_eq!(Priority::ENUM_TYPE.name_of(0), Some("Low"));
/// ```
#[macro_export]
macro_rules! member_enum {
    ($ty:ident { $($variant:ident $(=> $rename:literal)?),+ $(,)? }) => {
        impl $crate::MemberEnum for $ty {
            const ENUM_TYPE: $crate::EnumType = $crate::EnumType::new(
                stringify!($ty),
                &[$(($crate::__variant_name!($variant $(, $rename)?), $ty::$variant as i64)),+],
            );

            fn discriminant(self) -> i64 {
                self as i64
            }

            fn from_discriminant(discriminant: i64) -> ::std::option::Option<Self> {
                $(
                    if discriminant == $ty::$variant as i64 {
                        return ::std::option::Option::Some($ty::$variant);
                    }
                )+
                ::std::option::Option::None
            }
        }

        impl $crate::MemberValue for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum(<$ty as $crate::MemberEnum>::ENUM_TYPE)
            }

            fn into_value(self) -> $crate::Value {
                $crate::Value::Enum(<$ty as $crate::MemberEnum>::discriminant(self))
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::Enum(discriminant) => {
                        <$ty as $crate::MemberEnum>::from_discriminant(discriminant).ok_or_else(
                            || $crate::ModelError::UnknownVariant {
                                enum_name: stringify!($ty),
                                value: discriminant.to_string(),
                            },
                        )
                    }
                    other => ::std::result::Result::Err($crate::ModelError::type_mismatch(
                        <Self as $crate::MemberValue>::value_type(),
                        &other,
                    )),
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __variant_name {
    ($variant:ident) => {
        stringify!($variant)
    };
    ($variant:ident, $rename:literal) => {
        $rename
    };
}
