//! Value coercion between member types.
//!
//! A [`Coercion`] is resolved once from the declared source and target types
//! and then compiled into a [`CoerceFn`]. All decisions about *which*
//! conversion applies are taken at resolution time; the compiled function only
//! converts values.
//!
//! # Rules
//!
//! | Source → Target            | Plan                                     |
//! |----------------------------|------------------------------------------|
//! | `T` → `T`                  | [`Coercion::Identity`]                   |
//! | `T` → `Option<U>`          | [`Coercion::WrapNullable`] (policy-based)|
//! | `Option<T>` → `U`          | [`Coercion::UnwrapNullable`]             |
//! | `Option<T>` → `Option<U>`  | [`Coercion::LiftNullable`]               |
//! | `string` → enum            | [`Coercion::ParseEnum`]                  |
//! | integral → enum            | [`Coercion::IntegralToEnum`]             |
//! | enum → `string`            | [`Coercion::EnumToString`]               |
//! | enum → integral            | [`Coercion::EnumToIntegral`]             |
//! | scalar → scalar            | [`Coercion::Convert`]                    |

use std::fmt;
use std::sync::Arc;

use memberwise_model::{EnumType, ModelError, Value, ValueType};

use crate::options::NullableBehavior;

/// Compiled value conversion.
pub type CoerceFn = Arc<dyn Fn(Value) -> memberwise_model::Result<Value> + Send + Sync>;

/// Why no coercion could be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionFailure {
    /// No conversion path exists between the types.
    Incompatible,
    /// The types are compatible but the nullable policy forbids pairing them.
    NullableDisallowed,
}

/// A resolved conversion plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Coercion {
    /// Values pass through unchanged.
    Identity,
    /// Non-nullable source into a nullable target.
    WrapNullable {
        inner: Box<Coercion>,
        /// When set, a source value equal to this type's default becomes null.
        null_if_default_of: Option<ValueType>,
    },
    /// Nullable source into a non-nullable target; null becomes the default
    /// of `default_of`.
    UnwrapNullable {
        inner: Box<Coercion>,
        default_of: ValueType,
    },
    /// Nullable into nullable; null stays null.
    LiftNullable(Box<Coercion>),
    /// Variant name to enum; null becomes the zero variant.
    ParseEnum(EnumType),
    IntegralToEnum(EnumType),
    EnumToString(EnumType),
    EnumToIntegral(ValueType),
    /// Scalar conversion into the given plain type.
    Convert(ValueType),
}

impl Coercion {
    /// Resolves the plan for moving `source` values into `target` slots.
    ///
    /// # Errors
    ///
    /// [`CoercionFailure::Incompatible`] when no path exists, or
    /// [`CoercionFailure::NullableDisallowed`] for a non-nullable source and
    /// nullable target under [`NullableBehavior::Error`].
    pub fn resolve(
        source: &ValueType,
        target: &ValueType,
        behavior: NullableBehavior,
    ) -> Result<Self, CoercionFailure> {
        if source == target {
            return Ok(Self::Identity);
        }
        match (source, target) {
            (ValueType::Nullable(from), ValueType::Nullable(to)) => {
                Ok(Self::LiftNullable(Box::new(resolve_plain(from, to)?)))
            }
            (ValueType::Nullable(from), to) => Ok(Self::UnwrapNullable {
                inner: Box::new(resolve_plain(from, to)?),
                default_of: to.clone(),
            }),
            (from, ValueType::Nullable(to)) => {
                let inner = Box::new(resolve_plain(from, to)?);
                let null_if_default_of = match behavior {
                    NullableBehavior::DefaultMapsToNull => Some(from.clone()),
                    NullableBehavior::AssignDefaultAsIs => None,
                    NullableBehavior::Error => return Err(CoercionFailure::NullableDisallowed),
                };
                Ok(Self::WrapNullable {
                    inner,
                    null_if_default_of,
                })
            }
            (from, to) => resolve_plain(from, to),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Compiles the plan into a conversion function.
    pub fn compile(&self) -> CoerceFn {
        match self {
            Self::Identity => Arc::new(Ok::<Value, ModelError>),
            Self::WrapNullable {
                inner,
                null_if_default_of,
            } => {
                let inner = inner.compile();
                match null_if_default_of.as_ref().map(ValueType::default_value) {
                    Some(default) => Arc::new(move |value: Value| {
                        if value == default {
                            Ok(Value::Null)
                        } else {
                            inner(value)
                        }
                    }),
                    None => inner,
                }
            }
            Self::UnwrapNullable { inner, default_of } => {
                let inner = inner.compile();
                let default = default_of.default_value();
                Arc::new(move |value: Value| match value {
                    Value::Null => Ok(default.clone()),
                    other => inner(other),
                })
            }
            Self::LiftNullable(inner) => {
                let inner = inner.compile();
                Arc::new(move |value: Value| match value {
                    Value::Null => Ok(Value::Null),
                    other => inner(other),
                })
            }
            Self::ParseEnum(enum_type) => {
                let enum_type = *enum_type;
                Arc::new(move |value: Value| match value {
                    Value::Null => Ok(Value::Enum(enum_type.zero())),
                    Value::Str(name) => enum_type.parse(&name).map(Value::Enum).ok_or(
                        ModelError::UnknownVariant {
                            enum_name: enum_type.name(),
                            value: name,
                        },
                    ),
                    other => Err(ModelError::type_mismatch(ValueType::String, &other)),
                })
            }
            Self::IntegralToEnum(enum_type) => {
                let enum_type = *enum_type;
                Arc::new(move |value: Value| {
                    value
                        .as_i128()
                        .and_then(|n| i64::try_from(n).ok())
                        .filter(|discriminant| enum_type.contains(*discriminant))
                        .map(Value::Enum)
                        .ok_or_else(|| ModelError::UnknownVariant {
                            enum_name: enum_type.name(),
                            value: value.to_string(),
                        })
                })
            }
            Self::EnumToString(enum_type) => {
                let enum_type = *enum_type;
                Arc::new(move |value: Value| {
                    let Value::Enum(discriminant) = value else {
                        return Err(ModelError::type_mismatch(ValueType::Enum(enum_type), &value));
                    };
                    enum_type
                        .name_of(discriminant)
                        .map(|name| Value::Str(name.to_string()))
                        .ok_or_else(|| ModelError::UnknownVariant {
                            enum_name: enum_type.name(),
                            value: discriminant.to_string(),
                        })
                })
            }
            Self::EnumToIntegral(to) => {
                let convert = converter(to);
                let to = to.clone();
                Arc::new(move |value: Value| {
                    let Value::Enum(discriminant) = value else {
                        return Err(ModelError::conversion(&value, &to));
                    };
                    let number = Value::I64(discriminant);
                    convert(&number).ok_or_else(|| ModelError::conversion(&number, &to))
                })
            }
            Self::Convert(to) => {
                let convert = converter(to);
                let to = to.clone();
                Arc::new(move |value: Value| {
                    convert(&value).ok_or_else(|| ModelError::conversion(&value, &to))
                })
            }
        }
    }
}

impl fmt::Display for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::WrapNullable { inner, .. } => write!(f, "wrap({inner})"),
            Self::UnwrapNullable { inner, .. } => write!(f, "unwrap({inner})"),
            Self::LiftNullable(inner) => write!(f, "lift({inner})"),
            Self::ParseEnum(enum_type) => write!(f, "parse {}", enum_type.name()),
            Self::IntegralToEnum(enum_type) => write!(f, "as {}", enum_type.name()),
            Self::EnumToString(_) => f.write_str("variant name"),
            Self::EnumToIntegral(to) => write!(f, "discriminant as {to}"),
            Self::Convert(to) => write!(f, "convert to {to}"),
        }
    }
}

fn resolve_plain(source: &ValueType, target: &ValueType) -> Result<Coercion, CoercionFailure> {
    if source == target {
        return Ok(Coercion::Identity);
    }
    match (source, target) {
        (ValueType::String, ValueType::Enum(enum_type)) => Ok(Coercion::ParseEnum(*enum_type)),
        (from, ValueType::Enum(enum_type)) if from.is_integral() => {
            Ok(Coercion::IntegralToEnum(*enum_type))
        }
        (ValueType::Enum(enum_type), ValueType::String) => Ok(Coercion::EnumToString(*enum_type)),
        (ValueType::Enum(_), to) if to.is_integral() => Ok(Coercion::EnumToIntegral(to.clone())),
        (from, to) if is_convertible(from, to) => Ok(Coercion::Convert(to.clone())),
        _ => Err(CoercionFailure::Incompatible),
    }
}

/// Whether the scalar conversion matrix has a path from `from` to `to`.
fn is_convertible(from: &ValueType, to: &ValueType) -> bool {
    use ValueType as V;

    let scalar = |t: &ValueType| t.is_numeric() || matches!(t, V::Bool | V::Char | V::String);
    if !scalar(from) || !scalar(to) {
        return false;
    }
    match (from, to) {
        (V::String, _) | (_, V::String) => true,
        (V::Char, to) => to.is_integral(),
        (from, V::Char) => from.is_integral(),
        // Remaining pairs are numeric or bool on both sides.
        _ => true,
    }
}

type Converter = fn(&Value) -> Option<Value>;

fn converter(to: &ValueType) -> Converter {
    match to {
        ValueType::Bool => to_bool,
        ValueType::Char => to_char,
        ValueType::I8 => to_i8,
        ValueType::I16 => to_i16,
        ValueType::I32 => to_i32,
        ValueType::I64 => to_i64,
        ValueType::U8 => to_u8,
        ValueType::U16 => to_u16,
        ValueType::U32 => to_u32,
        ValueType::U64 => to_u64,
        ValueType::F32 => to_f32,
        ValueType::F64 => to_f64,
        ValueType::String => to_string,
        ValueType::Enum(_) | ValueType::Nullable(_) => unconvertible,
    }
}

macro_rules! integral_converters {
    ($($name:ident => $ty:ty, $variant:ident);* $(;)?) => {
        $(
            fn $name(value: &Value) -> Option<Value> {
                let wide = match value {
                    Value::Str(s) => s.trim().parse::<i128>().ok()?,
                    Value::F32(f) => float_to_i128(f64::from(*f))?,
                    Value::F64(f) => float_to_i128(*f)?,
                    other => other.as_i128()?,
                };
                <$ty>::try_from(wide).ok().map(Value::$variant)
            }
        )*
    };
}

integral_converters! {
    to_i8 => i8, I8;
    to_i16 => i16, I16;
    to_i32 => i32, I32;
    to_i64 => i64, I64;
    to_u8 => u8, U8;
    to_u16 => u16, U16;
    to_u32 => u32, U32;
    to_u64 => u64, U64;
}

/// Rounds half to even, rejecting non-finite input.
fn float_to_i128(value: f64) -> Option<i128> {
    value.is_finite().then(|| value.round_ties_even() as i128)
}

fn to_f64(value: &Value) -> Option<Value> {
    match value {
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
    .map(Value::F64)
}

fn to_f32(value: &Value) -> Option<Value> {
    let converted = match value {
        Value::Str(s) => s.trim().parse::<f32>().ok()?,
        Value::F32(f) => *f,
        Value::F64(f) => {
            let narrowed = *f as f32;
            if f.is_finite() && narrowed.is_infinite() {
                return None;
            }
            narrowed
        }
        other => other.as_i128()? as f32,
    };
    Some(Value::F32(converted))
}

fn to_bool(value: &Value) -> Option<Value> {
    let converted = match value {
        Value::Bool(b) => *b,
        Value::Str(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                true
            } else if s.eq_ignore_ascii_case("false") {
                false
            } else {
                return None;
            }
        }
        Value::F32(f) => *f != 0.0,
        Value::F64(f) => *f != 0.0,
        other => other.as_i128()? != 0,
    };
    Some(Value::Bool(converted))
}

fn to_char(value: &Value) -> Option<Value> {
    match value {
        Value::Char(c) => Some(*c),
        Value::Str(s) => {
            let mut chars = s.chars();
            let first = chars.next()?;
            chars.next().is_none().then_some(first)
        }
        other => u32::try_from(other.as_i128()?)
            .ok()
            .and_then(char::from_u32),
    }
    .map(Value::Char)
}

fn to_string(value: &Value) -> Option<Value> {
    match value {
        Value::Null | Value::Enum(_) => None,
        other => Some(Value::Str(other.to_string())),
    }
}

fn unconvertible(_: &Value) -> Option<Value> {
    None
}
