//! Conversion traits between Rust types and console [`Value`]s.
//!
//! - [`FromValue`]: extract a Rust value from a bound argument
//! - [`IntoValue`]: turn a command's return value into a [`Value`]
//! - [`ParamValue`]: a [`FromValue`] type that also declares its [`ParamType`],
//!   so typed closures can describe their own parameters
//!
//! ## Supported types
//!
//! - Integers: `i8`, `i16`, `i32`, `i64`, `isize`, `u8`, `u16`, `u32`, `u64`, `usize`
//! - Floats: `f32`, `f64`
//! - Boolean: `bool`
//! - Strings: `String` (and `&'static str` for return values)
//! - Unit: `()` (void return)

use crate::error::ConversionError;
use crate::value::{ParamType, Value};

/// Extract a Rust value from a [`Value`].
pub trait FromValue: Sized {
    /// Extract a value, failing if the value has an incompatible type.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Convert a Rust value into a [`Value`].
pub trait IntoValue {
    /// Convert this value.
    fn into_value(self) -> Value;
}

/// A parameter type usable in a typed command closure.
pub trait ParamValue: FromValue {
    /// The console type the parameter is matched against.
    const PARAM_TYPE: ParamType;
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(*v).map_err(|_| {
                            ConversionError::IntegerOverflow {
                                value: *v,
                                target_type: stringify!($ty),
                            }
                        }),
                        _ => Err(ConversionError::TypeMismatch {
                            expected: "int",
                            actual: value.type_name(),
                        }),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }
            }

            impl ParamValue for $ty {
                const PARAM_TYPE: ParamType = ParamType::Int;
            }
        )*
    };
}

impl_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, usize);

// u64 can exceed i64 on the way out; clamp rather than wrap.
impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(v) => u64::try_from(*v).map_err(|_| ConversionError::IntegerOverflow {
                value: *v,
                target_type: "u64",
            }),
            _ => Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        Value::Int(i64::try_from(self).unwrap_or(i64::MAX))
    }
}

impl ParamValue for u64 {
    const PARAM_TYPE: ParamType = ParamType::Int;
}

// ============================================================================
// Float implementations
// ============================================================================

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            _ => Err(ConversionError::TypeMismatch {
                expected: "float",
                actual: value.type_name(),
            }),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let v = f64::from_value(value)?;
        if v.is_finite() && v.abs() > f32::MAX as f64 {
            return Err(ConversionError::FloatConversion {
                value: v,
                target_type: "f32",
            });
        }
        Ok(v as f32)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

impl ParamValue for f64 {
    const PARAM_TYPE: ParamType = ParamType::Float;
}

impl ParamValue for f32 {
    const PARAM_TYPE: ParamType = ParamType::Float;
}

// ============================================================================
// Bool, string and unit
// ============================================================================

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(v) => Ok(*v),
            _ => Err(ConversionError::TypeMismatch {
                expected: "bool",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ParamValue for bool {
    const PARAM_TYPE: ParamType = ParamType::Bool;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: value.type_name(),
            }),
        }
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &'static str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl ParamValue for String {
    const PARAM_TYPE: ParamType = ParamType::String;
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}
