//! Runtime values passed to and returned from commands.

use std::fmt;

/// A value bound to a command parameter, returned by a command, or read from
/// a property.
///
/// All integer widths are carried as `i64` and all float widths as `f64`;
/// narrowing happens in [`FromValue`](crate::FromValue) with bounds checks.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (commands returning `()`).
    #[default]
    Void,
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// String value.
    String(String),
}

impl Value {
    /// Get a human-readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
        }
    }

    /// Check if this value is void.
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Borrow the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
        }
    }
}

/// The declared type of a command parameter, property or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int,
    Float,
    Bool,
    String,
}

impl ParamType {
    /// Name used in usage guides and error messages.
    pub fn name(self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::String => "string",
        }
    }

    /// Whether this is the generic string type.
    ///
    /// String parameters accept any word, so they never contribute to an
    /// overload's specificity score.
    #[inline]
    pub fn is_string(self) -> bool {
        matches!(self, ParamType::String)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
