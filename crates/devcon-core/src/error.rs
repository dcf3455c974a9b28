//! Error types shared by every layer of the console.
//!
//! ```text
//! CommandError            - raised by a command body or the call bridge
//! └── ConversionError     - a value could not be coerced to the requested type
//! ```
//!
//! Resolution, registration and execution failures live in the `devcon`
//! crate next to the code that produces them.

use thiserror::Error;

/// Errors that occur when coercing an argument or value to a concrete type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The value has the wrong type for the requested conversion.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The text of an argument cannot be interpreted as the requested type.
    #[error("cannot interpret '{text}' as {target_type}")]
    Unparsable {
        text: String,
        target_type: &'static str,
    },

    /// A quoted argument was offered to a non-string parameter.
    #[error("quoted argument '{text}' can only be used as a string")]
    LiteralNotString { text: String },

    /// Integer does not fit in the target type.
    #[error("integer overflow: value {value} does not fit in {target_type}")]
    IntegerOverflow { value: i64, target_type: &'static str },

    /// Float cannot be represented in the target type.
    #[error("float conversion error: value {value} cannot be represented as {target_type}")]
    FloatConversion {
        value: f64,
        target_type: &'static str,
    },
}

/// Errors raised while a command body runs.
///
/// Command implementations return this from their native function; the
/// executor surfaces it as an exception outcome without unwinding further.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    /// Error converting arguments or return values.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// The instance target is missing or has the wrong type.
    #[error("invalid instance target: {message}")]
    InvalidThis { message: String },

    /// Argument index out of bounds.
    #[error("argument index {index} out of bounds (command has {count} arguments)")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// The instance target is already borrowed elsewhere.
    #[error("instance target is already in use")]
    TargetBorrowed,

    /// A write was attempted on a read-only property or field.
    #[error("'{key}' is read-only")]
    ReadOnly { key: String },

    /// A read was attempted on a write-only property.
    #[error("'{key}' is write-only")]
    WriteOnly { key: String },

    /// The command body panicked.
    #[error("command panicked: {message}")]
    Panic { message: String },

    /// Free-form failure reported by a command body.
    #[error("{message}")]
    Other { message: String },
}

impl CommandError {
    /// Create an "invalid this" error with a message.
    pub fn invalid_this(message: impl Into<String>) -> Self {
        CommandError::InvalidThis {
            message: message.into(),
        }
    }

    /// Create a free-form command error.
    pub fn other(message: impl Into<String>) -> Self {
        CommandError::Other {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_messages() {
        let err = ConversionError::Unparsable {
            text: "abc".into(),
            target_type: "int",
        };
        assert_eq!(err.to_string(), "cannot interpret 'abc' as int");

        let err = ConversionError::IntegerOverflow {
            value: 300,
            target_type: "u8",
        };
        assert!(err.to_string().contains("300"));
        assert!(err.to_string().contains("u8"));
    }

    #[test]
    fn command_error_wraps_conversion() {
        let err: CommandError = ConversionError::LiteralNotString { text: "5".into() }.into();
        assert!(matches!(err, CommandError::Conversion(_)));
        assert!(err.to_string().starts_with("conversion error"));
    }

    #[test]
    fn command_error_helpers() {
        assert!(matches!(
            CommandError::invalid_this("x"),
            CommandError::InvalidThis { .. }
        ));
        assert_eq!(CommandError::other("boom").to_string(), "boom");
    }
}
