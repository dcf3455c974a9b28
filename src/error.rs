//! Error types for the console facade.
//!
//! ```text
//! RegistrationError   - a member could not be added to the registry or alias table
//! ExecutionError      - a resolved invocation could not run
//! └── CommandError    - the command body itself failed (from devcon-core)
//! PersistenceError    - the alias store could not be read or written
//! ConfigError         - the configuration file could not be read or parsed
//! ```

use std::path::PathBuf;

use thiserror::Error;

use devcon_core::CommandError;

use crate::member::BindingKind;
use crate::resolver::ValidState;

/// Errors raised when registering commands or aliases.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// The key is empty once cleansed.
    #[error("key '{raw}' is empty after cleansing")]
    EmptyKey { raw: String },

    /// The key is already bound to a different kind of member.
    #[error("'{key}' is already registered as a {existing}, cannot add a {incoming}")]
    KindMismatch {
        key: String,
        existing: BindingKind,
        incoming: BindingKind,
    },

    /// Static and instance members cannot share a key.
    #[error("'{key}' mixes static and instance members")]
    StaticMismatch { key: String },

    /// Instance members under one key must share a declaring type.
    #[error("'{key}' is already declared on another type")]
    DeclaringTypeMismatch { key: String },

    /// No command is registered under the key.
    #[error("no command registered as '{key}'")]
    UnknownCommand { key: String },

    /// The command has no overload with the given id.
    #[error("'{key}' has no such method")]
    UnknownMethod { key: String },
}

/// Errors raised when executing an invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// The invocation did not resolve.
    #[error("invocation was invalid: {0}")]
    InvocationWasInvalid(ValidState),

    /// The console is disabled.
    #[error("the console is inactive")]
    ConsoleInactive,

    /// The command is cheat-gated and cheats are off.
    #[error("'{key}' requires cheats to be enabled")]
    RequiresCheats { key: String },

    /// The command body failed.
    #[error("{0}")]
    Exception(#[from] CommandError),
}

/// Errors raised by the alias store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access alias file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("alias file {path} is not a valid alias map: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_error_messages() {
        let err = RegistrationError::KindMismatch {
            key: "speed".into(),
            existing: BindingKind::Property,
            incoming: BindingKind::Method,
        };
        assert_eq!(
            err.to_string(),
            "'speed' is already registered as a property, cannot add a method"
        );
    }

    #[test]
    fn exception_wraps_command_error() {
        let err: ExecutionError = CommandError::other("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
