//! Resolved invocations and their execution.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use devcon_core::{Argument, CommandError, Value};

use crate::call::CallContext;
use crate::console::Console;
use crate::error::ExecutionError;
use crate::member::{AccessorDef, Instance, MethodDef};
use crate::output::Severity;
use crate::registry::Command;
use crate::resolver::ValidState;

/// The call a valid invocation will make.
#[derive(Debug, Clone)]
pub enum BoundCall {
    Method {
        method: MethodDef,
        args: Vec<Value>,
        /// Verbatim argument words, for catch-all methods.
        raw_args: Vec<String>,
        target: Option<Instance>,
    },
    Read {
        accessor: AccessorDef,
        target: Option<Instance>,
    },
    /// The argument is coerced to the accessor's type when executed.
    Write {
        accessor: AccessorDef,
        argument: Argument,
        target: Option<Instance>,
    },
}

/// What a successful execution produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A method ran and returned this value (`Void` for none).
    Returned(Value),
    /// A property or field was read.
    Read(Value),
    /// A property or field was set to this value.
    Written(Value),
    /// The property or field is read-only; the value was ignored.
    WriteIgnored,
}

/// One resolved statement, ready to execute once.
#[derive(Debug, Clone)]
pub struct Invocation {
    key: String,
    state: ValidState,
    command: Option<Command>,
    call: Option<BoundCall>,
}

impl Invocation {
    pub(crate) fn invalid(key: String, state: ValidState) -> Self {
        Self {
            key,
            state,
            command: None,
            call: None,
        }
    }

    pub(crate) fn failed(command: &Command, state: ValidState) -> Self {
        Self {
            key: command.key().to_string(),
            state,
            command: Some(command.clone()),
            call: None,
        }
    }

    pub(crate) fn valid(command: &Command, call: BoundCall) -> Self {
        Self {
            key: command.key().to_string(),
            state: ValidState::Valid,
            command: Some(command.clone()),
            call: Some(call),
        }
    }

    /// The cleansed key typed by the user.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> ValidState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    /// The matched command, if the key was found.
    pub fn command(&self) -> Option<&Command> {
        self.command.as_ref()
    }

    pub fn call(&self) -> Option<&BoundCall> {
        self.call.as_ref()
    }

    /// Execute the invocation against `console`.
    ///
    /// Failures of the command body, including panics, are returned as
    /// [`ExecutionError::Exception`].
    pub fn execute(self, console: &mut Console) -> Result<Outcome, ExecutionError> {
        let (Some(command), Some(call)) = (self.command, self.call) else {
            return Err(ExecutionError::InvocationWasInvalid(self.state));
        };
        if !console.is_enabled() {
            return Err(ExecutionError::ConsoleInactive);
        }
        if command.is_cheat() && !console.cheats_enabled() {
            if !console.config().auto_enable_cheats {
                return Err(ExecutionError::RequiresCheats { key: self.key });
            }
            warn!(key = %self.key, "auto-enabling cheats");
            console.set_cheats(true);
            console.log(
                format!("Cheats were enabled automatically to run '{}'", self.key),
                Severity::Warning,
            );
        }

        debug!(key = %self.key, "executing");
        let key = self.key;
        match panic::catch_unwind(AssertUnwindSafe(|| call.run(console, &key))) {
            Ok(result) => result.map_err(ExecutionError::Exception),
            Err(payload) => Err(ExecutionError::Exception(CommandError::Panic {
                message: panic_message(payload.as_ref()),
            })),
        }
    }
}

impl BoundCall {
    fn run(self, console: &mut Console, key: &str) -> Result<Outcome, CommandError> {
        match self {
            BoundCall::Method {
                method,
                args,
                raw_args,
                target,
            } => {
                let mut ctx = CallContext::new(console, args, target).with_raw_args(raw_args);
                method.call(&mut ctx)?;
                Ok(Outcome::Returned(ctx.take_return()))
            }
            BoundCall::Read { accessor, target } => {
                let getter = accessor.getter().ok_or_else(|| CommandError::WriteOnly {
                    key: key.to_string(),
                })?;
                let mut ctx = CallContext::new(console, Vec::new(), target);
                Ok(Outcome::Read(getter(&mut ctx)?))
            }
            BoundCall::Write {
                accessor,
                argument,
                target,
            } => {
                let Some(setter) = accessor.setter() else {
                    return Ok(Outcome::WriteIgnored);
                };
                let value = argument.to_value(accessor.value_type())?;
                let mut ctx = CallContext::new(console, Vec::new(), target);
                setter(&mut ctx, value.clone())?;
                Ok(Outcome::Written(value))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
