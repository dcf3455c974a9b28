//! An in-process command console.
//!
//! Host code registers typed commands (methods, properties and fields) and the
//! console runs free-text input against them:
//!
//! ```
//! use devcon::{CommandProperties, CommandSet, Console, ConsoleConfig};
//!
//! let mut set = CommandSet::new("game");
//! set.method(CommandProperties::new("add"), |a: i64, b: i64| a + b);
//!
//! let mut console = Console::with_builtins(ConsoleConfig::default());
//! console.install(&set);
//! console.run_input("add 2 3; echo done");
//!
//! let lines: Vec<_> = console.output().lines().map(|l| l.message.as_str()).collect();
//! assert_eq!(lines, ["> add 2 3; echo done", "5", "done"]);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! run_input ─► split statements ─► alias substitution ─► resolve ─► execute
//!                 (devcon-parser)      (AliasTable)        │           │
//!                                                          │           └─► OutputLog
//!                                              CommandRegistry + InstanceFinder
//! ```
//!
//! Resolution picks the best overload for the argument words. Quoted words
//! only bind to string parameters, integers widen to float parameters, and
//! more specific overloads beat generic string ones. See [`resolver`].

pub mod alias;
pub mod autofill;
pub mod builtins;
pub mod call;
pub mod config;
pub mod console;
pub mod discovery;
pub mod error;
pub mod history;
pub mod instance;
pub mod invocation;
pub mod member;
pub mod output;
pub mod persistence;
pub mod registry;
pub mod resolver;

pub use alias::{AliasTable, Substitution};
pub use autofill::{AutofillRequest, AutofillSession, AutofillSuggestion};
pub use call::{CallContext, NativeFn};
pub use config::{ConsoleConfig, DiscoveryConfig};
pub use console::Console;
pub use discovery::{CommandSet, CommandSource};
pub use error::{ConfigError, ExecutionError, PersistenceError, RegistrationError};
pub use history::InputHistory;
pub use instance::{InstanceFinder, InstanceRegistry};
pub use invocation::{BoundCall, Invocation, Outcome};
pub use member::{
    AccessorDef, BindingKind, CommandProperties, Instance, Member, MethodDef, MethodId, ParamDef,
    TypeInfo,
};
pub use output::{LogLine, OutputLog, Severity};
pub use persistence::{AliasStore, JsonAliasStore};
pub use registry::{Binding, Command, CommandRegistry};
pub use resolver::ValidState;

pub use devcon_core::{
    Argument, CommandError, CommandFlags, ConversionError, FromValue, IntoValue, ParamType,
    ParamValue, Value, cleanse_key,
};
