//! devcon core crate.
//!
//! Types shared by the tokenizer, the registry and the resolver:
//!
//! - [`cleanse_key`]: canonical form for command and alias keys
//! - [`Value`] / [`ParamType`]: runtime values and declared parameter types
//! - [`Argument`]: one input word with its int/float/bool/string readings
//! - [`FromValue`] / [`IntoValue`] / [`ParamValue`]: Rust type bridge
//! - [`CommandFlags`]: cheat and hidden switches
//! - [`CommandError`] / [`ConversionError`]: failures inside a command call

mod argument;
mod convert;
mod error;
mod flags;
mod key;
mod value;

pub use argument::{Argument, Coercion};
pub use convert::{FromValue, IntoValue, ParamValue};
pub use error::{CommandError, ConversionError};
pub use flags::CommandFlags;
pub use key::{cleanse_key, is_cleansed};
pub use value::{ParamType, Value};
