//! Native function storage and the call context handed to command bodies.

use std::any::{Any, type_name};
use std::cell::{Ref, RefMut};
use std::fmt;
use std::rc::Rc;

use devcon_core::{CommandError, FromValue, IntoValue, Value};

use crate::console::Console;
use crate::member::Instance;

/// Type-erased command body.
///
/// Cloning shares the underlying callable.
#[derive(Clone)]
pub struct NativeFn {
    inner: Rc<dyn NativeCallable>,
}

impl NativeFn {
    /// Wrap a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: NativeCallable + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Call this function with the given context.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

/// Trait for callable command bodies.
pub trait NativeCallable {
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), CommandError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut CallContext<'_>) -> Result<(), CommandError>,
{
    fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
        (self)(ctx)
    }
}

/// Context for a single command call.
///
/// Gives the body its bound arguments, its instance target, a return slot and
/// the owning console.
///
/// ```ignore
/// let amount: i32 = ctx.arg(0)?;
/// ctx.this_mut::<Player>()?.health += amount;
/// ctx.set_return(amount);
/// ```
pub struct CallContext<'a> {
    console: &'a mut Console,
    args: Vec<Value>,
    raw_args: Vec<String>,
    target: Option<Instance>,
    return_value: Value,
}

impl<'a> CallContext<'a> {
    pub fn new(console: &'a mut Console, args: Vec<Value>, target: Option<Instance>) -> Self {
        Self {
            console,
            args,
            raw_args: Vec::new(),
            target,
            return_value: Value::Void,
        }
    }

    /// Attach the verbatim source text of each argument word.
    pub fn with_raw_args(mut self, raw_args: Vec<String>) -> Self {
        self.raw_args = raw_args;
        self
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// All bound arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Argument words as typed, quotes and escapes intact. Only populated for
    /// catch-all methods.
    pub fn raw_args(&self) -> &[String] {
        &self.raw_args
    }

    /// Get a raw argument value.
    pub fn arg_value(&self, index: usize) -> Result<&Value, CommandError> {
        self.args
            .get(index)
            .ok_or(CommandError::ArgumentIndexOutOfBounds {
                index,
                count: self.args.len(),
            })
    }

    /// Get a typed argument value.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, CommandError> {
        let value = self.arg_value(index)?;
        T::from_value(value).map_err(CommandError::Conversion)
    }

    /// The instance target, if the command is an instance command.
    pub fn target(&self) -> Option<&Instance> {
        self.target.as_ref()
    }

    /// Borrow the instance target as `T`.
    pub fn this<T: Any>(&self) -> Result<Ref<'_, T>, CommandError> {
        let target = self.require_target()?;
        let borrowed = target
            .try_borrow()
            .map_err(|_| CommandError::TargetBorrowed)?;
        Ref::filter_map(borrowed, |any| any.downcast_ref::<T>())
            .map_err(|_| wrong_target_type::<T>())
    }

    /// Mutably borrow the instance target as `T`.
    pub fn this_mut<T: Any>(&self) -> Result<RefMut<'_, T>, CommandError> {
        let target = self.require_target()?;
        let borrowed = target
            .try_borrow_mut()
            .map_err(|_| CommandError::TargetBorrowed)?;
        RefMut::filter_map(borrowed, |any| any.downcast_mut::<T>())
            .map_err(|_| wrong_target_type::<T>())
    }

    fn require_target(&self) -> Result<&Instance, CommandError> {
        self.target
            .as_ref()
            .ok_or_else(|| CommandError::invalid_this("command has no instance target"))
    }

    /// The console running this command.
    pub fn console(&mut self) -> &mut Console {
        self.console
    }

    /// Set the value reported back to the console.
    pub fn set_return<T: IntoValue>(&mut self, value: T) {
        self.return_value = value.into_value();
    }

    /// Take the return value, leaving `Void`.
    pub fn take_return(&mut self) -> Value {
        std::mem::take(&mut self.return_value)
    }
}

fn wrong_target_type<T>() -> CommandError {
    CommandError::invalid_this(format!("target is not a {}", type_name::<T>()))
}
