//! Command discovery.
//!
//! Hosts describe their commands with a [`CommandSet`]: a builder that turns
//! typed Rust closures into [`Member`]s paired with [`CommandProperties`].
//! The console consumes any [`CommandSource`], filtered by module name.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use devcon::{CommandProperties, CommandSet};
//!
//! struct Player {
//!     health: i32,
//! }
//!
//! let gravity = Rc::new(RefCell::new(9.81f64));
//!
//! let mut set = CommandSet::new("game::player");
//! set.method(CommandProperties::new("add"), |a: i32, b: i32| a + b)
//!     .instance_method(
//!         CommandProperties::new("heal").cheat(),
//!         |player: &mut Player, amount: i32| player.health += amount,
//!     )
//!     .field(CommandProperties::new("gravity"), &gravity);
//! assert_eq!(set.len(), 3);
//! ```
//!
//! Closure parameters must be annotated so the parameter types can be
//! inferred.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use devcon_core::{CommandError, FromValue, IntoValue, ParamType, ParamValue, Value};

use crate::call::{CallContext, NativeFn};
use crate::member::{AccessorDef, CommandProperties, Member, MethodDef, TypeInfo};

/// A provider of command members, such as one module of a game.
pub trait CommandSource {
    /// Module name used for include/exclude filtering.
    fn module(&self) -> &str;

    /// The members this source declares.
    fn members(&self) -> Vec<(CommandProperties, Member)>;
}

// ============================================================================
// Return values
// ============================================================================

/// Values a typed command closure may return.
pub trait IntoCommandResult {
    fn into_command_result(self) -> Result<Value, CommandError>;
}

macro_rules! impl_command_result {
    ($($ty:ty),*) => {
        $(
            impl IntoCommandResult for $ty {
                fn into_command_result(self) -> Result<Value, CommandError> {
                    Ok(self.into_value())
                }
            }

            impl IntoCommandResult for Result<$ty, CommandError> {
                fn into_command_result(self) -> Result<Value, CommandError> {
                    self.map(IntoValue::into_value)
                }
            }
        )*
    };
}

impl_command_result!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, String,
    &'static str, (), Value
);

// ============================================================================
// Typed closures
// ============================================================================

/// Conversion of a typed closure into a static method overload.
pub trait IntoMethod<Marker> {
    fn into_method(self) -> MethodDef;
}

/// Conversion of a typed closure taking `&mut T` first into an instance
/// method overload declared on `T`.
pub trait IntoInstanceMethod<T, Marker> {
    fn into_instance_method(self) -> MethodDef;
}

macro_rules! impl_into_method {
    ($($arg:ident : $idx:tt),*) => {
        impl<F, R, $($arg,)*> IntoMethod<fn($($arg,)*) -> R> for F
        where
            F: Fn($($arg),*) -> R + 'static,
            R: IntoCommandResult,
            $($arg: ParamValue,)*
        {
            fn into_method(self) -> MethodDef {
                MethodDef::new(
                    &[$(<$arg as ParamValue>::PARAM_TYPE),*],
                    NativeFn::new(move |ctx: &mut CallContext<'_>| {
                        let value = (self)($(ctx.arg::<$arg>($idx)?),*).into_command_result()?;
                        ctx.set_return(value);
                        Ok(())
                    }),
                )
            }
        }

        impl<F, T, R, $($arg,)*> IntoInstanceMethod<T, fn(&mut T, $($arg,)*) -> R> for F
        where
            F: Fn(&mut T, $($arg),*) -> R + 'static,
            T: Any,
            R: IntoCommandResult,
            $($arg: ParamValue,)*
        {
            fn into_instance_method(self) -> MethodDef {
                MethodDef::new(
                    &[$(<$arg as ParamValue>::PARAM_TYPE),*],
                    NativeFn::new(move |ctx: &mut CallContext<'_>| {
                        let result = {
                            let mut target = ctx.this_mut::<T>()?;
                            (self)(&mut *target, $(ctx.arg::<$arg>($idx)?),*)
                        };
                        let value = result.into_command_result()?;
                        ctx.set_return(value);
                        Ok(())
                    }),
                )
                .with_declaring(TypeInfo::of::<T>())
            }
        }
    };
}

impl_into_method!();
impl_into_method!(A0: 0);
impl_into_method!(A0: 0, A1: 1);
impl_into_method!(A0: 0, A1: 1, A2: 2);
impl_into_method!(A0: 0, A1: 1, A2: 2, A3: 3);

// ============================================================================
// CommandSet
// ============================================================================

/// Builder collecting the commands of one module.
#[derive(Debug, Clone)]
pub struct CommandSet {
    module: String,
    members: Vec<(CommandProperties, Member)>,
}

impl CommandSet {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            members: Vec::new(),
        }
    }

    /// Add a prepared member.
    pub fn add(&mut self, props: CommandProperties, member: Member) -> &mut Self {
        self.members.push((props, member));
        self
    }

    /// Add a static method from a typed closure.
    pub fn method<M>(&mut self, props: CommandProperties, f: impl IntoMethod<M>) -> &mut Self {
        self.add(props, Member::Method(f.into_method()))
    }

    /// Add a prepared method overload, e.g. one with named or defaulted
    /// parameters.
    pub fn method_def(&mut self, props: CommandProperties, def: MethodDef) -> &mut Self {
        self.add(props, Member::Method(def))
    }

    /// Add an instance method from a typed closure whose first parameter is
    /// the target object.
    pub fn instance_method<T, M>(
        &mut self,
        props: CommandProperties,
        f: impl IntoInstanceMethod<T, M>,
    ) -> &mut Self {
        self.add(props, Member::Method(f.into_instance_method()))
    }

    /// Add a method with a raw body and explicit parameter types.
    pub fn native<F>(&mut self, props: CommandProperties, params: &[ParamType], f: F) -> &mut Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), CommandError> + 'static,
    {
        self.add(
            props,
            Member::Method(MethodDef::new(params, NativeFn::new(f))),
        )
    }

    /// Add a catch-all method receiving every argument as a string.
    pub fn catch_all<F>(&mut self, props: CommandProperties, f: F) -> &mut Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<(), CommandError> + 'static,
    {
        self.add(props, Member::Method(MethodDef::catch_all(NativeFn::new(f))))
    }

    /// Add a read/write property backed by closures.
    pub fn property<T, G, S>(&mut self, props: CommandProperties, get: G, set: S) -> &mut Self
    where
        T: ParamValue + IntoValue,
        G: Fn() -> T + 'static,
        S: Fn(T) + 'static,
    {
        let accessor = AccessorDef::new(T::PARAM_TYPE)
            .with_getter(move |_| Ok(get().into_value()))
            .with_setter(move |_, value| {
                set(T::from_value(&value)?);
                Ok(())
            });
        self.add(props, Member::Property(accessor))
    }

    /// Add a read-only property.
    pub fn readonly<T, G>(&mut self, props: CommandProperties, get: G) -> &mut Self
    where
        T: ParamValue + IntoValue,
        G: Fn() -> T + 'static,
    {
        let accessor =
            AccessorDef::new(T::PARAM_TYPE).with_getter(move |_| Ok(get().into_value()));
        self.add(props, Member::Property(accessor))
    }

    /// Add a write-only property.
    pub fn writeonly<T, S>(&mut self, props: CommandProperties, set: S) -> &mut Self
    where
        T: ParamValue,
        S: Fn(T) + 'static,
    {
        let accessor = AccessorDef::new(T::PARAM_TYPE).with_setter(move |_, value| {
            set(T::from_value(&value)?);
            Ok(())
        });
        self.add(props, Member::Property(accessor))
    }

    /// Add a field command over shared state.
    pub fn field<T>(&mut self, props: CommandProperties, cell: &Rc<RefCell<T>>) -> &mut Self
    where
        T: ParamValue + IntoValue + Clone + 'static,
    {
        let read = Rc::clone(cell);
        let write = Rc::clone(cell);
        let accessor = AccessorDef::new(T::PARAM_TYPE)
            .with_getter(move |_| {
                let current = read.try_borrow().map_err(|_| CommandError::TargetBorrowed)?;
                Ok(current.clone().into_value())
            })
            .with_setter(move |_, value| {
                let next = T::from_value(&value)?;
                *write
                    .try_borrow_mut()
                    .map_err(|_| CommandError::TargetBorrowed)? = next;
                Ok(())
            });
        self.add(props, Member::Field(accessor))
    }

    /// Add a field command over a member of instances of `O`.
    pub fn instance_field<O, T, G, S>(
        &mut self,
        props: CommandProperties,
        get: G,
        set: S,
    ) -> &mut Self
    where
        O: Any,
        T: ParamValue + IntoValue,
        G: Fn(&O) -> T + 'static,
        S: Fn(&mut O, T) + 'static,
    {
        let accessor = AccessorDef::new(T::PARAM_TYPE)
            .with_getter(move |ctx| {
                let target = ctx.this::<O>()?;
                Ok(get(&target).into_value())
            })
            .with_setter(move |ctx, value| {
                let next = T::from_value(&value)?;
                let mut target = ctx.this_mut::<O>()?;
                set(&mut target, next);
                Ok(())
            })
            .with_declaring(TypeInfo::of::<O>());
        self.add(props, Member::Field(accessor))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn into_members(self) -> Vec<(CommandProperties, Member)> {
        self.members
    }
}

impl CommandSource for CommandSet {
    fn module(&self) -> &str {
        &self.module
    }

    fn members(&self) -> Vec<(CommandProperties, Member)> {
        self.members.clone()
    }
}
