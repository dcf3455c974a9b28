//! Member definitions: what a command key is bound to.
//!
//! A command is backed by one of three member kinds:
//!
//! - [`MethodDef`]: a callable overload with typed parameters
//! - property: an [`AccessorDef`] whose getter/setter run code
//! - field: an [`AccessorDef`] over stored state
//!
//! Members are produced by a [`CommandSet`](crate::CommandSet) (or built by
//! hand) and handed to the registry together with [`CommandProperties`].

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use devcon_core::{CommandError, ParamType, Value};

use crate::autofill::AutofillRequest;
use crate::call::{CallContext, NativeFn};

/// A live host object addressed by instance commands.
pub type Instance = Rc<RefCell<dyn Any>>;

/// Custom autofill callback attached to a command.
///
/// Returns the full replacement for the word being completed, or `None`.
pub type AutofillFn = Rc<dyn Fn(&AutofillRequest<'_>) -> Option<String>>;

/// Property/field read accessor.
pub type Getter = Rc<dyn Fn(&mut CallContext<'_>) -> Result<Value, CommandError>>;

/// Property/field write accessor.
pub type Setter = Rc<dyn Fn(&mut CallContext<'_>, Value) -> Result<(), CommandError>>;

// ============================================================================
// Type descriptors
// ============================================================================

/// Describes the type declaring an instance member.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    searchable: bool,
}

impl TypeInfo {
    /// Describe `T`. Instances of `T` can be looked up by name.
    pub fn of<T: Any>() -> Self {
        let full = std::any::type_name::<T>();
        Self {
            id: TypeId::of::<T>(),
            name: full.rsplit("::").next().unwrap_or(full),
            searchable: true,
        }
    }

    /// Mark the type as not addressable through the instance finder.
    pub fn not_searchable(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

// ============================================================================
// Methods
// ============================================================================

/// Unique identity of a registered method overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(u64);

impl MethodId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        MethodId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One declared parameter of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub ty: ParamType,
    /// Value used when the caller omits this argument.
    pub default: Option<Value>,
}

/// A single method overload.
#[derive(Clone)]
pub struct MethodDef {
    id: MethodId,
    params: Vec<ParamDef>,
    declaring: Option<TypeInfo>,
    catch_all: bool,
    func: NativeFn,
}

impl MethodDef {
    /// Create a method with positional parameters of the given types.
    ///
    /// Parameters are named `arg0`, `arg1`, ... until renamed with
    /// [`named`](Self::named).
    pub fn new(params: &[ParamType], func: NativeFn) -> Self {
        let params = params
            .iter()
            .enumerate()
            .map(|(i, &ty)| ParamDef {
                name: format!("arg{i}"),
                ty,
                default: None,
            })
            .collect();
        Self {
            id: MethodId::next(),
            params,
            declaring: None,
            catch_all: false,
            func,
        }
    }

    /// Create a catch-all method that receives every argument as a string.
    pub fn catch_all(func: NativeFn) -> Self {
        Self {
            id: MethodId::next(),
            params: Vec::new(),
            declaring: None,
            catch_all: true,
            func,
        }
    }

    /// Rename parameters in order. Extra names are ignored.
    pub fn named<S: AsRef<str>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        for (param, name) in self.params.iter_mut().zip(names) {
            param.name = name.as_ref().to_string();
        }
        self
    }

    /// Give parameter `index` a default value.
    pub fn with_default(mut self, index: usize, value: impl devcon_core::IntoValue) -> Self {
        if let Some(param) = self.params.get_mut(index) {
            param.default = Some(value.into_value());
        }
        self
    }

    /// Bind the method to instances of a declaring type.
    pub fn with_declaring(mut self, ty: TypeInfo) -> Self {
        self.declaring = Some(ty);
        self
    }

    pub fn id(&self) -> MethodId {
        self.id
    }

    pub fn params(&self) -> &[ParamDef] {
        &self.params
    }

    /// Number of parameters without a default.
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }

    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    pub fn declaring(&self) -> Option<&TypeInfo> {
        self.declaring.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.declaring.is_none()
    }

    /// Invoke the underlying native function.
    pub fn call(&self, ctx: &mut CallContext<'_>) -> Result<(), CommandError> {
        self.func.call(ctx)
    }

    /// Parameter list as shown in usage guides, e.g. `<int amount> [string name = bob]`.
    pub fn signature(&self) -> String {
        if self.catch_all {
            return "[args...]".to_string();
        }
        self.params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("[{} {} = {}]", p.ty, p.name, default),
                None => format!("<{} {}>", p.ty, p.name),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("declaring", &self.declaring)
            .field("catch_all", &self.catch_all)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Properties and fields
// ============================================================================

/// Getter/setter pair for a property or field command.
#[derive(Clone)]
pub struct AccessorDef {
    value_type: ParamType,
    getter: Option<Getter>,
    setter: Option<Setter>,
    declaring: Option<TypeInfo>,
}

impl AccessorDef {
    /// Create an accessor with neither getter nor setter.
    pub fn new(value_type: ParamType) -> Self {
        Self {
            value_type,
            getter: None,
            setter: None,
            declaring: None,
        }
    }

    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&mut CallContext<'_>) -> Result<Value, CommandError> + 'static,
    {
        self.getter = Some(Rc::new(getter));
        self
    }

    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut CallContext<'_>, Value) -> Result<(), CommandError> + 'static,
    {
        self.setter = Some(Rc::new(setter));
        self
    }

    pub fn with_declaring(mut self, ty: TypeInfo) -> Self {
        self.declaring = Some(ty);
        self
    }

    pub fn value_type(&self) -> ParamType {
        self.value_type
    }

    pub fn can_read(&self) -> bool {
        self.getter.is_some()
    }

    pub fn can_write(&self) -> bool {
        self.setter.is_some()
    }

    pub fn getter(&self) -> Option<&Getter> {
        self.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }

    pub fn declaring(&self) -> Option<&TypeInfo> {
        self.declaring.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.declaring.is_none()
    }
}

impl fmt::Debug for AccessorDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorDef")
            .field("value_type", &self.value_type)
            .field("can_read", &self.can_read())
            .field("can_write", &self.can_write())
            .field("declaring", &self.declaring)
            .finish()
    }
}

// ============================================================================
// Member
// ============================================================================

/// The kind of member a command is bound to. Fixed at command creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Method,
    Property,
    Field,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingKind::Method => "method",
            BindingKind::Property => "property",
            BindingKind::Field => "field",
        })
    }
}

/// A member handed to the registry.
#[derive(Debug, Clone)]
pub enum Member {
    Method(MethodDef),
    Property(AccessorDef),
    Field(AccessorDef),
}

impl Member {
    pub fn kind(&self) -> BindingKind {
        match self {
            Member::Method(_) => BindingKind::Method,
            Member::Property(_) => BindingKind::Property,
            Member::Field(_) => BindingKind::Field,
        }
    }

    pub fn declaring(&self) -> Option<&TypeInfo> {
        match self {
            Member::Method(def) => def.declaring(),
            Member::Property(def) | Member::Field(def) => def.declaring(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.declaring().is_none()
    }
}

/// Metadata declared alongside a member.
///
/// Only `key` is required. Blank names and descriptions, a zero priority and
/// a missing autofill callback leave an existing command's values untouched
/// when merged.
#[derive(Clone, Default)]
pub struct CommandProperties {
    pub key: String,
    pub name: String,
    pub description: String,
    pub cheat: bool,
    pub hidden: bool,
    pub priority: i32,
    pub autofill: Option<AutofillFn>,
}

impl CommandProperties {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn cheat(mut self) -> Self {
        self.cheat = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn autofill<F>(mut self, autofill: F) -> Self
    where
        F: Fn(&AutofillRequest<'_>) -> Option<String> + 'static,
    {
        self.autofill = Some(Rc::new(autofill));
        self
    }
}

impl fmt::Debug for CommandProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandProperties")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("cheat", &self.cheat)
            .field("hidden", &self.hidden)
            .field("priority", &self.priority)
            .field("autofill", &self.autofill.is_some())
            .finish()
    }
}
