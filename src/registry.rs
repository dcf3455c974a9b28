//! CommandRegistry - storage for every command the console can run.
//!
//! Commands are stored by cleansed key. A key is bound to exactly one
//! [`Binding`]: a list of method overloads, one property accessor or one
//! field accessor. The binding kind and the static/instance split are fixed
//! by the first member registered under the key.
//!
//! # Property merging
//!
//! Registering another member under an existing key merges its
//! [`CommandProperties`] into the command:
//!
//! - name and description are replaced only by non-blank values
//! - cheat and hidden flags are OR'd
//! - priority is replaced only by a nonzero value
//! - an autofill callback replaces the existing one
//!
//! # Example
//!
//! ```
//! use devcon::{CommandProperties, CommandRegistry, CommandSet};
//!
//! let mut set = CommandSet::new("game");
//! set.method(CommandProperties::new("Spawn Enemy"), |count: i32| count * 2);
//!
//! let mut registry = CommandRegistry::new();
//! for (props, member) in set.into_members() {
//!     registry.register(props, member).unwrap();
//! }
//! assert!(registry.get("spawn_enemy").is_some());
//! ```

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use devcon_core::{CommandFlags, cleanse_key};

use crate::error::RegistrationError;
use crate::member::{
    AccessorDef, AutofillFn, BindingKind, CommandProperties, Member, MethodDef, MethodId, TypeInfo,
};

/// What a command is bound to.
#[derive(Debug, Clone)]
pub enum Binding {
    Methods(Vec<MethodDef>),
    Property(AccessorDef),
    Field(AccessorDef),
}

impl Binding {
    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Methods(_) => BindingKind::Method,
            Binding::Property(_) => BindingKind::Property,
            Binding::Field(_) => BindingKind::Field,
        }
    }
}

/// A registered command.
#[derive(Clone)]
pub struct Command {
    key: String,
    name: String,
    description: String,
    flags: CommandFlags,
    priority: i32,
    binding: Binding,
    declaring: Option<TypeInfo>,
    is_static: bool,
    usage: String,
    autofill: Option<AutofillFn>,
}

impl Command {
    fn create(key: String, props: CommandProperties, member: Member) -> Self {
        let declaring = member.declaring().copied();
        let is_static = member.is_static();
        let binding = match member {
            Member::Method(def) => Binding::Methods(vec![def]),
            Member::Property(def) => Binding::Property(def),
            Member::Field(def) => Binding::Field(def),
        };
        let name = if props.name.trim().is_empty() {
            key.clone()
        } else {
            props.name
        };
        let mut command = Self {
            key,
            name,
            description: props.description,
            flags: CommandFlags::from_switches(props.cheat, props.hidden),
            priority: props.priority,
            binding,
            declaring,
            is_static,
            usage: String::new(),
            autofill: props.autofill,
        };
        command.rebuild_usage();
        command
    }

    fn merge(&mut self, props: CommandProperties) {
        if !props.name.trim().is_empty() {
            self.name = props.name;
        }
        if !props.description.trim().is_empty() {
            self.description = props.description;
        }
        self.flags |= CommandFlags::from_switches(props.cheat, props.hidden);
        if props.priority != 0 {
            self.priority = props.priority;
        }
        if props.autofill.is_some() {
            self.autofill = props.autofill;
        }
    }

    fn rebuild_usage(&mut self) {
        let target = match &self.declaring {
            Some(ty) if !self.is_static => format!(" <{} name>", ty.name()),
            _ => String::new(),
        };
        let lines: Vec<String> = match &self.binding {
            Binding::Methods(methods) => methods
                .iter()
                .map(|m| {
                    let signature = m.signature();
                    if signature.is_empty() {
                        format!("{}{}", self.key, target)
                    } else {
                        format!("{}{} {}", self.key, target, signature)
                    }
                })
                .collect(),
            Binding::Property(accessor) | Binding::Field(accessor) => {
                let mut line = format!("{}{}", self.key, target);
                if accessor.can_write() {
                    line.push_str(&format!(" [{} value]", accessor.value_type()));
                }
                vec![line]
            }
        };
        self.usage = lines.join("\n");
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    pub fn is_cheat(&self) -> bool {
        self.flags.is_cheat()
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.is_hidden()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn kind(&self) -> BindingKind {
        self.binding.kind()
    }

    /// Method overloads in registration order. Empty for accessor commands.
    pub fn methods(&self) -> &[MethodDef] {
        match &self.binding {
            Binding::Methods(methods) => methods,
            _ => &[],
        }
    }

    pub fn declaring_type(&self) -> Option<&TypeInfo> {
        self.declaring.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Usage guide, one line per overload.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn autofill(&self) -> Option<&AutofillFn> {
        self.autofill.as_ref()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("priority", &self.priority)
            .field("binding", &self.binding)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Command storage keyed by cleansed key.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: FxHashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a member under `props.key`.
    ///
    /// Creates the command on first use; afterwards the member must match the
    /// command's binding kind, static/instance split and declaring type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn register(
        &mut self,
        props: CommandProperties,
        member: Member,
    ) -> Result<(), RegistrationError> {
        let key = cleanse_key(&props.key);
        if key.is_empty() {
            warn!(raw = %props.key, "rejected command with empty key");
            return Err(RegistrationError::EmptyKey { raw: props.key });
        }

        let Some(command) = self.commands.get_mut(&key) else {
            debug!(%key, kind = %member.kind(), "registered command");
            let command = Command::create(key.clone(), props, member);
            self.commands.insert(key, command);
            return Ok(());
        };

        if command.kind() != member.kind() {
            warn!(%key, existing = %command.kind(), incoming = %member.kind(), "rejected member");
            return Err(RegistrationError::KindMismatch {
                key,
                existing: command.kind(),
                incoming: member.kind(),
            });
        }
        if command.is_static != member.is_static() {
            warn!(%key, "rejected member mixing static and instance bindings");
            return Err(RegistrationError::StaticMismatch { key });
        }
        if command.declaring.as_ref() != member.declaring() {
            warn!(%key, "rejected member declared on a different type");
            return Err(RegistrationError::DeclaringTypeMismatch { key });
        }

        command.merge(props);
        match (&mut command.binding, member) {
            (Binding::Methods(methods), Member::Method(def)) => methods.push(def),
            (Binding::Property(slot), Member::Property(def))
            | (Binding::Field(slot), Member::Field(def)) => *slot = def,
            // Kinds were checked above.
            _ => {}
        }
        command.rebuild_usage();
        debug!(%key, overloads = command.methods().len(), "merged command");
        Ok(())
    }

    /// Remove one overload. Removing the last overload removes the command.
    pub fn unregister_method(&mut self, key: &str, id: MethodId) -> Result<(), RegistrationError> {
        let key = cleanse_key(key);
        let command = self
            .commands
            .get_mut(&key)
            .ok_or_else(|| RegistrationError::UnknownCommand { key: key.clone() })?;

        let Binding::Methods(methods) = &mut command.binding else {
            return Err(RegistrationError::KindMismatch {
                key,
                existing: command.kind(),
                incoming: BindingKind::Method,
            });
        };
        let before = methods.len();
        methods.retain(|m| m.id() != id);
        if methods.len() == before {
            return Err(RegistrationError::UnknownMethod { key });
        }

        if methods.is_empty() {
            self.commands.remove(&key);
            debug!(%key, "removed command with its last overload");
        } else {
            command.rebuild_usage();
        }
        Ok(())
    }

    /// Remove a command outright.
    pub fn unregister(&mut self, key: &str) -> Option<Command> {
        self.commands.remove(&cleanse_key(key))
    }

    /// Remove every command.
    pub fn unregister_all(&mut self) {
        self.commands.clear();
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Look up a command. The key is cleansed first.
    pub fn get(&self, key: &str) -> Option<&Command> {
        self.commands.get(&cleanse_key(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Visible commands, highest priority first, then by key.
    ///
    /// Hidden commands are never listed; cheat commands only when
    /// `include_cheats` is set.
    pub fn enumerate(&self, include_cheats: bool) -> Vec<&Command> {
        let mut visible: Vec<&Command> = self
            .commands
            .values()
            .filter(|c| !c.is_hidden() && (include_cheats || !c.is_cheat()))
            .collect();
        visible.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.key.cmp(&b.key)));
        visible
    }

    /// Every command, including hidden and cheat commands, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }
}

#[cfg(test)]
mod tests {
    use devcon_core::ParamType;

    use super::*;
    use crate::call::{CallContext, NativeFn};

    fn method(params: &[ParamType]) -> MethodDef {
        MethodDef::new(params, NativeFn::new(|_: &mut CallContext<'_>| Ok(())))
    }

    fn props(key: &str) -> CommandProperties {
        CommandProperties::new(key)
    }

    struct Player;
    struct Door;

    #[test]
    fn register_cleanses_key() {
        let mut registry = CommandRegistry::new();
        registry
            .register(props("Spawn Enemy!"), Member::Method(method(&[])))
            .unwrap();
        assert!(registry.get("spawn_enemy").is_some());
        assert!(registry.get("SPAWN ENEMY").is_some());
        assert_eq!(registry.get("spawn_enemy").unwrap().name(), "spawn_enemy");
    }

    #[test]
    fn empty_key_rejected() {
        let mut registry = CommandRegistry::new();
        let err = registry
            .register(props("!!"), Member::Method(method(&[])))
            .unwrap_err();
        assert!(matches!(err, RegistrationError::EmptyKey { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn overloads_accumulate_and_merge() {
        let mut registry = CommandRegistry::new();
        registry
            .register(
                props("give").name("Give").description("Give items").priority(5),
                Member::Method(method(&[])),
            )
            .unwrap();
        registry
            .register(props("give").cheat(), Member::Method(method(&[ParamType::Int])))
            .unwrap();

        let command = registry.get("give").unwrap();
        assert_eq!(command.methods().len(), 2);
        assert!(command.is_cheat());
        assert_eq!(command.name(), "Give");
        assert_eq!(command.description(), "Give items");
        assert_eq!(command.priority(), 5);
        assert_eq!(command.usage(), "give\ngive <int arg0>");
    }

    #[test]
    fn kind_and_static_mismatch_rejected() {
        let mut registry = CommandRegistry::new();
        registry
            .register(props("speed"), Member::Property(AccessorDef::new(ParamType::Float)))
            .unwrap();
        assert!(matches!(
            registry.register(props("speed"), Member::Method(method(&[]))),
            Err(RegistrationError::KindMismatch { .. })
        ));

        registry
            .register(props("heal"), Member::Method(method(&[])))
            .unwrap();
        let instance = method(&[ParamType::Int]).with_declaring(TypeInfo::of::<Player>());
        assert!(matches!(
            registry.register(props("heal"), Member::Method(instance)),
            Err(RegistrationError::StaticMismatch { .. })
        ));
        assert_eq!(registry.get("heal").unwrap().methods().len(), 1);
    }

    #[test]
    fn declaring_type_mismatch_rejected() {
        let mut registry = CommandRegistry::new();
        let on_player = method(&[]).with_declaring(TypeInfo::of::<Player>());
        registry
            .register(props("open"), Member::Method(on_player))
            .unwrap();

        let on_door = method(&[ParamType::Int]).with_declaring(TypeInfo::of::<Door>());
        assert_eq!(
            registry.register(props("open"), Member::Method(on_door)),
            Err(RegistrationError::DeclaringTypeMismatch { key: "open".into() })
        );

        let also_player = method(&[ParamType::Int]).with_declaring(TypeInfo::of::<Player>());
        registry
            .register(props("open"), Member::Method(also_player))
            .unwrap();
        assert_eq!(registry.get("open").unwrap().methods().len(), 2);
    }

    #[test]
    fn removing_last_method_removes_command() {
        let mut registry = CommandRegistry::new();
        let first = method(&[]);
        let second = method(&[ParamType::Int]);
        let (first_id, second_id) = (first.id(), second.id());
        registry.register(props("f"), Member::Method(first)).unwrap();
        registry.register(props("f"), Member::Method(second)).unwrap();

        registry.unregister_method("f", first_id).unwrap();
        assert_eq!(registry.get("f").unwrap().methods().len(), 1);
        assert!(matches!(
            registry.unregister_method("f", first_id),
            Err(RegistrationError::UnknownMethod { .. })
        ));

        registry.unregister_method("f", second_id).unwrap();
        assert!(registry.get("f").is_none());
    }

    #[test]
    fn unregister_accessor_and_all() {
        let mut registry = CommandRegistry::new();
        registry
            .register(props("gravity"), Member::Field(AccessorDef::new(ParamType::Float)))
            .unwrap();
        registry
            .register(props("quit"), Member::Method(method(&[])))
            .unwrap();
        assert!(registry.unregister("Gravity").is_some());
        assert!(!registry.contains("gravity"));
        registry.unregister_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn enumerate_sorts_and_filters() {
        let mut registry = CommandRegistry::new();
        for (key, priority) in [("c", 70), ("b", 80), ("z", 80), ("a", 90)] {
            registry
                .register(props(key).priority(priority), Member::Method(method(&[])))
                .unwrap();
        }
        registry
            .register(props("secret").hidden(), Member::Method(method(&[])))
            .unwrap();
        registry
            .register(props("god").cheat(), Member::Method(method(&[])))
            .unwrap();

        let keys: Vec<&str> = registry.enumerate(false).iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["a", "b", "z", "c"]);

        let keys: Vec<&str> = registry.enumerate(true).iter().map(|c| c.key()).collect();
        assert_eq!(keys, vec!["a", "b", "z", "c", "god"]);
    }

    #[test]
    fn instance_usage_names_target() {
        let mut registry = CommandRegistry::new();
        let def = method(&[ParamType::Int])
            .named(["amount"])
            .with_declaring(TypeInfo::of::<Player>());
        registry.register(props("damage"), Member::Method(def)).unwrap();
        let command = registry.get("damage").unwrap();
        assert!(!command.is_static());
        assert_eq!(command.usage(), "damage <Player name> <int amount>");
    }
}
