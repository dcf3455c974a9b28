//! The console facade.
//!
//! [`Console`] owns the command registry, the alias table, the output log and
//! the input history, and drives the full pipeline for submitted text:
//!
//! ```text
//! input ──► statements ──► alias substitution ──► statements ──► resolve ──► execute
//!                                                                              │
//!                                                         output log ◄─────────┘
//! ```
//!
//! None of the public entry points return errors for bad input. Every failure
//! becomes one or more lines in the output log.

use std::fmt;

use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use devcon_parser::{split_statements, split_statements_raw};

use crate::alias::{AliasTable, Substitution};
use crate::autofill::{self, AutofillContext, AutofillSession, AutofillSuggestion};
use crate::builtins;
use crate::config::ConsoleConfig;
use crate::discovery::CommandSource;
use crate::error::{ExecutionError, RegistrationError};
use crate::history::InputHistory;
use crate::instance::{InstanceFinder, InstanceRegistry};
use crate::invocation::{Invocation, Outcome};
use crate::member::{CommandProperties, Member};
use crate::output::{LogLine, OutputLog, Severity};
use crate::persistence::{AliasStore, JsonAliasStore};
use crate::registry::{Command, CommandRegistry};
use crate::resolver::{self, ValidState};

use devcon_core::CommandError;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.8;

pub struct Console {
    config: ConsoleConfig,
    registry: CommandRegistry,
    aliases: AliasTable,
    alias_store: Option<Box<dyn AliasStore>>,
    instances: InstanceRegistry,
    finder: Box<dyn InstanceFinder>,
    output: OutputLog,
    history: InputHistory,
    autofill_session: AutofillSession,
    enabled: bool,
    cheats: bool,
}

impl Console {
    /// Create an empty console.
    ///
    /// When `alias_file` is configured, aliases are loaded from it and saved
    /// back after every change.
    pub fn new(config: ConsoleConfig) -> Self {
        let instances = InstanceRegistry::new(config.instance_cache_ttl());
        let mut console = Self {
            registry: CommandRegistry::new(),
            aliases: AliasTable::new(),
            alias_store: None,
            finder: Box::new(instances.clone()),
            instances,
            output: OutputLog::new(config.log_capacity),
            history: InputHistory::new(config.history_capacity),
            autofill_session: AutofillSession::new(),
            enabled: config.enabled,
            cheats: config.cheats_enabled,
            config,
        };
        if let Some(path) = console.config.alias_file.clone() {
            console = console.with_alias_store(Box::new(JsonAliasStore::new(path)));
        }
        console
    }

    /// Create a console with the built-in commands installed.
    pub fn with_builtins(config: ConsoleConfig) -> Self {
        let mut console = Self::new(config);
        console.install(&builtins::command_set());
        console
    }

    /// Replace the alias store and load the aliases it holds.
    ///
    /// An unreadable store yields an empty table and is rewritten.
    pub fn with_alias_store(mut self, store: Box<dyn AliasStore>) -> Self {
        self.aliases = match store.load() {
            Ok(entries) => {
                debug!(count = entries.len(), "loaded aliases");
                AliasTable::from_entries(entries)
            }
            Err(err) => {
                warn!(%err, "alias store unreadable, resetting");
                let empty = AliasTable::new();
                if let Err(err) = store.save(empty.entries()) {
                    warn!(%err, "failed to rewrite alias store");
                }
                empty
            }
        };
        self.alias_store = Some(store);
        self
    }

    /// Replace the instance finder used for instance commands.
    ///
    /// The built-in [`InstanceRegistry`] stays reachable through
    /// [`instances`](Self::instances) but is no longer consulted.
    pub fn set_instance_finder(&mut self, finder: Box<dyn InstanceFinder>) {
        self.finder = finder;
    }

    /// Named host objects for instance commands.
    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn cheats_enabled(&self) -> bool {
        self.cheats
    }

    pub fn set_cheats(&mut self, enabled: bool) {
        if self.cheats != enabled {
            info!(enabled, "cheats toggled");
        }
        self.cheats = enabled;
    }

    // ==========================================================================
    // Commands
    // ==========================================================================

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn register(
        &mut self,
        props: CommandProperties,
        member: Member,
    ) -> Result<(), RegistrationError> {
        self.registry.register(props, member)
    }

    /// Register every member of a command source that passes the discovery
    /// filter. Rejected members are logged and skipped.
    ///
    /// Returns the number of members registered.
    pub fn install(&mut self, source: &dyn CommandSource) -> usize {
        let module = source.module();
        if !self.config.discovery.allows(module) {
            debug!(module, "command source filtered out");
            return 0;
        }

        let mut installed = 0;
        for (props, member) in source.members() {
            match self.registry.register(props, member) {
                Ok(()) => installed += 1,
                Err(err) => self.log(format!("Skipped command from {module}: {err}"), Severity::Warning),
            }
        }
        debug!(module, installed, "installed command source");
        installed
    }

    /// Resolve one statement without executing it.
    pub fn resolve(&mut self, statement: &str) -> Invocation {
        resolver::resolve(statement, &self.registry, self.finder.as_mut())
    }

    // ==========================================================================
    // Input
    // ==========================================================================

    /// Run a line of user input.
    ///
    /// The input is recorded in the history, split into statements, alias
    /// substituted and executed statement by statement. Failures are logged.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run_input(&mut self, input: &str) {
        if input.trim().is_empty() {
            self.log(format!("Error: {}", ValidState::ErrorEmpty), Severity::Error);
            return;
        }

        self.history.push(input);
        if self.config.echo_input {
            self.log(format!("> {input}"), Severity::Input);
        }
        self.autofill_session.reset();

        for raw in split_statements_raw(input) {
            if raw.text.is_empty() {
                continue;
            }
            let expanded = match self.aliases.substitute(raw.text, &self.registry) {
                Substitution::NoChange => raw.text.to_string(),
                Substitution::AliasApplied(text) => text,
                Substitution::CommandConflict { alias, definition } => {
                    warn!(%alias, %definition, "alias shadowed by command");
                    self.log(
                        format!("Alias '{alias}' is shadowed by a command of the same name; running the command"),
                        Severity::Warning,
                    );
                    raw.text.to_string()
                }
            };
            for statement in split_statements(&expanded) {
                self.run_statement(&statement).ok();
            }
        }
    }

    /// Resolve and execute a single statement, logging the result.
    ///
    /// No alias substitution or statement splitting is done.
    pub fn run_statement(&mut self, statement: &str) -> Result<Outcome, ExecutionError> {
        let invocation = self.resolve(statement);
        let key = invocation.key().to_string();
        let usage = invocation.command().map(|c| c.usage().to_string());

        let result = invocation.execute(self);
        match &result {
            Ok(outcome) => self.report_outcome(&key, outcome),
            Err(err) => self.report_error(&key, err, usage.as_deref()),
        }
        result
    }

    fn report_outcome(&mut self, key: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Returned(value) if value.is_void() => {}
            Outcome::Returned(value) => self.log(value.to_string(), Severity::Info),
            Outcome::Read(value) => self.log(format!("{key} = {value}"), Severity::Info),
            Outcome::Written(value) => self.log(format!("{key} set to {value}"), Severity::Info),
            Outcome::WriteIgnored => {
                self.log(format!("'{key}' is read-only"), Severity::Warning);
            }
        }
    }

    fn report_error(&mut self, key: &str, err: &ExecutionError, usage: Option<&str>) {
        let show_usage = match err {
            ExecutionError::InvocationWasInvalid(ValidState::ErrorNoCommandFound) => {
                let mut message = format!("Error: no command found for '{key}'");
                if let Some(candidate) = self.closest_key(key) {
                    message.push_str(&format!(". Did you mean '{candidate}'?"));
                }
                self.log(message, Severity::Error);
                false
            }
            ExecutionError::InvocationWasInvalid(ValidState::ErrorEmpty) => {
                self.log(format!("Error: {}", ValidState::ErrorEmpty), Severity::Error);
                false
            }
            ExecutionError::InvocationWasInvalid(state) => {
                self.log(format!("Error: '{key}': {state}"), Severity::Error);
                true
            }
            ExecutionError::Exception(inner) => {
                self.log(format!("Error: '{key}' failed: {inner}"), Severity::Error);
                matches!(inner, CommandError::Conversion(_))
            }
            other => {
                self.log(format!("Error: {other}"), Severity::Error);
                false
            }
        };

        if show_usage && let Some(usage) = usage {
            for line in usage.lines() {
                self.log(line, Severity::Info);
            }
        }
    }

    /// Visible command or alias key closest to `key`, if any is close enough.
    fn closest_key(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        self.registry
            .enumerate(self.cheats)
            .into_iter()
            .map(Command::key)
            .chain(self.aliases.keys())
            .map(|candidate| (candidate, strsim::jaro_winkler(key, candidate)))
            .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate.to_string())
    }

    // ==========================================================================
    // Output and history
    // ==========================================================================

    /// Append a line to the output log.
    pub fn log(&mut self, message: impl Into<String>, severity: Severity) {
        self.output.log(message, severity);
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Call `listener` for every line appended from now on.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&LogLine) + 'static,
    {
        self.output.subscribe(listener);
    }

    /// Recent input, newest first.
    pub fn history(&self) -> &InputHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ==========================================================================
    // Aliases
    // ==========================================================================

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Set an alias and persist the table. Returns `true` for a new key.
    pub fn set_alias(
        &mut self,
        key: &str,
        definition: impl Into<String>,
    ) -> Result<bool, RegistrationError> {
        let added = self.aliases.set(key, definition)?;
        self.persist_aliases();
        Ok(added)
    }

    /// Remove an alias and persist the table. Returns `true` if it existed.
    pub fn remove_alias(&mut self, key: &str) -> bool {
        let removed = self.aliases.remove(key);
        if removed {
            self.persist_aliases();
        }
        removed
    }

    pub fn reset_aliases(&mut self) {
        self.aliases.reset();
        self.persist_aliases();
    }

    fn persist_aliases(&mut self) {
        let Some(store) = &self.alias_store else {
            return;
        };
        if let Err(err) = store.save(self.aliases.entries()) {
            warn!(%err, "failed to save aliases");
            self.output
                .log(format!("Failed to save aliases: {err}"), Severity::Warning);
        }
    }

    // ==========================================================================
    // Autofill
    // ==========================================================================

    /// Next completion for `buffer`, skipping everything in `exclusions`.
    pub fn autofill(
        &mut self,
        buffer: &str,
        exclusions: &FxHashSet<String>,
    ) -> Option<AutofillSuggestion> {
        autofill::suggest(
            buffer,
            exclusions,
            AutofillContext {
                registry: &self.registry,
                aliases: &self.aliases,
                finder: self.finder.as_mut(),
                include_cheats: self.cheats,
                default_value: &self.config.default_autofill,
            },
        )
    }

    /// Complete `buffer`, cycling through candidates on repeated calls.
    ///
    /// Passing back the previously returned buffer offers the next candidate
    /// for the original input. Any other buffer starts a new cycle.
    pub fn autofill_next(&mut self, buffer: &str) -> Option<String> {
        let registry = &self.registry;
        let aliases = &self.aliases;
        let finder = self.finder.as_mut();
        let include_cheats = self.cheats;
        let default_value = self.config.default_autofill.as_str();

        self.autofill_session.next(buffer, |text, exclusions| {
            autofill::suggest(
                text,
                exclusions,
                AutofillContext {
                    registry,
                    aliases,
                    finder: &mut *finder,
                    include_cheats,
                    default_value,
                },
            )
        })
    }

    /// Forget the current autofill cycle.
    pub fn reset_autofill(&mut self) {
        self.autofill_session.reset();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("commands", &self.registry.len())
            .field("aliases", &self.aliases.len())
            .field("enabled", &self.enabled)
            .field("cheats", &self.cheats)
            .finish_non_exhaustive()
    }
}
