//! Alias table and alias substitution.
//!
//! An alias maps a cleansed key to raw replacement text. When a statement
//! starts with an alias key, the key is replaced by the alias definition and
//! the rest of the statement is appended unchanged. The definition may hold
//! further statements, so callers split the substituted text again.
//!
//! Substitution is a single pass: an alias whose definition starts with
//! another alias key is not expanded again.

use std::collections::BTreeMap;

use tracing::debug;

use devcon_core::cleanse_key;
use devcon_parser::split_leading_word;

use crate::error::RegistrationError;
use crate::registry::CommandRegistry;

/// Result of attempting alias substitution on one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// No alias matched the leading word.
    NoChange,
    /// The alias was applied; holds the substituted text.
    AliasApplied(String),
    /// The leading word names both an alias and a command. The command wins.
    CommandConflict { alias: String, definition: String },
}

/// Alias key to definition map, iterated in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from stored entries, cleansing every key.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let aliases = entries
            .into_iter()
            .map(|(key, value)| (cleanse_key(&key), value))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { aliases }
    }

    /// Set an alias. Returns `true` if the key was not already present.
    pub fn set(
        &mut self,
        key: &str,
        definition: impl Into<String>,
    ) -> Result<bool, RegistrationError> {
        let cleansed = cleanse_key(key);
        if cleansed.is_empty() {
            return Err(RegistrationError::EmptyKey {
                raw: key.to_string(),
            });
        }
        Ok(self.aliases.insert(cleansed, definition.into()).is_none())
    }

    /// Remove an alias. Returns `true` if it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.aliases.remove(&cleanse_key(key)).is_some()
    }

    /// Remove every alias.
    pub fn reset(&mut self) {
        self.aliases.clear();
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.aliases.get(&cleanse_key(key)).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Aliases in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// The underlying map, as persisted by an alias store.
    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Try to substitute the alias named by the statement's leading word.
    ///
    /// `statement` is raw text: escapes are preserved in the remainder so the
    /// substituted text can be split into statements again.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn substitute(&self, statement: &str, registry: &CommandRegistry) -> Substitution {
        let Some((word, remainder)) = split_leading_word(statement) else {
            return Substitution::NoChange;
        };
        let key = cleanse_key(&word.text);
        let Some(definition) = self.aliases.get(&key) else {
            return Substitution::NoChange;
        };

        if registry.contains(&key) {
            return Substitution::CommandConflict {
                alias: key,
                definition: definition.clone(),
            };
        }

        debug!(alias = %key, "applied alias");
        Substitution::AliasApplied(format!("{definition}{remainder}"))
    }
}
