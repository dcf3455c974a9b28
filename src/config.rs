//! Console configuration, loaded from TOML.
//!
//! ```toml
//! enabled = true
//! cheats_enabled = false
//! history_capacity = 100
//! alias_file = "aliases.json"
//!
//! [discovery]
//! include = ["game"]
//! exclude = ["game::internal"]
//! ```
//!
//! Every field is optional and unknown keys are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Whether the console accepts execution at all.
    pub enabled: bool,
    /// Initial cheat state.
    pub cheats_enabled: bool,
    /// Turn cheats on at the first cheat attempt instead of refusing it.
    /// Intended for debug builds.
    pub auto_enable_cheats: bool,
    pub history_capacity: usize,
    pub log_capacity: usize,
    /// Suggestion offered for an empty input buffer.
    pub default_autofill: String,
    /// Where aliases are persisted. No persistence when unset.
    pub alias_file: Option<PathBuf>,
    pub instance_cache_ttl_ms: u64,
    /// Echo submitted input to the output log.
    pub echo_input: bool,
    pub discovery: DiscoveryConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cheats_enabled: false,
            auto_enable_cheats: false,
            history_capacity: 50,
            log_capacity: 1000,
            default_autofill: "help".to_string(),
            alias_file: None,
            instance_cache_ttl_ms: 1000,
            echo_input: true,
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// Module-name prefix filters applied when installing command sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// When non-empty, only modules starting with one of these prefixes load.
    pub include: Vec<String>,
    /// Modules starting with one of these prefixes never load.
    pub exclude: Vec<String>,
}

impl DiscoveryConfig {
    /// Whether a command source from `module` should be installed.
    pub fn allows(&self, module: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|p| module.starts_with(p.as_str()));
        included && !self.exclude.iter().any(|p| module.starts_with(p.as_str()))
    }
}

impl ConsoleConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(error = %err, "using default console configuration");
            Self::default()
        })
    }

    pub fn instance_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.instance_cache_ttl_ms)
    }
}
