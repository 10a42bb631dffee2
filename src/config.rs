//! Configuration types for the engine
//!
//! These types define the structure of engine configurations loaded from TOML files.
//! Every key is optional; missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::requirements::ColorScheme;
use crate::steps::DEFAULT_MAX_RESOLVE_DEPTH;
use crate::Result;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long cached quest states and requirement colors stay fresh
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    /// How long a caller waits for the client thread before using its default
    #[serde(default = "default_bridge_timeout_ms")]
    pub bridge_timeout_ms: u64,
    /// Maximum nesting of conditional steps
    #[serde(default = "default_max_resolve_depth")]
    pub max_resolve_depth: usize,
    /// Surface authoring errors instead of degrading to a fallback step
    #[serde(default)]
    pub strict_authoring: bool,
    /// Keep finished quests in filtered quest lists
    #[serde(default)]
    pub show_completed_quests: bool,
    #[serde(default)]
    pub colors: ColorScheme,
}

fn default_cache_ttl_ms() -> u64 {
    1000
}

fn default_bridge_timeout_ms() -> u64 {
    300
}

fn default_max_resolve_depth() -> usize {
    DEFAULT_MAX_RESOLVE_DEPTH
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: default_cache_ttl_ms(),
            bridge_timeout_ms: default_bridge_timeout_ms(),
            max_resolve_depth: default_max_resolve_depth(),
            strict_authoring: false,
            show_completed_quests: false,
            colors: ColorScheme::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge_timeout_ms)
    }
}
