//! `tick.toml` configuration.
//!
//! ```toml
//! [handlers]
//! names = ["weather_lookup"]
//!
//! [stories]
//! known = ["fallback"]
//!
//! [log]
//! level = "info"
//! ```
//!
//! Every section is optional. Without `[stories]`, target stories are not
//! checked.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "tick.toml";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TickConfig {
    #[serde(default)]
    pub handlers: HandlersConfig,
    pub stories: Option<StoriesConfig>,
    #[serde(default)]
    pub log: LogConfig,
}

/// `[handlers]`: action handlers the host application registers.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct HandlersConfig {
    #[serde(default)]
    pub names: BTreeSet<String>,
}

/// `[stories]`: stories actions may hand a conversation over to.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StoriesConfig {
    #[serde(default)]
    pub known: BTreeSet<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a config file from `path`.
pub(crate) fn read_tick_config(path: &Path) -> Result<TickConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

/// Config from `--config` if given, else `tick.toml` in the working
/// directory if present, else defaults.
pub(crate) fn resolve_config(explicit: Option<&Path>) -> Result<TickConfig, String> {
    if let Some(path) = explicit {
        return read_tick_config(path);
    }
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        read_tick_config(default_path)
    } else {
        Ok(TickConfig::default())
    }
}
