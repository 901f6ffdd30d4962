use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const LOG_ENV: &str = "MOCKDECK_LOG";

/// Settings read from `<config_dir>/mockdeck/config.toml`. Every field has a
/// default, so a missing file or a partial one is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where rows, context dictionaries, flags and logs are stored.
    pub data_dir: PathBuf,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
    /// Categories offered for context variables; the first is the default.
    pub context_categories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            data_dir: base.join("mockdeck"),
            log_filter: String::from("info"),
            context_categories: vec![String::from("global"), String::from("local")],
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("mockdeck").join("config.toml")
    }

    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path())?;
        if let Ok(filter) = std::env::var(LOG_ENV) {
            config.log_filter = filter;
        }
        Ok(config)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn rows_dir(&self) -> PathBuf {
        self.data_dir.join("rows")
    }

    pub fn context_path(&self) -> PathBuf {
        self.data_dir.join("context.toml")
    }

    pub fn flags_path(&self) -> PathBuf {
        self.data_dir.join("flags.toml")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("export")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("mockdeck.log")
    }
}
