//! Small persisted UI flags (e.g. whether the preview pane is shown).

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::error::Result;

pub const SHOW_PREVIEW: &str = "show_preview";

/// Key/value capability injected wherever a UI flag is read or written.
pub trait FlagStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFlags(HashMap<String, String>);

impl FlagStore for MemoryFlags {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Flags kept in a TOML file; every `set` rewrites the file.
#[derive(Debug, Clone)]
pub struct FileFlags {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileFlags {
    /// Open the file at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default();
        Self { path, values }
    }
}

impl FlagStore for FileFlags {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

pub fn show_preview(store: &dyn FlagStore) -> bool {
    store.get(SHOW_PREVIEW).is_some_and(|v| v == "true")
}

pub fn set_show_preview(store: &mut dyn FlagStore, show: bool) -> Result<()> {
    store.set(SHOW_PREVIEW, if show { "true" } else { "false" })
}
