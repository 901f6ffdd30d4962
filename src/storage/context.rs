use std::path::PathBuf;

use crate::dictionary::GroupedDictionary;
use crate::error::Result;
use crate::persist::DictionaryStore;

/// Context dictionary kept as one TOML file of `[category.key]` tables.
#[derive(Debug, Clone)]
pub struct TomlDictionaryStore {
    path: PathBuf,
}

impl TomlDictionaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DictionaryStore for TomlDictionaryStore {
    fn load(&mut self) -> Result<GroupedDictionary> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(GroupedDictionary::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, dict: &GroupedDictionary) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(dict)?)?;
        Ok(())
    }
}
