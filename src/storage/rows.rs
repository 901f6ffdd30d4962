use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::RowDomain;
use crate::error::Result;
use crate::persist::RowSink;
use crate::rows::FlatEntry;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RowsFile {
    #[serde(default)]
    rows: Vec<FlatEntry>,
}

fn rows_path(dir: &Path, domain: RowDomain) -> PathBuf {
    dir.join(format!("{}.toml", domain.file_stem()))
}

/// Save the rows of one domain as `<dir>/<domain>.toml`.
pub fn save_rows(dir: &Path, domain: RowDomain, rows: &[FlatEntry]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let file = RowsFile { rows: rows.to_vec() };
    std::fs::write(rows_path(dir, domain), toml::to_string_pretty(&file)?)?;
    Ok(())
}

/// Load the rows of one domain. Missing or unreadable files yield no rows.
pub fn load_rows(dir: &Path, domain: RowDomain) -> Vec<FlatEntry> {
    let Ok(content) = std::fs::read_to_string(rows_path(dir, domain)) else {
        return Vec::new();
    };
    match toml::from_str::<RowsFile>(&content) {
        Ok(file) => file.rows,
        Err(e) => {
            tracing::warn!(domain = domain.file_stem(), error = %e, "ignoring unreadable rows file");
            Vec::new()
        }
    }
}

/// Writes every save straight to the domain's file.
#[derive(Debug, Clone)]
pub struct FileRowSink {
    dir: PathBuf,
    domain: RowDomain,
}

impl FileRowSink {
    pub fn new(dir: impl Into<PathBuf>, domain: RowDomain) -> Self {
        Self { dir: dir.into(), domain }
    }
}

impl RowSink for FileRowSink {
    fn save(&mut self, rows: &[FlatEntry]) -> Result<()> {
        save_rows(&self.dir, self.domain, rows)
    }
}

/// Write the rows of one domain as pretty JSON to `<dir>/<domain>.json` and
/// return the path written.
pub fn export_json(dir: &Path, domain: RowDomain, rows: &[FlatEntry]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", domain.file_stem()));
    std::fs::write(&path, serde_json::to_string_pretty(rows)?)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "rows exported");
    Ok(path)
}
