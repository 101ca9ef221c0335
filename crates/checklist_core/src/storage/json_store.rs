use crate::error::AppError;
use crate::storage::backend::Backend;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SCHEMA_VERSION: u32 = 1;
pub const STORE_ENV_VAR: &str = "CHECKLIST_STORE_PATH";
const STORE_FILE_NAME: &str = "storage.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredEntries {
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Key/value backend persisted as a single JSON document.
///
/// The document is read once on open; every write rewrites the whole file.
/// A document that cannot be parsed opens as an empty map and is replaced on
/// the next write.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    open_error: Option<AppError>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("checklist").join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("checklist")
            .join(STORE_FILE_NAME))
    }
}

impl JsonFileBackend {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let (entries, open_error) = if path.exists() {
            match read_entries(path) {
                Ok(entries) => (entries, None),
                Err(err @ AppError::InvalidData(_)) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "store file unreadable, starting empty"
                    );
                    (BTreeMap::new(), Some(err))
                }
                Err(err) => return Err(err),
            }
        } else {
            (BTreeMap::new(), None)
        };
        debug!(path = %path.display(), keys = entries.len(), "opened json store");

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            open_error,
        })
    }

    fn flush(&mut self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let stored = StoredEntries {
            schema_version: SCHEMA_VERSION,
            entries: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        self.open_error = None;
        debug!(path = %self.path.display(), "flushed json store");
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let stored: StoredEntries = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored.entries)
}

impl Backend for JsonFileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), AppError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn open_error(&self) -> Option<&AppError> {
        self.open_error.as_ref()
    }

    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), AppError> {
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), value.clone());
        }
        self.flush()
    }
}
