use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::state::StateSnapshot;
use crate::error::StateError;

/// Durable home for the agent's dedup ledger and reply log.
pub trait StateStore: Send {
    /// Missing storage yields an empty snapshot; unreadable storage is an error.
    fn load(&self) -> Result<StateSnapshot, StateError>;
    fn save(&self, snapshot: &StateSnapshot) -> Result<(), StateError>;
}

/// Pretty-printed JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

impl StateStore for JsonFileStateStore {
    fn load(&self) -> Result<StateSnapshot, StateError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StateSnapshot::default()),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.display(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(StateSnapshot::default());
        }

        serde_json::from_str(&raw).map_err(|source| StateError::Parse {
            path: self.display(),
            source,
        })
    }

    fn save(&self, snapshot: &StateSnapshot) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(snapshot)?;
        write_atomic(&self.path, &content).map_err(|source| StateError::Write {
            path: self.display(),
            source,
        })
    }
}

fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content)?;

    if let Err(rename_error) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(rename_error);
    }

    Ok(())
}
