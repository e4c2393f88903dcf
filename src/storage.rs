use crate::classification::ClassificationStore;
use crate::error::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// TOML file holding the classification store between cycles
pub struct Storage {
    file_path: PathBuf,
}

impl Storage {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Load the store; a missing file yields an empty store
    pub fn load(&self) -> Result<ClassificationStore, StoreError> {
        if !self.file_path.exists() {
            tracing::debug!("No state file at {}, starting fresh", self.file_path.display());
            return Ok(ClassificationStore::new());
        }

        let content = fs::read_to_string(&self.file_path).map_err(|source| StoreError::Io {
            path: self.file_path.clone(),
            source,
        })?;
        let store: ClassificationStore =
            toml::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.file_path.clone(),
                source,
            })?;
        Ok(store)
    }

    pub fn save(&self, store: &ClassificationStore) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(store)?;
        fs::write(&self.file_path, content).map_err(|source| StoreError::Io {
            path: self.file_path.clone(),
            source,
        })?;
        Ok(())
    }
}
