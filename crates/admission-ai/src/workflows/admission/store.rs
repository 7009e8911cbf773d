use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use super::domain::AdmissionDataset;
use crate::config::StorageConfig;

/// Durable home of the admission dataset.
pub trait DatasetStore: Send + Sync {
    /// Load the dataset, initializing and writing defaults when nothing usable exists.
    fn load(&self) -> Result<AdmissionDataset, StoreError>;
    fn save(&self, dataset: &AdmissionDataset) -> Result<(), StoreError>;
}

/// Storage failure. Only writes surface; unreadable data is reinitialized.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not encode dataset: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("dataset store unavailable: {0}")]
    Unavailable(String),
}

/// Pretty-printed JSON primary file mirrored to a backup after every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    primary: PathBuf,
    backup: PathBuf,
}

impl JsonFileStore {
    pub fn new(primary: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            backup: backup.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.data_file.clone(), config.backup_file.clone())
    }

    pub fn primary_path(&self) -> &Path {
        &self.primary
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Where an unparseable primary file is moved before defaults replace it.
    pub fn corrupt_path(&self) -> PathBuf {
        let mut name = OsString::from(self.primary.as_os_str());
        name.push(".corrupt");
        PathBuf::from(name)
    }

    fn quarantine(&self) {
        let target = self.corrupt_path();
        match fs::rename(&self.primary, &target) {
            Ok(()) => warn!(path = %target.display(), "moved unreadable dataset aside"),
            Err(err) => warn!(error = %err, "could not move unreadable dataset aside"),
        }
    }
}

impl DatasetStore for JsonFileStore {
    fn load(&self) -> Result<AdmissionDataset, StoreError> {
        match fs::read(&self.primary) {
            Ok(bytes) => match serde_json::from_slice::<AdmissionDataset>(&bytes) {
                Ok(dataset) => return Ok(dataset),
                Err(err) => {
                    error!(path = %self.primary.display(), error = %err, "dataset file is corrupt; reinitializing");
                    self.quarantine();
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.primary.display(), "no dataset found; initializing defaults");
            }
            Err(err) => {
                warn!(path = %self.primary.display(), error = %err, "dataset unreadable; initializing defaults");
            }
        }

        let dataset = AdmissionDataset::default();
        write_atomic(&self.primary, &encode(&dataset)?)?;
        Ok(dataset)
    }

    /// Both files are attempted; the first failure is returned.
    fn save(&self, dataset: &AdmissionDataset) -> Result<(), StoreError> {
        let bytes = encode(dataset)?;
        let primary = write_atomic(&self.primary, &bytes);
        let backup = write_atomic(&self.backup, &bytes);
        if let Err(err) = &backup {
            warn!(error = %err, "backup dataset copy not written");
        }
        primary.and(backup)
    }
}

fn encode(dataset: &AdmissionDataset) -> Result<Vec<u8>, StoreError> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    dataset.serialize(&mut serializer)?;
    Ok(bytes)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let write = || -> io::Result<()> {
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.persist(path).map_err(|err| err.error)?;
        Ok(())
    };

    write().map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })
}
