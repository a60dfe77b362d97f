//! Persisted client state.
//!
//! Three independently namespaced slots, one JSON file each:
//! - `auth-storage.json`: signed-in user
//! - `achievement-storage.json`: earned achievements, notifications, points total
//! - `learning-storage.json`: learned words, daily goal, streak
//!
//! Every file wraps its state in a `{ "version": N, "state": ... }` envelope.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::auth::AuthSnapshot;
use crate::services::progress::LearningSnapshot;
use crate::session::AchievementSnapshot;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported {slot} schema version {found} (expected {expected})", expected = SCHEMA_VERSION)]
    UnsupportedVersion { slot: &'static str, found: u32 },
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Auth,
    Achievement,
    Learning,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Auth, Slot::Achievement, Slot::Learning];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Auth => "auth-storage",
            Self::Achievement => "achievement-storage",
            Self::Learning => "learning-storage",
        }
    }

    fn file_name(&self) -> String {
        format!("{}.json", self.key())
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    state: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    state: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct SlotStore {
    root: PathBuf,
}

impl SlotStore {
    /// Creates the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, slot: Slot) -> PathBuf {
        self.root.join(slot.file_name())
    }

    /// `Ok(None)` when the slot has never been written.
    pub fn load<T: DeserializeOwned>(&self, slot: Slot) -> StorageResult<Option<T>> {
        let path = self.path_for(slot);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let envelope: Envelope = serde_json::from_slice(&bytes)?;
        if envelope.version != SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion {
                slot: slot.key(),
                found: envelope.version,
            });
        }
        Ok(Some(serde_json::from_value(envelope.state)?))
    }

    /// Writes through a temporary file and renames it over the slot.
    pub fn save<T: Serialize>(&self, slot: Slot, state: &T) -> StorageResult<()> {
        let payload = serde_json::to_vec_pretty(&EnvelopeRef {
            version: SCHEMA_VERSION,
            state,
        })?;

        let path = self.path_for(slot);
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        debug!(slot = slot.key(), bytes = payload.len(), "slot saved");
        Ok(())
    }

    pub fn clear(&self, slot: Slot) -> StorageResult<()> {
        match fs::remove_file(self.path_for(slot)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn load_auth(&self) -> StorageResult<Option<AuthSnapshot>> {
        self.load(Slot::Auth)
    }

    pub fn save_auth(&self, snapshot: &AuthSnapshot) -> StorageResult<()> {
        self.save(Slot::Auth, snapshot)
    }

    pub fn load_achievements(&self) -> StorageResult<Option<AchievementSnapshot>> {
        self.load(Slot::Achievement)
    }

    pub fn save_achievements(&self, snapshot: &AchievementSnapshot) -> StorageResult<()> {
        self.save(Slot::Achievement, snapshot)
    }

    pub fn load_learning(&self) -> StorageResult<Option<LearningSnapshot>> {
        self.load(Slot::Learning)
    }

    pub fn save_learning(&self, snapshot: &LearningSnapshot) -> StorageResult<()> {
        self.save(Slot::Learning, snapshot)
    }
}
