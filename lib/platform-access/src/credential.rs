//! The key-value slot the credential lives in.
//!
//! One slot key holds one credential. The file-backed slot keeps a JSON
//! object of key to token so several profiles can share the file.

use crate::error::CredentialError;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::warn;

/// Slot key used when none is configured.
pub const DEFAULT_TOKEN_KEY: &str = "client-balance-jwt";

/// Persistent storage for a single credential.
pub trait CredentialSlot: Send + Sync {
    /// The key this slot stores under.
    fn key(&self) -> &str;

    /// Returns the stored credential, if any.
    fn load(&self) -> Result<Option<String>, CredentialError>;

    /// Replaces the stored credential.
    fn store(&self, token: &str) -> Result<(), CredentialError>;

    /// Removes the stored credential. Clearing an empty slot succeeds.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// In-process slot. Nothing survives the process.
#[derive(Debug)]
pub struct MemoryCredentialSlot {
    key: String,
    token: RwLock<Option<String>>,
}

impl MemoryCredentialSlot {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: RwLock::new(None),
        }
    }
}

impl Default for MemoryCredentialSlot {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_KEY)
    }
}

impl CredentialSlot for MemoryCredentialSlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.token.read().clone())
    }

    fn store(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.write() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.token.write() = None;
        Ok(())
    }
}

/// Slot backed by a JSON file on disk.
#[derive(Debug)]
pub struct FileCredentialSlot {
    key: String,
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data dir>/client-balance/credentials.json`.
    pub fn default_path() -> Result<PathBuf, CredentialError> {
        dirs::data_dir()
            .map(|dir| dir.join("client-balance").join("credentials.json"))
            .ok_or(CredentialError::NoLocation)
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_string(&self) -> String {
        self.path.display().to_string()
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(CredentialError::Io {
                    path: self.path_string(),
                    reason: e.to_string(),
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| CredentialError::Corrupt {
            path: self.path_string(),
            reason: e.to_string(),
        })
    }

    /// Like `read_map`, but a corrupt file counts as empty so the next
    /// write replaces it.
    fn read_map_or_reset(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        match self.read_map() {
            Err(CredentialError::Corrupt { path, reason }) => {
                warn!(%path, %reason, "discarding corrupt credential file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// Replaces the file in one rename. The temporary file is created
    /// owner-only, so the token is never readable by others.
    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let io_err = |e: std::io::Error| CredentialError::Io {
            path: self.path_string(),
            reason: e.to_string(),
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(io_err)?;

        let contents = serde_json::to_string_pretty(map).map_err(|e| CredentialError::Corrupt {
            path: self.path_string(),
            reason: e.to_string(),
        })?;

        let mut file = NamedTempFile::new_in(parent).map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
        file.write_all(contents.as_bytes()).map_err(io_err)?;
        file.as_file().sync_all().map_err(io_err)?;
        file.persist(&self.path).map_err(|e| io_err(e.error))?;

        Ok(())
    }

    fn remove_file(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(CredentialError::Io {
                path: self.path_string(),
                reason: e.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl CredentialSlot for FileCredentialSlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Result<Option<String>, CredentialError> {
        let _guard = self.lock.lock();
        Ok(self.read_map()?.remove(&self.key))
    }

    fn store(&self, token: &str) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut map = self.read_map_or_reset()?;
        map.insert(self.key.clone(), token.to_string());
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let _guard = self.lock.lock();
        let mut map = match self.read_map() {
            Err(CredentialError::Corrupt { path, reason }) => {
                warn!(%path, %reason, "removing corrupt credential file");
                return self.remove_file();
            }
            other => other?,
        };
        if map.remove(&self.key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}
