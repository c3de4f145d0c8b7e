use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::Credential;
use crate::error::ClientError;

/// Persistent storage of the single session credential.
pub trait CredentialStore: Send + Sync {
    /// Stores the credential, replacing any existing value.
    fn set(&self, credential: &Credential) -> Result<(), ClientError>;

    /// Returns the stored credential, or `None` when there is none.
    fn get(&self) -> Result<Option<Credential>, ClientError>;

    /// Removes the credential. Succeeds when nothing is stored.
    fn clear(&self) -> Result<(), ClientError>;
}

/// Keeps the credential for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    fn with_slot<T>(&self, f: impl FnOnce(&mut Option<Credential>) -> T) -> Result<T, ClientError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ClientError::Storage("credential store lock poisoned".into()))?;
        Ok(f(&mut slot))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn set(&self, credential: &Credential) -> Result<(), ClientError> {
        self.with_slot(|slot| *slot = Some(credential.clone()))
    }

    fn get(&self) -> Result<Option<Credential>, ClientError> {
        self.with_slot(|slot| slot.clone())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.with_slot(|slot| *slot = None)
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

/// Keeps the credential in a small JSON file so it survives restarts,
/// the way browser local storage survives page reloads.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn set(&self, credential: &Credential) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let stored = StoredSession {
            token: credential.as_str().to_string(),
        };
        let contents = serde_json::to_vec(&stored)?;

        // Owner-only, the file holds a bearer token
        #[cfg(unix)]
        {
            use std::fs::{OpenOptions, Permissions};
            use std::io::Write;
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)?;
            // `mode` only applies on creation; tighten files left by older writes.
            file.set_permissions(Permissions::from_mode(0o600))?;
            file.write_all(&contents)?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)?;
        }

        Ok(())
    }

    fn get(&self) -> Result<Option<Credential>, ClientError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredSession = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Storage(format!("Corrupt session file: {}", e)))?;
        Ok(Some(Credential::new(stored.token)))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
