//! Session state of the client: the persisted credential and the guard that
//! keeps protected views unreachable without one.
//!
//! The credential lives in an explicit `Session` value owned by the sync
//! controller, never in ambient global state.

pub mod guard;
pub mod store;

use std::fmt;

use log::{debug, warn};

use crate::error::ClientError;

// Re-export necessary items
pub use guard::{SessionGuard, View};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

/// Opaque bearer token issued by `POST /login`.
///
/// No structure is assumed. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// The session context: at most one credential, backed by a `CredentialStore`.
///
/// Presence of a credential means the client believes itself authenticated;
/// the service may still disagree.
pub struct Session {
    store: Box<dyn CredentialStore>,
}

impl Session {
    pub fn new(store: impl CredentialStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryCredentialStore::default())
    }

    /// Stores `credential`, replacing any previous one.
    pub fn set(&self, credential: &Credential) -> Result<(), ClientError> {
        self.store.set(credential)?;
        debug!("Session credential stored");
        Ok(())
    }

    pub fn get(&self) -> Result<Option<Credential>, ClientError> {
        self.store.get()
    }

    /// Removes the credential. Idempotent.
    pub fn clear(&self) -> Result<(), ClientError> {
        self.store.clear()?;
        debug!("Session credential cleared");
        Ok(())
    }

    /// Unreadable storage counts as "not authenticated".
    pub fn is_authenticated(&self) -> bool {
        match self.store.get() {
            Ok(credential) => credential.is_some(),
            Err(e) => {
                warn!("Could not read session credential: {}", e);
                false
            }
        }
    }
}
