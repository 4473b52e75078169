//! Opaque persistent storage for credential material.
//!
//! The session manager only ever sees the [`TokenStore`] trait; the default
//! implementation sits on the platform keychain via the `keyring` crate, and
//! tests use the in-memory double.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("secret storage failure: {0}")]
    Backend(String),
}

/// Opaque get/set/delete of named secrets. Every operation may fail.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, name: &str, value: &str) -> Result<(), StoreError>;
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
}

/// Platform keychain storage (macOS Keychain, Windows Credential Manager,
/// Linux Secret Service).
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, name: &str) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service, name).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

#[async_trait]
impl TokenStore for KeyringTokenStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        let entry = self.entry(name)?;
        // keyring is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let entry = self.entry(name)?;
        let value = value.to_string();
        tokio::task::spawn_blocking(move || {
            entry
                .set_password(&value)
                .map_err(|e| StoreError::Backend(e.to_string()))
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let entry = self.entry(name)?;
        tokio::task::spawn_blocking(move || match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Backend(e.to_string())),
        })
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?
    }
}

/// In-memory token store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    secrets: Arc<RwLock<HashMap<String, String>>>,
    /// When set, every operation fails; used to exercise store-failure paths.
    fail: bool,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            secrets: Arc::default(),
            fail: true,
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Backend("simulated store failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.secrets.read().await.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.secrets
            .write()
            .await
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.check()?;
        self.secrets.write().await.remove(name);
        Ok(())
    }
}
