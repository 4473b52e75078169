//! Token-based authentication session management.
//!
//! The session manager owns the access/refresh token pair exclusively;
//! adapters borrow a read-only credential snapshot per request and must never
//! mutate or cache tokens themselves.

pub mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, REQUEST_TIMEOUT};
use crate::error::DataError;

pub use store::{KeyringTokenStore, MemoryTokenStore, StoreError, TokenStore};

/// The access/refresh token pair. Both are opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Owns the in-memory token pair and the refresh protocol.
///
/// Hydration from the token store happens via [`SessionManager::initialize`],
/// called fire-and-forget at startup; a request arriving before hydration
/// completes is treated as unauthenticated.
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    tokens: RwLock<Option<TokenPair>>,
    /// Serializes refresh attempts so concurrent 401s coalesce into one
    /// refresh call (single-flight).
    refresh_lock: Mutex<()>,
    http: reqwest::Client,
    refresh_url: String,
}

impl SessionManager {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, auth_base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            store,
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            http,
            refresh_url: format!("{}/auth/refresh", auth_base_url.trim_end_matches('/')),
        }
    }

    /// Hydrate the in-memory pair from the token store.
    ///
    /// Returns whether a stored session was found. Store failures are treated
    /// as "no session" rather than errors.
    pub async fn initialize(&self) -> bool {
        let access = self.store.get(ACCESS_TOKEN_KEY).await;
        let refresh = self.store.get(REFRESH_TOKEN_KEY).await;
        match (access, refresh) {
            (Ok(Some(access_token)), Ok(Some(refresh_token)))
                if !access_token.is_empty() && !refresh_token.is_empty() =>
            {
                *self.tokens.write().await = Some(TokenPair {
                    access_token,
                    refresh_token,
                });
                info!("Session restored from token store");
                true
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Token store read failed during hydration: {e}");
                false
            }
            _ => {
                debug!("No stored session found");
                false
            }
        }
    }

    /// True iff both tokens are present and non-empty.
    pub async fn is_authenticated(&self) -> bool {
        self.tokens
            .read()
            .await
            .as_ref()
            .is_some_and(|t| !t.access_token.is_empty() && !t.refresh_token.is_empty())
    }

    /// Read-only snapshot of the current access token.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
            .filter(|t| !t.is_empty())
    }

    /// Install a new token pair after a successful login/authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if the token store write fails; the in-memory pair is
    /// still installed so the session works until process exit.
    pub async fn login(&self, pair: TokenPair) -> Result<(), StoreError> {
        *self.tokens.write().await = Some(pair.clone());
        self.persist(&pair).await
    }

    /// Destroy the session, clearing memory and store.
    pub async fn logout(&self) {
        *self.tokens.write().await = None;
        if let Err(e) = self.store.delete(ACCESS_TOKEN_KEY).await {
            warn!("Failed to delete access token from store: {e}");
        }
        if let Err(e) = self.store.delete(REFRESH_TOKEN_KEY).await {
            warn!("Failed to delete refresh token from store: {e}");
        }
        info!("Session cleared");
    }

    /// Exchange the refresh token for a new pair after a request saw a 401.
    ///
    /// `stale_access` is the access token the failed request carried. If the
    /// in-memory token has already moved past it, another caller's refresh
    /// won the race and its result is returned without a network call.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Unauthorized`] when no refresh token is held or
    /// the refresh call fails; tokens are cleared in that case and the caller
    /// must re-authenticate.
    pub async fn refresh_after_unauthorized(
        &self,
        stale_access: &str,
    ) -> Result<String, DataError> {
        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited on the lock.
        if let Some(current) = self.access_token().await {
            if current != stale_access {
                debug!("Coalesced into a refresh completed by another request");
                return Ok(current);
            }
        }

        let refresh_token = {
            let tokens = self.tokens.read().await;
            match tokens.as_ref() {
                Some(t) if !t.refresh_token.is_empty() => t.refresh_token.clone(),
                _ => {
                    return Err(DataError::Unauthorized(
                        "no refresh token available".to_string(),
                    ))
                }
            }
        };

        match self.execute_refresh(&refresh_token).await {
            Ok(pair) => {
                // Memory swap completes before the lock is released, so no
                // pending request can attach a half-updated pair.
                *self.tokens.write().await = Some(pair.clone());
                if let Err(e) = self.persist(&pair).await {
                    // Losing the pair on crash just forces a fresh login.
                    warn!("Failed to persist refreshed tokens: {e}");
                }
                info!("Access token refreshed");
                Ok(pair.access_token)
            }
            Err(e) => {
                warn!("Token refresh failed, clearing session: {e}");
                self.logout().await;
                Err(DataError::Unauthorized(format!("token refresh failed: {e}")))
            }
        }
    }

    async fn execute_refresh(&self, refresh_token: &str) -> Result<TokenPair, DataError> {
        let response = self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| DataError::from_transport(&e, false))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::from_status(status.as_u16(), body));
        }

        let parsed: RefreshResponse = response
            .json()
            .await
            .map_err(|e| DataError::Decode(format!("refresh response: {e}")))?;

        Ok(TokenPair {
            access_token: parsed.access_token,
            // The backend may rotate the refresh token or keep the old one.
            refresh_token: parsed
                .refresh_token
                .unwrap_or_else(|| refresh_token.to_string()),
        })
    }

    async fn persist(&self, pair: &TokenPair) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token).await?;
        self.store
            .set(REFRESH_TOKEN_KEY, &pair.refresh_token)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with_memory_store() -> SessionManager {
        SessionManager::new(Arc::new(MemoryTokenStore::new()), "https://example.com")
    }

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_store_starts_unauthenticated() {
        let manager = manager_with_memory_store();
        assert!(!manager.initialize().await);
        assert!(!manager.is_authenticated().await);
        assert_eq!(manager.access_token().await, None);
    }

    #[tokio::test]
    async fn test_login_then_hydrate_restores_session() {
        let store = Arc::new(MemoryTokenStore::new());
        let manager = SessionManager::new(store.clone(), "https://example.com");
        manager.login(pair("a", "r")).await.unwrap();

        // A second manager over the same store sees the persisted pair.
        let restored = SessionManager::new(store, "https://example.com");
        assert!(restored.initialize().await);
        assert!(restored.is_authenticated().await);
        assert_eq!(restored.access_token().await, Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let manager = SessionManager::new(store.clone(), "https://example.com");
        manager.login(pair("a", "r")).await.unwrap();
        manager.logout().await;

        assert!(!manager.is_authenticated().await);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(REFRESH_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_token_strings_count_as_unauthenticated() {
        let manager = manager_with_memory_store();
        manager.login(pair("", "")).await.unwrap();
        assert!(!manager.is_authenticated().await);
        assert_eq!(manager.access_token().await, None);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_is_unauthorized() {
        let manager = manager_with_memory_store();
        let result = manager.refresh_after_unauthorized("stale").await;
        assert!(matches!(result, Err(DataError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_store_failure_during_hydration_is_not_fatal() {
        let manager =
            SessionManager::new(Arc::new(MemoryTokenStore::failing()), "https://example.com");
        assert!(!manager.initialize().await);
        assert!(!manager.is_authenticated().await);
    }
}
