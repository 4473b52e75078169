//! Backend health probe and data client selection.
//!
//! The provider owns the single live client for the process lifetime and
//! publishes it through a watch channel; consumers subscribe or read, and
//! only this module ever branches on which backend is active.

use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::auth::SessionManager;
use crate::client::{DataClient, FetchPolicy, GraphQlClient, RestClient};
use crate::config::Config;
use crate::constants::HEALTH_PROBE_TIMEOUT;

/// Which adapter currently backs the published client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Rest,
    Bff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorState {
    Probing,
    RestActive,
    BffActive,
}

/// Owns backend selection and the process-wide active [`DataClient`].
///
/// Construction publishes the REST adapter immediately so no caller blocks
/// on startup latency; [`ClientProvider::probe_and_select`] then decides
/// whether to swap in the GraphQL adapter. The decision can be re-triggered
/// at any time via [`ClientProvider::retry_bff`] — there is no terminal
/// state.
pub struct ClientProvider {
    config: Config,
    session: Arc<SessionManager>,
    tx: watch::Sender<Arc<dyn DataClient>>,
    rest: Arc<RestClient>,
    /// Either the active (network-only) or the detached (cache-only)
    /// GraphQL client, depending on the last probe.
    graphql: RwLock<Option<Arc<GraphQlClient>>>,
    state: RwLock<SelectorState>,
    probe_http: reqwest::Client,
    health_url: String,
}

impl ClientProvider {
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized.
    #[must_use]
    pub fn new(config: Config, session: Arc<SessionManager>) -> Self {
        let rest = Arc::new(RestClient::new(&config, session.clone()));
        let (tx, _) = watch::channel::<Arc<dyn DataClient>>(rest.clone());
        let probe_http = reqwest::Client::builder()
            .timeout(HEALTH_PROBE_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        let health_url = derive_health_url(&config.graphql_url);
        Self {
            config,
            session,
            tx,
            rest,
            graphql: RwLock::new(None),
            state: RwLock::new(SelectorState::Probing),
            probe_http,
            health_url,
        }
    }

    /// The currently published client.
    #[must_use]
    pub fn current(&self) -> Arc<dyn DataClient> {
        self.tx.borrow().clone()
    }

    /// Subscribe to client swaps.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<dyn DataClient>> {
        self.tx.subscribe()
    }

    /// Which backend the published client talks to. `Rest` while a probe is
    /// still in flight (the safe default is published during that window).
    pub async fn active_backend(&self) -> Backend {
        match *self.state.read().await {
            SelectorState::BffActive => Backend::Bff,
            SelectorState::Probing | SelectorState::RestActive => Backend::Rest,
        }
    }

    /// Probe the BFF once and publish the matching adapter.
    ///
    /// Called at startup and again on every manual retry. Both probe
    /// outcomes resolve to a decision; this never fails.
    pub async fn probe_and_select(&self) -> Backend {
        *self.state.write().await = SelectorState::Probing;

        let available = self.probe_health().await;
        let mut graphql = self.graphql.write().await;
        if available {
            // BFF confirmed live: force freshness on every read.
            let client = Arc::new(GraphQlClient::new(
                &self.config,
                self.session.clone(),
                FetchPolicy::NetworkOnly,
            ));
            *graphql = Some(client.clone());
            *self.state.write().await = SelectorState::BffActive;
            self.tx.send_replace(client);
            info!("BFF available, GraphQL client published");
            Backend::Bff
        } else {
            // Keep a detached GraphQL client around: cache-only, so it can
            // never silently succeed against a dead backend.
            *graphql = Some(Arc::new(GraphQlClient::new(
                &self.config,
                self.session.clone(),
                FetchPolicy::CacheOnly,
            )));
            *self.state.write().await = SelectorState::RestActive;
            self.tx.send_replace(self.rest.clone());
            info!("BFF unavailable, REST client published");
            Backend::Rest
        }
    }

    /// Manual "retry BFF" action: re-probe and swap if the answer changed.
    pub async fn retry_bff(&self) -> Backend {
        debug!("Manual BFF retry requested");
        self.probe_and_select().await
    }

    /// One bounded GET against the derived health endpoint. Timeout,
    /// transport failure and non-2xx all resolve to `false`.
    async fn probe_health(&self) -> bool {
        match self.probe_http.get(&self.health_url).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                debug!(
                    status = response.status().as_u16(),
                    healthy, "BFF health probe completed"
                );
                healthy
            }
            Err(e) => {
                warn!(url = %self.health_url, error = %e, "BFF health probe failed");
                false
            }
        }
    }
}

/// Derive the health endpoint from the GraphQL endpoint URL: same origin,
/// path replaced with `/health`.
fn derive_health_url(graphql_url: &str) -> String {
    match url::Url::parse(graphql_url) {
        Ok(mut parsed) => {
            parsed.set_path("/health");
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => format!("{}/health", graphql_url.trim_end_matches('/')),
    }
}
