//! The offline caching gateway.
//!
//! Owns one versioned store and the `Installing → Activating → Ready`
//! lifecycle. Once ready, every request the page issues goes through
//! [`Gateway::handle_fetch`], which either leaves it alone or answers it
//! through a caching strategy, with the fallback resolver behind it.

mod lifecycle;
mod message;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

pub use lifecycle::{ActivateReport, InstallReport, LifecycleState};
pub use message::{GatewayMessage, MessageReply};

use crate::background::BackgroundTasks;
use crate::classify::{ClassifyRules, ExclusionReason, Policy};
use crate::fallback::FallbackResolver;
use crate::fetch::{Network, resolve};
use crate::request::GatewayRequest;
use crate::strategy::{self, StrategyContext};
use waystation_core::{AppConfig, CacheDb, CacheStore, Error, HttpResponse};

/// Everything the gateway needs to know about its deployment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub version: String,
    pub store_name: String,
    pub origin: Url,
    pub shell_assets: Vec<Url>,
    pub optional_assets: Vec<Url>,
    pub shell_document: Url,
    pub rules: ClassifyRules,
}

impl GatewayConfig {
    /// Resolve asset paths against the origin and build the classifier.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let resolve_all = |paths: &[String]| -> Result<Vec<Url>, Error> {
            paths
                .iter()
                .map(|path| resolve(&origin, path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}"))))
                .collect()
        };

        Ok(Self {
            version: config.version.clone(),
            store_name: config.store_name(),
            shell_assets: resolve_all(&config.shell_assets)?,
            optional_assets: resolve_all(&config.optional_assets)?,
            shell_document: resolve(&origin, &config.shell_document)
                .map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.shell_document)))?,
            rules: ClassifyRules::new(&origin, config),
            origin,
        })
    }
}

/// Outcome of intercepting one request.
#[derive(Debug, Clone)]
pub enum Interception {
    /// The gateway is not ready; the page uses the network directly.
    NotControlled,
    /// Excluded request; the page uses the network directly.
    Passthrough(ExclusionReason),
    /// Answered by the gateway.
    Respond {
        policy: Policy,
        response: HttpResponse,
        /// Whether the fallback resolver produced the response.
        fallback: bool,
    },
}

impl Interception {
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Interception::Respond { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Point-in-time view of the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayStatus {
    pub version: String,
    pub store_name: String,
    pub state: LifecycleState,
    pub skip_waiting: bool,
    pub clients_claimed: bool,
}

pub struct Gateway {
    config: GatewayConfig,
    db: CacheDb,
    network: Arc<dyn Network>,
    state: RwLock<LifecycleState>,
    skip_waiting: AtomicBool,
    clients_claimed: AtomicBool,
    background: BackgroundTasks,
}

impl Gateway {
    pub fn new(config: GatewayConfig, db: CacheDb, network: Arc<dyn Network>) -> Self {
        tracing::info!(version = %config.version, store = %config.store_name, "gateway loaded");
        Self {
            config,
            db,
            network,
            state: RwLock::new(LifecycleState::Installing),
            skip_waiting: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
            background: BackgroundTasks::new(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Resolve a page-relative or absolute URL against the origin.
    pub fn resolve_url(&self, input: &str) -> Result<Url, Error> {
        resolve(&self.config.origin, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))
    }

    /// Handle to this version's store.
    pub fn store(&self) -> CacheStore {
        self.db.store(&self.config.store_name)
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub async fn status(&self) -> GatewayStatus {
        GatewayStatus {
            version: self.config.version.clone(),
            store_name: self.config.store_name.clone(),
            state: self.state().await,
            skip_waiting: self.skip_waiting.load(Ordering::SeqCst),
            clients_claimed: self.clients_claimed.load(Ordering::SeqCst),
        }
    }

    /// Intercept one request. Never fails: strategy errors end up in the
    /// fallback resolver.
    pub async fn handle_fetch(&self, request: &GatewayRequest) -> Interception {
        if self.state().await != LifecycleState::Ready {
            return Interception::NotControlled;
        }

        let policy = self.config.rules.classify(request);
        if let Policy::Excluded(reason) = policy {
            tracing::debug!(url = %request.url, ?reason, "not intercepting");
            return Interception::Passthrough(reason);
        }

        let store = self.store();
        let ctx = StrategyContext { store: &store, network: &self.network, background: &self.background };
        let result = match strategy::for_policy(policy) {
            Some(strategy) => {
                tracing::debug!(url = %request.url, strategy = strategy.name(), "intercepting");
                strategy.respond(&ctx, request).await
            }
            None => Err(Error::InvalidState(format!("no strategy for {policy:?}"))),
        };

        match result {
            Ok(response) => Interception::Respond { policy, response, fallback: false },
            Err(e) => {
                tracing::error!(url = %request.url, "request handling failed: {e}");
                let response = FallbackResolver::new(&store, &self.config.shell_document)
                    .resolve(request, policy)
                    .await;
                Interception::Respond { policy, response, fallback: true }
            }
        }
    }

    /// Wait for background revalidations spawned so far.
    pub async fn settle(&self) {
        self.background.settle().await;
    }
}
