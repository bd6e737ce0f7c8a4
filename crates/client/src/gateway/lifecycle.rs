use std::fmt;
use std::sync::atomic::Ordering;

use futures_util::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use url::Url;

use super::Gateway;
use crate::request::GatewayRequest;
use waystation_core::cache::PendingEntry;
use waystation_core::{CacheStore, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Installing,
    Activating,
    Ready,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Installing => "installing",
            LifecycleState::Activating => "activating",
            LifecycleState::Ready => "ready",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub version: String,
    pub store: String,
    pub shell_cached: usize,
    pub optional_cached: usize,
    pub optional_failed: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
}

impl Gateway {
    /// Precache the shell (all or nothing) and, best effort, the optional
    /// assets. On success the gateway moves to `Activating`; on failure it
    /// stays in `Installing` and install may be retried.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let state = self.state().await;
        if state != LifecycleState::Installing {
            return Err(Error::InvalidState(format!("install requires installing, gateway is {state}")));
        }

        tracing::info!(version = %self.config.version, "installing");
        self.skip_waiting.store(true, Ordering::SeqCst);

        let store = self.db.open_store(&self.config.store_name).await?;
        let (shell, optional) = tokio::join!(self.cache_shell(&store), self.cache_optional(&store));

        let shell_cached = match shell {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(version = %self.config.version, "install failed: {e}");
                return Err(e);
            }
        };
        let (optional_cached, optional_failed) = optional;

        *self.state.write().await = LifecycleState::Activating;
        tracing::info!(
            shell_cached,
            optional_cached,
            optional_failed = optional_failed.len(),
            "install complete"
        );

        Ok(InstallReport {
            version: self.config.version.clone(),
            store: self.config.store_name.clone(),
            shell_cached,
            optional_cached,
            optional_failed,
        })
    }

    /// Delete every store but the current one, claim clients and start
    /// intercepting.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let mut state = self.state.write().await;
        if *state != LifecycleState::Activating {
            return Err(Error::InvalidState(format!("activate requires activating, gateway is {}", *state)));
        }

        let mut deleted = Vec::new();
        for name in self.db.store_names().await? {
            if name == self.config.store_name {
                continue;
            }
            if self.db.delete_store(&name).await? {
                tracing::info!(store = %name, "deleted superseded store");
                deleted.push(name);
            }
        }

        self.clients_claimed.store(true, Ordering::SeqCst);
        *state = LifecycleState::Ready;
        tracing::info!(version = %self.config.version, "activated");

        Ok(ActivateReport { deleted })
    }

    async fn cache_shell(&self, store: &CacheStore) -> Result<usize, Error> {
        let fetches = self.config.shell_assets.iter().map(|url| self.fetch_complete(url));
        let entries = try_join_all(fetches).await?;
        store.put_all(entries).await
    }

    async fn cache_optional(&self, store: &CacheStore) -> (usize, Vec<String>) {
        let results = join_all(self.config.optional_assets.iter().map(|url| async move {
            let entry = self.fetch_complete(url).await?;
            store.put(&entry.method, &entry.url, &entry.response).await
        }))
        .await;

        let mut cached = 0;
        let mut failed = Vec::new();
        for (url, result) in self.config.optional_assets.iter().zip(results) {
            match result {
                Ok(()) => cached += 1,
                Err(e) => {
                    tracing::warn!(url = %url, "optional asset not cached: {e}");
                    failed.push(url.to_string());
                }
            }
        }
        (cached, failed)
    }

    /// Fetch an asset for precaching. Anything but a 200 is a failure.
    async fn fetch_complete(&self, url: &Url) -> Result<PendingEntry, Error> {
        let request = GatewayRequest::get(url.clone());
        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;
        if !response.is_complete() {
            return Err(Error::InstallFailed(format!("{url}: status {}", response.status)));
        }

        let (method, url) = request.cache_key();
        Ok(PendingEntry { method: method.to_string(), url: url.to_string(), response })
    }
}
