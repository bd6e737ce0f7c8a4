//! Caching strategies.
//!
//! Each strategy answers a request from the store, the network or both.
//! Strategies may fail; the gateway routes failures to the fallback resolver.
//!
//! | policy | strategy |
//! |--------|----------|
//! | `Shell` | [`CacheFirst`] |
//! | `Data`  | [`StaleWhileRevalidate`] |
//! | `Other` | [`NetworkFirst`] |

mod cache_first;
mod network_first;
mod stale_while_revalidate;

use std::sync::Arc;

pub use cache_first::CacheFirst;
pub use network_first::NetworkFirst;
pub use stale_while_revalidate::StaleWhileRevalidate;

use crate::background::BackgroundTasks;
use crate::classify::Policy;
use crate::fetch::Network;
use crate::request::GatewayRequest;
use waystation_core::{CacheStore, Error, HttpResponse};

/// What a strategy may touch while answering a request.
pub struct StrategyContext<'a> {
    pub store: &'a CacheStore,
    pub network: &'a Arc<dyn Network>,
    pub background: &'a BackgroundTasks,
}

impl StrategyContext<'_> {
    /// Write a complete response to the store. Write failures are only logged.
    pub(crate) async fn store_complete(&self, request: &GatewayRequest, response: &HttpResponse) {
        store_complete(self.store, request, response).await;
    }
}

pub(crate) async fn store_complete(store: &CacheStore, request: &GatewayRequest, response: &HttpResponse) {
    if !response.is_complete() {
        tracing::debug!(status = response.status, url = %request.url, "not storing incomplete response");
        return;
    }
    let (method, url) = request.cache_key();
    if let Err(e) = store.put(method, url, response).await {
        tracing::warn!(url, "failed to store response: {e}");
    }
}

/// One way of answering a request.
#[async_trait::async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn respond(&self, ctx: &StrategyContext<'_>, request: &GatewayRequest) -> Result<HttpResponse, Error>;
}

/// Policy → strategy dispatch table.
static STRATEGIES: &[(Policy, &dyn Strategy)] = &[
    (Policy::Shell, &CacheFirst),
    (Policy::Data, &StaleWhileRevalidate),
    (Policy::Other, &NetworkFirst),
];

/// Strategy for a policy; `None` for `Policy::Excluded`.
pub fn for_policy(policy: Policy) -> Option<&'static dyn Strategy> {
    STRATEGIES
        .iter()
        .find(|(p, _)| *p == policy)
        .map(|(_, strategy)| *strategy)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ExclusionReason;

    #[test]
    fn test_table_covers_interceptable_policies() {
        assert_eq!(for_policy(Policy::Shell).map(|s| s.name()), Some("cache-first"));
        assert_eq!(for_policy(Policy::Data).map(|s| s.name()), Some("stale-while-revalidate"));
        assert_eq!(for_policy(Policy::Other).map(|s| s.name()), Some("network-first"));
        assert!(for_policy(Policy::Excluded(ExclusionReason::MediaFile)).is_none());
    }
}
