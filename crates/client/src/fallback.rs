//! Offline fallback resolution.
//!
//! Runs only after a strategy failed. Always produces a response:
//!
//! 1. the stored response for the exact request
//! 2. the stored shell document, for navigations
//! 3. a 503 JSON error, for data requests
//! 4. a 503 plain-text notice

use url::Url;

use crate::classify::Policy;
use crate::request::GatewayRequest;
use waystation_core::{CacheStore, HttpResponse};

pub const OFFLINE_TEXT: &str = "Content not available offline";

/// Body of the data-request fallback. `cached: false` distinguishes it from
/// a legitimately empty payload.
pub fn offline_json() -> serde_json::Value {
    serde_json::json!({ "error": "Offline", "cached": false })
}

pub struct FallbackResolver<'a> {
    store: &'a CacheStore,
    shell_document: &'a Url,
}

impl<'a> FallbackResolver<'a> {
    pub fn new(store: &'a CacheStore, shell_document: &'a Url) -> Self {
        Self { store, shell_document }
    }

    pub async fn resolve(&self, request: &GatewayRequest, policy: Policy) -> HttpResponse {
        let (method, url) = request.cache_key();
        if let Some(stored) = self.lookup(method, url).await {
            return stored;
        }

        if request.is_navigation()
            && let Some(shell) = self.lookup("GET", self.shell_document.as_str()).await
        {
            tracing::debug!(url, "serving shell document for offline navigation");
            return shell;
        }

        if policy == Policy::Data {
            return HttpResponse::unavailable_json(&offline_json());
        }

        HttpResponse::unavailable_text(OFFLINE_TEXT)
    }

    async fn lookup(&self, method: &str, url: &str) -> Option<HttpResponse> {
        match self.store.lookup(method, url).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(url, "fallback store lookup failed: {e}");
                None
            }
        }
    }
}
