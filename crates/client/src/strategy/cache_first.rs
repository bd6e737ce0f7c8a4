use super::{Strategy, StrategyContext};
use crate::request::GatewayRequest;
use waystation_core::{Error, HttpResponse};

/// Serve from the store; go to the network only on a miss.
pub struct CacheFirst;

#[async_trait::async_trait]
impl Strategy for CacheFirst {
    fn name(&self) -> &'static str {
        "cache-first"
    }

    async fn respond(&self, ctx: &StrategyContext<'_>, request: &GatewayRequest) -> Result<HttpResponse, Error> {
        let (method, url) = request.cache_key();
        if let Some(stored) = ctx.store.lookup(method, url).await? {
            tracing::debug!(url, "cache-first hit");
            return Ok(stored);
        }

        let response = ctx.network.fetch(request).await.inspect_err(|e| {
            tracing::warn!(url, "network request failed: {e}");
        })?;
        ctx.store_complete(request, &response).await;
        Ok(response)
    }
}
