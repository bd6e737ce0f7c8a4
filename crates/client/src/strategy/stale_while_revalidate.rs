use std::sync::Arc;

use super::{Strategy, StrategyContext, store_complete};
use crate::request::GatewayRequest;
use waystation_core::{Error, HttpResponse};

/// Serve the stored copy at once and refresh it in the background.
///
/// Without a stored copy the caller waits for the network like any other
/// fetch. The background refresh reports only through the store.
pub struct StaleWhileRevalidate;

#[async_trait::async_trait]
impl Strategy for StaleWhileRevalidate {
    fn name(&self) -> &'static str {
        "stale-while-revalidate"
    }

    async fn respond(&self, ctx: &StrategyContext<'_>, request: &GatewayRequest) -> Result<HttpResponse, Error> {
        let (method, url) = request.cache_key();
        let Some(stored) = ctx.store.lookup(method, url).await? else {
            let response = ctx.network.fetch(request).await.inspect_err(|e| {
                tracing::warn!(url, "network request failed: {e}");
            })?;
            ctx.store_complete(request, &response).await;
            return Ok(response);
        };

        let store = ctx.store.clone();
        let network = Arc::clone(ctx.network);
        let request = request.clone();
        ctx.background
            .spawn(async move {
                match network.fetch(&request).await {
                    Ok(response) => store_complete(&store, &request, &response).await,
                    Err(e) => tracing::warn!(url = %request.url, "background revalidation failed: {e}"),
                }
            })
            .await;

        Ok(stored)
    }
}
