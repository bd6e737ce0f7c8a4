use super::{Strategy, StrategyContext};
use crate::request::GatewayRequest;
use waystation_core::{Error, HttpResponse};

/// Prefer the network; fall back to the stored copy when it fails.
pub struct NetworkFirst;

#[async_trait::async_trait]
impl Strategy for NetworkFirst {
    fn name(&self) -> &'static str {
        "network-first"
    }

    async fn respond(&self, ctx: &StrategyContext<'_>, request: &GatewayRequest) -> Result<HttpResponse, Error> {
        match ctx.network.fetch(request).await {
            Ok(response) => {
                ctx.store_complete(request, &response).await;
                Ok(response)
            }
            Err(network_err) => {
                let (method, url) = request.cache_key();
                tracing::warn!(url, "network request failed, trying cache: {network_err}");
                match ctx.store.lookup(method, url).await? {
                    Some(stored) => Ok(stored),
                    None => Err(network_err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{Harness, get};
    use super::*;

    const PANEL: &str = "https://radio.example.com/project-panel.js";

    #[tokio::test]
    async fn test_network_success_stores() {
        let h = Harness::new().await;
        h.seed(PANEL, "old").await;
        h.mock.ok(PANEL, "new");

        let response = NetworkFirst.respond(&h.ctx(), &get(PANEL)).await.unwrap();
        assert_eq!(response.body, b"new");
        assert_eq!(h.stored_body(PANEL).await, Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_network_failure_uses_stored() {
        let h = Harness::new().await;
        h.seed(PANEL, "old").await;
        h.mock.fail(PANEL);

        let response = NetworkFirst.respond(&h.ctx(), &get(PANEL)).await.unwrap();
        assert_eq!(response.body, b"old");
    }

    #[tokio::test]
    async fn test_network_failure_without_entry_propagates() {
        let h = Harness::new().await;
        h.mock.fail(PANEL);

        let result = NetworkFirst.respond(&h.ctx(), &get(PANEL)).await;
        assert!(matches!(result, Err(Error::HttpError(_))));
    }

    #[tokio::test]
    async fn test_partial_response_never_stored() {
        let h = Harness::new().await;
        h.mock.respond(PANEL, HttpResponse::new(206, "Partial Content", "part"));

        let response = NetworkFirst.respond(&h.ctx(), &get(PANEL)).await.unwrap();
        assert_eq!(response.status, 206);
        assert!(h.stored_body(PANEL).await.is_none());
    }
}
