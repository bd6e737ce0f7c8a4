//! cache_get tool implementation.
//!
//! Retrieves the stored response for a request from the current store.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use waystation_client::Gateway;
use waystation_core::Error;

use super::super::{ResponseView, default_method, json_result, parse_method};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path relative to the gateway origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub method: String,
    pub url: String,
    pub response: ResponseView,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(gateway: &Gateway, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let url = gateway.resolve_url(&params.url)?;
    let method = parse_method(&params.method)?;
    let store = gateway.store();

    let response = store
        .lookup(method.as_str(), url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{method} {url}")))?;

    json_result(&CacheGetOutput {
        store: store.name().to_string(),
        method: method.to_string(),
        url: url.to_string(),
        response: ResponseView::from(&response),
    })
}
