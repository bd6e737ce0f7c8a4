//! sw_fetch tool implementation.
//!
//! Runs one request through the gateway's fetch interceptor and reports how
//! it was handled.

use std::collections::BTreeMap;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use waystation_client::{Destination, Gateway, GatewayRequest, Interception};

use super::{ResponseView, default_method, json_result, parse_method};
use crate::error::ToolError;

/// Input parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path relative to the gateway origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination, e.g. "document" for a navigation.
    #[serde(default)]
    pub destination: Option<String>,

    /// Extra request headers forwarded to the network.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    NotControlled,
    Passthrough,
    Respond,
}

/// Output structure for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    pub url: String,
    pub outcome: FetchOutcome,
    /// Caching policy the request was classified into.
    pub policy: Option<String>,
    /// Why the request was not intercepted.
    pub reason: Option<String>,
    /// Whether the offline fallback produced the response.
    pub fallback: bool,
    pub response: Option<ResponseView>,
}

pub async fn fetch_impl(gateway: &Gateway, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    let url = gateway.resolve_url(&params.url)?;
    let method = parse_method(&params.method)?;
    let destination = match params.destination.as_deref() {
        Some(value) => Destination::parse(value)
            .ok_or_else(|| ToolError::InvalidInput(format!("unknown destination: {value}")))?,
        None => Destination::Empty,
    };

    let mut request = GatewayRequest::get(url).with_method(method).with_destination(destination);
    for (name, value) in &params.headers {
        request = request.with_header(name, value.clone());
    }

    let url = request.url.to_string();
    let output = match gateway.handle_fetch(&request).await {
        Interception::NotControlled => SwFetchOutput {
            url,
            outcome: FetchOutcome::NotControlled,
            policy: None,
            reason: None,
            fallback: false,
            response: None,
        },
        Interception::Passthrough(reason) => SwFetchOutput {
            url,
            outcome: FetchOutcome::Passthrough,
            policy: Some("excluded".into()),
            reason: Some(reason.name().into()),
            fallback: false,
            response: None,
        },
        Interception::Respond { policy, response, fallback } => SwFetchOutput {
            url,
            outcome: FetchOutcome::Respond,
            policy: Some(policy.name().into()),
            reason: None,
            fallback,
            response: Some(ResponseView::from(&response)),
        },
    };

    json_result(&output)
}
