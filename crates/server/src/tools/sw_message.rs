//! sw_message tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use waystation_client::{Gateway, GatewayMessage};

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageParams {
    /// Message object as posted by a page, e.g. `{"type": "GET_VERSION"}`.
    pub message: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwMessageOutput {
    /// False when the message type is not recognised.
    pub handled: bool,
    pub reply: Option<serde_json::Value>,
}

/// Post a message to the gateway. Unknown message types are ignored.
pub async fn message_impl(gateway: &Gateway, params: SwMessageParams) -> Result<CallToolResult, McpError> {
    let message = match serde_json::from_value::<GatewayMessage>(params.message) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!("ignoring message: {e}");
            return json_result(&SwMessageOutput { handled: false, reply: None });
        }
    };

    let (tx, rx) = oneshot::channel();
    gateway.handle_message(message, Some(tx));
    let reply = rx.await.ok().and_then(|reply| serde_json::to_value(reply).ok());

    json_result(&SwMessageOutput { handled: true, reply })
}
