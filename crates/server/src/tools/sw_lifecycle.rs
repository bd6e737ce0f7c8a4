//! sw_install, sw_activate and sw_status tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use waystation_client::Gateway;

use super::json_result;

/// Deliver the install event. Fails with `INSTALL_FAILED` when a shell
/// asset cannot be cached; the gateway stays installable.
pub async fn install_impl(gateway: &Gateway) -> Result<CallToolResult, McpError> {
    let report = gateway.install().await?;
    json_result(&report)
}

/// Deliver the activate event.
pub async fn activate_impl(gateway: &Gateway) -> Result<CallToolResult, McpError> {
    let report = gateway.activate().await?;
    json_result(&report)
}

pub async fn status_impl(gateway: &Gateway) -> Result<CallToolResult, McpError> {
    json_result(&gateway.status().await)
}
