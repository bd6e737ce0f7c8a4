//! cache_stores tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use waystation_client::Gateway;
use waystation_core::StoreSummary;

use super::super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Store the running version reads and writes.
    pub current: String,
    pub stores: Vec<StoreSummary>,
}

/// List every store in the database with its entry count.
pub async fn stores_impl(gateway: &Gateway) -> Result<CallToolResult, McpError> {
    let stores = gateway.db().store_summaries().await?;
    json_result(&CacheStoresOutput { current: gateway.config().store_name.clone(), stores })
}
