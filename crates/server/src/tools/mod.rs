//! MCP tool implementations.
//!
//! `sw_*` tools deliver gateway trigger events; `cache_*` tools inspect the
//! stores. Every tool answers with pretty-printed JSON text content.

pub mod cache;
pub mod sw_fetch;
pub mod sw_lifecycle;
pub mod sw_message;

use std::collections::BTreeMap;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use waystation_client::Method;
use waystation_core::HttpResponse;

use crate::error::ToolError;

/// A response as shown to MCP clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    /// Body as text, when it is valid UTF-8.
    pub body_text: Option<String>,
    pub body_bytes: usize,
}

impl From<&HttpResponse> for ResponseView {
    fn from(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            body_text: response.text().map(str::to_string),
            body_bytes: response.body.len(),
        }
    }
}

fn default_method() -> String {
    "GET".into()
}

pub(crate) fn parse_method(method: &str) -> Result<Method, ToolError> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ToolError::InvalidInput(format!("invalid method: {method}")))
}

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(|e| ToolError::OutputFailed(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
