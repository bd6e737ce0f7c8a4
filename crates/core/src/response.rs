//! HTTP response value passed between the network, the stores and callers.

use std::collections::BTreeMap;

/// Status text used for synthetic offline responses.
pub const SERVICE_UNAVAILABLE: &str = "Service Unavailable";

/// A fully buffered HTTP response.
///
/// Header names are kept lowercase so lookups and comparisons are stable
/// across the network and storage paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response with no headers.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { status, status_text: status_text.into(), headers: BTreeMap::new(), body: body.into() }
    }

    /// Builder-style header insertion. The name is lowercased.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// 503 with a JSON body.
    pub fn unavailable_json(body: &serde_json::Value) -> Self {
        Self::new(503, SERVICE_UNAVAILABLE, body.to_string()).with_header("content-type", "application/json")
    }

    /// 503 with a plain-text body.
    pub fn unavailable_text(body: &str) -> Self {
        Self::new(503, SERVICE_UNAVAILABLE, body).with_header("content-type", "text/plain")
    }

    /// Whether this is a complete success that may be written to a store.
    ///
    /// Partial (206) and every other non-200 status are excluded.
    pub fn is_complete(&self) -> bool {
        self.status == 200
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as UTF-8, if it is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}
