//! Outgoing request as seen by the gateway.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// What the page intends to do with the response.
///
/// Only `Document` matters to the gateway: it marks a top-level navigation,
/// which may be answered with the stored shell document when offline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Audio,
    Video,
    Manifest,
    #[default]
    Empty,
}

impl Destination {
    pub fn parse(value: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase())).ok()
    }
}

/// A request intercepted from the page.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    /// Lowercased header names forwarded to the network.
    pub headers: BTreeMap<String, String>,
}

impl GatewayRequest {
    /// A plain GET with no destination. The fragment never reaches the
    /// network or the store key.
    pub fn get(mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: Method::GET, url, destination: Destination::Empty, headers: BTreeMap::new() }
    }

    /// A top-level document navigation.
    pub fn navigate(url: Url) -> Self {
        Self { destination: Destination::Document, ..Self::get(url) }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.destination == Destination::Document
    }

    /// Store key parts: method and URL string.
    pub fn cache_key(&self) -> (&str, &str) {
        (self.method.as_str(), self.url.as_str())
    }
}
