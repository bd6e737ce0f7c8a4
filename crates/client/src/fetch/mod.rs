//! HTTP fetch pipeline used by the gateway strategies.
//!
//! ### Network seam
//! - Strategies talk to the `Network` trait, never to reqwest directly.
//! - `FetchClient` is the production implementation.
//!
//! ### Response semantics
//! - Every HTTP status is returned as a response, including 206 and 404.
//!   Deciding what may be stored is the caller's job.
//! - Only transport failures (connect, reset, timeout) and bodies above
//!   `max_bytes` are errors.
//! - Bodies are fully buffered; headers are lowercased.

pub mod url;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::{Client, header};

pub use url::{UrlError, canonicalize, origin_of, resolve};

use crate::request::GatewayRequest;
use waystation_core::{AppConfig, Error, HttpResponse};

/// Network access for the gateway.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    /// Perform one network attempt for the request.
    async fn fetch(&self, request: &GatewayRequest) -> Result<HttpResponse, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "waystation/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 50MB)
    pub max_bytes: usize,

    /// Transport timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "waystation/0.1".to_string(),
            max_bytes: 50 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// reqwest-backed `Network`.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn too_large(&self, len: usize) -> Error {
        Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes))
    }
}

/// Flatten a header map into lowercase names; repeated headers are joined
/// with `, `. Values that are not visible ASCII are dropped.
pub fn flatten_headers(headers: &header::HeaderMap) -> BTreeMap<String, String> {
    let mut flat: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        flat.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    flat
}

#[async_trait::async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &GatewayRequest) -> Result<HttpResponse, Error> {
        let start = Instant::now();

        let mut builder = self.http.request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{}: {}", request.url, e))
            } else {
                Error::HttpError(format!("network error: {}", e))
            }
        })?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len as usize));
        }

        let headers = flatten_headers(response.headers());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        if bytes.len() > self.config.max_bytes {
            return Err(self.too_large(bytes.len()));
        }

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "waystation/0.1");
        assert_eq!(config.max_bytes, 50 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "radio/2".into(), timeout_ms: 1500, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "radio/2");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_flatten_headers_joins_duplicates() {
        let mut headers = header::HeaderMap::new();
        headers.append(header::CONTENT_TYPE, header::HeaderValue::from_static("text/html"));
        headers.append(header::VARY, header::HeaderValue::from_static("Accept"));
        headers.append(header::VARY, header::HeaderValue::from_static("Accept-Encoding"));

        let flat = flatten_headers(&headers);
        assert_eq!(flat.get("content-type").map(String::as_str), Some("text/html"));
        assert_eq!(flat.get("vary").map(String::as_str), Some("Accept, Accept-Encoding"));
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let config = FetchConfig::default();
        let client = FetchClient::new(config);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_error() {
        let client = FetchClient::new(FetchConfig { timeout: Duration::from_millis(500), ..Default::default() })
            .unwrap();
        let request = GatewayRequest::get(::url::Url::parse("http://127.0.0.1:9/app.js").unwrap());
        let result = client.fetch(&request).await;
        assert!(matches!(result, Err(Error::HttpError(_)) | Err(Error::FetchTimeout(_))));
    }
}
