//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WAYSTATION_*)
//! 2. TOML config file (if WAYSTATION_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};

mod validation;

pub use validation::ConfigError;

/// Assets that must be cached for the app to boot offline.
pub const DEFAULT_SHELL_ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./app.js",
    "./styles.css",
    "./project-panel.js",
    "./project-panel.css",
    "./manifest.json",
    "./playlist.json",
];

/// Assets cached on a best-effort basis.
pub const DEFAULT_OPTIONAL_ASSETS: &[&str] = &[
    "./machine-planning.html",
    "./project-management.html",
    "./project-panel.html",
    "./locales/nl.json",
    "./locales/pl.json",
    "./icons/favicon.svg",
    "./icons/icon-192x192.png",
    "./icons/icon-512x512.png",
];

/// Paths answered cache-first.
pub const DEFAULT_SHELL_PATHS: &[&str] = &["/", "/index.html", "/app.js", "/styles.css", "/manifest.json"];

pub const DEFAULT_DATA_SUFFIXES: &[&str] = &[".json"];

pub const DEFAULT_DATA_SEGMENTS: &[&str] = &["/api/", "/locales/"];

/// Extensions that always stream from the network (range requests).
pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "mp4", "webm"];

pub const DEFAULT_TRUSTED_ORIGINS: &[&str] =
    &["https://fonts.googleapis.com", "https://fonts.gstatic.com", "https://cdnjs.cloudflare.com"];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WAYSTATION_*)
/// 2. TOML config file (if WAYSTATION_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via WAYSTATION_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the gateway serves; relative asset paths resolve against it.
    ///
    /// Set via WAYSTATION_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Prefix of the versioned store name.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Deployed version, a dotted identifier bumped on each deploy.
    ///
    /// Set via WAYSTATION_VERSION environment variable.
    #[serde(default = "default_version", deserialize_with = "version_string")]
    pub version: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to buffer per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP transport timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Assets cached at install; any failure aborts the install.
    #[serde(default = "default_shell_assets")]
    pub shell_assets: Vec<String>,

    /// Assets cached at install on a best-effort basis.
    #[serde(default = "default_optional_assets")]
    pub optional_assets: Vec<String>,

    /// Stored document served to navigations that cannot be answered.
    #[serde(default = "default_shell_document")]
    pub shell_document: String,

    #[serde(default = "default_shell_paths")]
    pub shell_paths: Vec<String>,

    #[serde(default = "default_data_suffixes")]
    pub data_suffixes: Vec<String>,

    #[serde(default = "default_data_segments")]
    pub data_segments: Vec<String>,

    /// Extensions without the leading dot, matched case-insensitively.
    #[serde(default = "default_media_extensions")]
    pub media_extensions: Vec<String>,

    /// Cross-origin hosts still intercepted and cached.
    #[serde(default = "default_trusted_origins")]
    pub trusted_origins: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./waystation-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080/".into()
}

fn default_cache_prefix() -> String {
    "radio-shell".into()
}

fn default_version() -> String {
    "10.2.0".into()
}

fn default_user_agent() -> String {
    "waystation/0.1".into()
}

fn default_max_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_shell_assets() -> Vec<String> {
    owned(DEFAULT_SHELL_ASSETS)
}

fn default_optional_assets() -> Vec<String> {
    owned(DEFAULT_OPTIONAL_ASSETS)
}

fn default_shell_document() -> String {
    "./index.html".into()
}

fn default_shell_paths() -> Vec<String> {
    owned(DEFAULT_SHELL_PATHS)
}

fn default_data_suffixes() -> Vec<String> {
    owned(DEFAULT_DATA_SUFFIXES)
}

fn default_data_segments() -> Vec<String> {
    owned(DEFAULT_DATA_SEGMENTS)
}

fn default_media_extensions() -> Vec<String> {
    owned(DEFAULT_MEDIA_EXTENSIONS)
}

fn default_trusted_origins() -> Vec<String> {
    owned(DEFAULT_TRUSTED_ORIGINS)
}

/// Env values like `11` or `3.14` arrive as numbers; keep them as text.
fn version_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawVersion {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    Ok(match RawVersion::deserialize(deserializer)? {
        RawVersion::Text(text) => text,
        RawVersion::Integer(n) => n.to_string(),
        RawVersion::Float(f) => f.to_string(),
    })
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            shell_assets: default_shell_assets(),
            optional_assets: default_optional_assets(),
            shell_document: default_shell_document(),
            shell_paths: default_shell_paths(),
            data_suffixes: default_data_suffixes(),
            data_segments: default_data_segments(),
            media_extensions: default_media_extensions(),
            trusted_origins: default_trusted_origins(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the store owned by this version, e.g. `radio-shell-v10.2.0`.
    pub fn store_name(&self) -> String {
        format!("{}-v{}", self.cache_prefix, self.version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WAYSTATION_`
    /// 2. TOML file from `WAYSTATION_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WAYSTATION_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WAYSTATION_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./waystation-cache.sqlite"));
        assert_eq!(config.origin, "http://localhost:8080/");
        assert_eq!(config.user_agent, "waystation/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.shell_assets.len(), 8);
        assert_eq!(config.optional_assets.len(), 8);
        assert_eq!(config.shell_document, "./index.html");
        assert_eq!(config.media_extensions, vec!["mp3", "wav", "ogg", "m4a", "mp4", "webm"]);
        assert_eq!(config.trusted_origins.len(), 3);
    }

    #[test]
    fn test_store_name() {
        let config = AppConfig { cache_prefix: "radio".into(), version: "11.0".into(), ..Default::default() };
        assert_eq!(config.store_name(), "radio-v11.0");
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_from_env_and_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "waystation.toml",
                r#"
                version = "9.1.0"
                optional_assets = []
                "#,
            )?;
            jail.set_env("WAYSTATION_CONFIG_FILE", "waystation.toml");
            jail.set_env("WAYSTATION_VERSION", "10.3.0");
            jail.set_env("WAYSTATION_ORIGIN", "https://radio.example.com/");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.version, "10.3.0");
            assert_eq!(config.origin, "https://radio.example.com/");
            assert!(config.optional_assets.is_empty());
            assert_eq!(config.shell_assets.len(), 8);
            Ok(())
        });
    }

    #[test]
    fn test_load_numeric_version_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WAYSTATION_VERSION", "11");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.version, "11");
            assert_eq!(config.store_name(), "radio-shell-v11");

            jail.set_env("WAYSTATION_VERSION", "3.14");
            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.version, "3.14");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_version() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WAYSTATION_VERSION", "next");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "version"));
            Ok(())
        });
    }
}
