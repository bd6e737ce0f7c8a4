//! Request classification.
//!
//! Maps each request to exactly one caching policy. Classification is a pure
//! function of method, origin and path; nothing is stored. Origin only decides
//! whether a request is intercepted at all.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::origin_of;
use crate::request::GatewayRequest;
use waystation_core::AppConfig;

/// Caching policy for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Cache-first.
    Shell,
    /// Stale-while-revalidate.
    Data,
    /// Network-first.
    Other,
    /// Not intercepted at all.
    Excluded(ExclusionReason),
}

impl Policy {
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Shell => "shell",
            Policy::Data => "data",
            Policy::Other => "other",
            Policy::Excluded(_) => "excluded",
        }
    }
}

/// Why a request is left to the page's own network stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    NonGetMethod,
    UntrustedOrigin,
    /// Media must stream so range (206) requests keep working.
    MediaFile,
}

impl ExclusionReason {
    pub fn name(&self) -> &'static str {
        match self {
            ExclusionReason::NonGetMethod => "non_get_method",
            ExclusionReason::UntrustedOrigin => "untrusted_origin",
            ExclusionReason::MediaFile => "media_file",
        }
    }
}

/// Predicate sets used by `classify`.
#[derive(Debug, Clone)]
pub struct ClassifyRules {
    origin: String,
    shell_paths: Vec<String>,
    data_suffixes: Vec<String>,
    data_segments: Vec<String>,
    media_extensions: Vec<String>,
    trusted_origins: Vec<String>,
}

impl ClassifyRules {
    pub fn new(origin: &Url, config: &AppConfig) -> Self {
        Self {
            origin: origin_of(origin),
            shell_paths: config.shell_paths.clone(),
            data_suffixes: config.data_suffixes.clone(),
            data_segments: config.data_segments.clone(),
            media_extensions: config
                .media_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            trusted_origins: config
                .trusted_origins
                .iter()
                .map(|o| o.trim_end_matches('/').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Reason to leave the request alone, if any.
    pub fn exclusion(&self, request: &GatewayRequest) -> Option<ExclusionReason> {
        if request.method != Method::GET {
            return Some(ExclusionReason::NonGetMethod);
        }
        if !self.is_same_origin(&request.url) && !self.is_trusted_origin(&request.url) {
            return Some(ExclusionReason::UntrustedOrigin);
        }
        if self.is_media_file(request.url.path()) {
            return Some(ExclusionReason::MediaFile);
        }
        None
    }

    /// Classify a request into exactly one policy.
    pub fn classify(&self, request: &GatewayRequest) -> Policy {
        if let Some(reason) = self.exclusion(request) {
            return Policy::Excluded(reason);
        }

        let path = request.url.path();
        if self.shell_paths.iter().any(|p| p == path) {
            Policy::Shell
        } else if self.is_data_path(path) {
            Policy::Data
        } else {
            Policy::Other
        }
    }

    pub fn is_same_origin(&self, url: &Url) -> bool {
        origin_of(url) == self.origin
    }

    pub fn is_trusted_origin(&self, url: &Url) -> bool {
        let origin = origin_of(url);
        self.trusted_origins.iter().any(|trusted| *trusted == origin)
    }

    pub fn is_data_path(&self, path: &str) -> bool {
        self.data_suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
            || self.data_segments.iter().any(|segment| path.contains(segment.as_str()))
    }

    /// Extension of the last path segment, compared case-insensitively.
    pub fn is_media_file(&self, path: &str) -> bool {
        let segment = path.rsplit('/').next().unwrap_or_default();
        let Some((_, ext)) = segment.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.media_extensions.iter().any(|media| *media == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ClassifyRules {
        let origin = Url::parse("https://radio.example.com/").unwrap();
        ClassifyRules::new(&origin, &AppConfig::default())
    }

    fn get(url: &str) -> GatewayRequest {
        GatewayRequest::get(Url::parse(url).unwrap())
    }

    #[test]
    fn test_shell_paths() {
        let rules = rules();
        for path in ["/", "/index.html", "/app.js", "/styles.css", "/manifest.json"] {
            let request = get(&format!("https://radio.example.com{path}"));
            assert_eq!(rules.classify(&request), Policy::Shell, "{path}");
        }
    }

    #[test]
    fn test_data_paths() {
        let rules = rules();
        assert_eq!(rules.classify(&get("https://radio.example.com/playlist.json")), Policy::Data);
        assert_eq!(rules.classify(&get("https://radio.example.com/api/now-playing")), Policy::Data);
        assert_eq!(rules.classify(&get("https://radio.example.com/locales/nl.json")), Policy::Data);
        assert_eq!(rules.classify(&get("https://radio.example.com/locales/pl")), Policy::Data);
    }

    #[test]
    fn test_other_paths() {
        let rules = rules();
        assert_eq!(rules.classify(&get("https://radio.example.com/project-panel.js")), Policy::Other);
        assert_eq!(rules.classify(&get("https://radio.example.com/icons/favicon.svg")), Policy::Other);
        assert_eq!(rules.classify(&get("https://radio.example.com/machine-planning.html")), Policy::Other);
    }

    #[test]
    fn test_query_does_not_affect_path_rules() {
        let rules = rules();
        assert_eq!(rules.classify(&get("https://radio.example.com/app.js?v=10")), Policy::Shell);
        assert_eq!(rules.classify(&get("https://radio.example.com/x?file=a.json")), Policy::Other);
    }

    #[test]
    fn test_media_excluded() {
        let rules = rules();
        for ext in ["mp3", "wav", "ogg", "m4a", "mp4", "webm", "MP3"] {
            let request = get(&format!("https://radio.example.com/jingles/intro.{ext}"));
            assert_eq!(rules.exclusion(&request), Some(ExclusionReason::MediaFile), "{ext}");
            assert_eq!(rules.classify(&request), Policy::Excluded(ExclusionReason::MediaFile));
        }
    }

    #[test]
    fn test_media_extension_must_be_final() {
        let rules = rules();
        assert!(!rules.is_media_file("/manifest.webmanifest"));
        assert!(!rules.is_media_file("/mp3/list.json"));
        assert!(!rules.is_media_file("/"));
        assert!(rules.is_media_file("/stream/live.ogg"));
    }

    #[test]
    fn test_non_get_excluded() {
        let rules = rules();
        let request = get("https://radio.example.com/api/likes").with_method(Method::POST);
        assert_eq!(rules.exclusion(&request), Some(ExclusionReason::NonGetMethod));
        assert_eq!(rules.classify(&request), Policy::Excluded(ExclusionReason::NonGetMethod));
    }

    #[test]
    fn test_cross_origin() {
        let rules = rules();
        let untrusted = get("https://tracker.example.net/pixel.gif");
        assert_eq!(rules.classify(&untrusted), Policy::Excluded(ExclusionReason::UntrustedOrigin));

        let font_css = get("https://fonts.googleapis.com/css2?family=Inter");
        assert_eq!(rules.exclusion(&font_css), None);
        assert_eq!(rules.classify(&font_css), Policy::Other);
    }

    #[test]
    fn test_shell_matches_path_on_trusted_origin() {
        let rules = rules();
        assert_eq!(rules.classify(&get("https://cdnjs.cloudflare.com/")), Policy::Shell);
        assert_eq!(rules.classify(&get("https://fonts.googleapis.com/css2")), Policy::Other);
        assert_eq!(
            rules.classify(&get("https://untrusted.example.net/")),
            Policy::Excluded(ExclusionReason::UntrustedOrigin)
        );
    }

    #[test]
    fn test_names_match_serde() {
        assert_eq!(serde_json::to_value(Policy::Data).unwrap(), "data");
        assert_eq!(
            serde_json::to_value(ExclusionReason::UntrustedOrigin).unwrap(),
            ExclusionReason::UntrustedOrigin.name()
        );
        assert_eq!(Policy::Excluded(ExclusionReason::MediaFile).name(), "excluded");
    }

    #[test]
    fn test_different_port_is_cross_origin() {
        let rules = rules();
        let request = get("https://radio.example.com:8443/app.js");
        assert_eq!(rules.exclusion(&request), Some(ExclusionReason::UntrustedOrigin));
    }
}
