//! Request-descriptor cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request descriptor.
///
/// The method is uppercased so `get` and `GET` address the same entry.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", "https://example.com/app.js");
        let hash2 = compute_cache_key("GET", "https://example.com/app.js");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_method_case() {
        assert_eq!(
            compute_cache_key("get", "https://example.com/"),
            compute_cache_key("GET", "https://example.com/")
        );
    }

    #[test]
    fn test_hash_different_method() {
        assert_ne!(
            compute_cache_key("GET", "https://example.com/"),
            compute_cache_key("HEAD", "https://example.com/")
        );
    }

    #[test]
    fn test_hash_different_url() {
        assert_ne!(
            compute_cache_key("GET", "https://example.com/a"),
            compute_cache_key("GET", "https://example.com/b")
        );
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("GET", "https://example.com");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
