//! Request-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a canonical request URL.
pub fn compute_cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check that `key` has the shape produced by [`compute_cache_key`]:
/// 64 lowercase hex characters.
pub fn is_valid_key(key: &str) -> bool {
    key.len() == 64 && key.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("https://example.com/");
        let hash2 = compute_cache_key("https://example.com/");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_query() {
        let a = compute_cache_key("https://example.com/app.js?v=1");
        let b = compute_cache_key("https://example.com/app.js?v=2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("https://example.com/");
        assert!(is_valid_key(&hash));
        assert!(!is_valid_key("not-a-key"));
    }

    #[test]
    fn test_uppercase_key_rejected() {
        let hash = compute_cache_key("https://example.com/");
        assert!(!is_valid_key(&hash.to_ascii_uppercase()));
    }
}
