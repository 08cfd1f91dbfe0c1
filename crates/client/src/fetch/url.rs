//! URL canonicalization and origin checks for request routing.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a request URL so equal requests share a cache key.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve origin-relative input (`/static/app.js`) against `base`
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str, base: &Url) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        base.join(trimmed)
    }
    .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Whether two URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8000").unwrap()
    }

    #[test]
    fn test_canonicalize_absolute() {
        let url = canonicalize("https://example.com/app.js", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/app.js");
    }

    #[test]
    fn test_canonicalize_relative_path() {
        let url = canonicalize("/static/style.css", &base()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/static/style.css");
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("http://LOCALHOST:8000/", &base()).unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("/#settings", &base()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_canonicalize_preserve_query() {
        let url = canonicalize("/api/stats?b=2&a=1", &base()).unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd", &base());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_whitespace_only() {
        let result = canonicalize("   ", &base());
        assert!(matches!(result, Err(UrlError::Empty)));
    }

    #[test]
    fn test_same_origin() {
        let origin = base();
        assert!(same_origin(&origin, &Url::parse("http://localhost:8000/static/a.js").unwrap()));
        assert!(!same_origin(&origin, &Url::parse("http://localhost:9000/").unwrap()));
        assert!(!same_origin(&origin, &Url::parse("https://localhost:8000/").unwrap()));
        assert!(!same_origin(&origin, &Url::parse("https://fonts.googleapis.com/css2").unwrap()));
    }
}
