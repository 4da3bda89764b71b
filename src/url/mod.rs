//! URL handling module for Sitegraph
//!
//! This module provides seed URL parsing, host comparison, and the link
//! normalization/filter policy that decides which links get crawled.

mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

pub use normalize::normalize_link;

/// Parses the root URL a crawl starts from
///
/// The seed is trusted to be crawlable: it only has to be an absolute HTTP(S)
/// URL with a host. Its fragment is dropped so it dedups against links that
/// point back at it.
///
/// # Examples
///
/// ```
/// use sitegraph::url::parse_seed;
///
/// let seed = parse_seed("http://localhost#top").unwrap();
/// assert_eq!(seed.as_str(), "http://localhost/");
/// assert!(parse_seed("localhost").is_err());
/// ```
pub fn parse_seed(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Returns true if both URLs name the same host and port
///
/// A scheme's default port counts as no port, so `http://host:80/` and
/// `https://host/` both match `http://host/`.
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str() && a.port() == b.port()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_accepts_http_and_https() {
        assert_eq!(
            parse_seed("http://localhost/").unwrap().as_str(),
            "http://localhost/"
        );
        assert_eq!(
            parse_seed("https://example.com/docs").unwrap().as_str(),
            "https://example.com/docs"
        );
    }

    #[test]
    fn test_parse_seed_strips_fragment() {
        let seed = parse_seed("https://example.com/docs#intro").unwrap();
        assert_eq!(seed.as_str(), "https://example.com/docs");
    }

    #[test]
    fn test_parse_seed_rejects_relative_url() {
        assert!(matches!(parse_seed("/next"), Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_parse_seed_rejects_other_schemes() {
        assert_eq!(
            parse_seed("ftp://example.com/"),
            Err(UrlError::UnsupportedScheme("ftp".to_string()))
        );
        assert!(parse_seed("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_same_host_compares_ports() {
        let a = Url::parse("http://localhost/a").unwrap();
        let b = Url::parse("http://localhost:80/b").unwrap();
        let c = Url::parse("http://localhost:8080/c").unwrap();
        let d = Url::parse("https://localhost/d").unwrap();

        assert!(same_host(&a, &b));
        assert!(!same_host(&a, &c));
        assert!(same_host(&a, &d));
    }
}
