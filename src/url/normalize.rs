use crate::url::same_host;
use crate::{UrlError, UrlResult};
use url::Url;

/// The parts of a raw link reference that the filter inspects before the
/// reference is resolved against its page.
///
/// Resolution removes dot segments, so the traversal and extension rules have
/// to look at the path exactly as it was written in the document.
#[derive(Debug, PartialEq, Eq)]
struct RawReference<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
}

impl<'a> RawReference<'a> {
    fn split(raw: &'a str) -> Self {
        let end = raw.find(['?', '#']).unwrap_or(raw.len());
        let mut rest = &raw[..end];

        let scheme = match rest.find(':') {
            Some(idx) if is_scheme(&rest[..idx]) => {
                let scheme = &rest[..idx];
                rest = &rest[idx + 1..];
                Some(scheme)
            }
            _ => None,
        };

        let authority = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find('/').unwrap_or(after.len());
                rest = &after[end..];
                Some(&after[..end])
            }
            None => None,
        };

        Self {
            scheme,
            authority,
            path: rest,
        }
    }

    /// A reference with neither scheme nor host is a path on the current host
    fn is_relative(&self) -> bool {
        self.scheme.is_none() && self.authority.is_none()
    }

    fn has_crawlable_path(&self) -> bool {
        !self.path.is_empty() && self.path != "/"
    }
}

/// Normalizes a link found on `origin` and decides whether it can be crawled
///
/// # Rules
///
/// Applied in order, the first one that matches decides:
///
/// 1. A link that cannot be parsed is rejected
/// 2. A path with a `..` segment is rejected
/// 3. A path whose last segment ends in a file extension (`.pdf`, `.jpg`) is rejected
/// 4. The fragment is always removed
/// 5. A relative link with a non-empty, non-root path is resolved against the
///    scheme and host of `origin` and accepted
/// 6. An absolute link on the same host as `origin` with a non-empty, non-root
///    path is accepted
/// 7. Anything else (other host, empty or root path) is rejected
///
/// Host confinement is checked against `origin`, the page the link was found
/// on, not against the seed of the crawl.
///
/// # Returns
///
/// * `Ok(Url)` - The absolute, fragment-free URL to crawl
/// * `Err(UrlError)` - The link is not crawlable; the variant names the rule
///
/// # Examples
///
/// ```
/// use sitegraph::url::normalize_link;
/// use url::Url;
///
/// let page = Url::parse("http://localhost/").unwrap();
/// let link = normalize_link(&page, "/terms#section").unwrap();
/// assert_eq!(link.as_str(), "http://localhost/terms");
///
/// assert!(normalize_link(&page, "/report.pdf").is_err());
/// assert!(normalize_link(&page, "http://otherlink.com/what").is_err());
/// ```
pub fn normalize_link(origin: &Url, raw: &str) -> UrlResult<Url> {
    let cleaned = clean_reference(raw.trim());
    let raw = cleaned.as_str();
    let reference = RawReference::split(raw);

    // Relative links hang off the host root, not the directory of the page
    let resolved = if reference.is_relative() {
        origin.join(&root_relative(raw))
    } else {
        origin.join(raw)
    };
    let mut url = resolved.map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if reference.path.split('/').any(is_parent_segment) {
        return Err(UrlError::ParentTraversal(raw.to_string()));
    }

    if has_file_extension(reference.path) {
        return Err(UrlError::FileExtension(raw.to_string()));
    }

    url.set_fragment(None);

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if reference.is_relative() {
        return if reference.has_crawlable_path() {
            Ok(url)
        } else {
            Err(UrlError::EmptyPath)
        };
    }

    if reference.authority.is_none() {
        return Err(UrlError::MissingHost);
    }

    if !same_host(origin, &url) {
        return Err(UrlError::CrossHost {
            expected: origin.host_str().unwrap_or_default().to_string(),
            found: url.host_str().unwrap_or_default().to_string(),
        });
    }

    if !reference.has_crawlable_path() {
        return Err(UrlError::EmptyPath);
    }

    Ok(url)
}

/// Rewrites a reference the way the URL parser will read it
///
/// Tabs and newlines are dropped anywhere in the reference, and backslashes in
/// the scheme/authority/path part of an http(s) or relative reference become
/// slashes. The filter rules must see the path that actually gets requested.
fn clean_reference(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '\t' | '\n' | '\r')).collect();

    let path_end = stripped.find(['?', '#']).unwrap_or(stripped.len());
    let maps_backslash = match stripped[..path_end].find(':') {
        Some(idx) if is_scheme(&stripped[..idx]) => {
            let scheme = stripped[..idx].to_ascii_lowercase();
            scheme == "http" || scheme == "https"
        }
        _ => true,
    };

    if !maps_backslash {
        return stripped;
    }

    let (path, rest) = stripped.split_at(path_end);
    format!("{}{}", path.replace('\\', "/"), rest)
}

fn root_relative(raw: &str) -> String {
    if raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw)
    }
}

/// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-` or `.`
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Matches `..` in any of the spellings a URL parser will treat as a parent
/// directory
fn is_parent_segment(segment: &str) -> bool {
    let lower = segment.to_ascii_lowercase();
    matches!(lower.as_str(), ".." | ".%2e" | "%2e." | "%2e%2e")
}

/// True when the last path segment ends in a dot followed by alphanumerics
///
/// An escaped dot (`%2E`) counts as a dot.
fn has_file_extension(path: &str) -> bool {
    let last_segment = path
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
        .replace("%2e", ".");
    match last_segment.rfind('.') {
        Some(idx) => {
            let extension = &last_segment[idx + 1..];
            !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}
