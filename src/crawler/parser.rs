//! HTML tokenizer and link extractor
//!
//! This module handles scanning fetched documents for links:
//! - The `Tokenizer` capability turns raw bytes into a stream of start tags
//! - `HtmlTokenizer` is the default, html5ever-backed implementation
//! - `extract_links` picks anchor `href`s out of the stream and filters them

use crate::url::normalize_link;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Default cap on the size of a document handed to the tokenizer
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Tokenizer failures other than the normal end of the stream
#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("Document is {size} bytes, limit is {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Link extraction failed for a page
#[derive(Debug, Error)]
#[error("Failed to extract links from {url}: {source}")]
pub struct ExtractionError {
    /// The page being scanned
    pub url: String,

    #[source]
    pub source: TokenizeError,
}

/// A start tag with its attributes, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lowercase tag name
    pub name: String,

    /// Attribute name/value pairs as written
    pub attributes: Vec<(String, String)>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Values of every attribute called `key`
    pub fn attribute_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_anchor(&self) -> bool {
        self.name.eq_ignore_ascii_case("a")
    }
}

/// Stream of tags; running out of items is the end-of-stream marker
pub type TagStream = Box<dyn Iterator<Item = Result<Tag, TokenizeError>>>;

/// Turns a document into a stream of start tags
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, body: &[u8]) -> TagStream;
}

/// Tokenizer backed by `scraper`'s html5ever parser
///
/// Bytes are decoded as UTF-8, with invalid sequences replaced, so the only
/// failure is a document larger than the configured limit.
#[derive(Debug, Clone)]
pub struct HtmlTokenizer {
    max_document_bytes: usize,
}

impl HtmlTokenizer {
    pub fn new(max_document_bytes: usize) -> Self {
        Self { max_document_bytes }
    }
}

impl Default for HtmlTokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENT_BYTES)
    }
}

impl Tokenizer for HtmlTokenizer {
    fn tokenize(&self, body: &[u8]) -> TagStream {
        if body.len() > self.max_document_bytes {
            return Box::new(std::iter::once(Err(TokenizeError::DocumentTooLarge {
                size: body.len(),
                limit: self.max_document_bytes,
            })));
        }

        let text = String::from_utf8_lossy(body);
        let document = Html::parse_document(&text);

        let tags: Vec<_> = document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(|element| {
                let element = element.value();
                Ok(Tag {
                    name: element.name().to_string(),
                    attributes: element
                        .attrs()
                        .map(|(key, value)| (key.to_string(), value.to_string()))
                        .collect(),
                })
            })
            .collect();

        Box::new(tags.into_iter())
    }
}

/// Extracts the crawlable links of one page
///
/// Every anchor `href` goes through [`normalize_link`]; accepted links are
/// kept in the order they first appear, each at most once.
///
/// # Arguments
///
/// * `tokenizer` - The tokenizer to scan `body` with
/// * `origin` - The page the document was fetched from
/// * `body` - The raw document
///
/// # Returns
///
/// * `Ok(Vec<Url>)` - Crawlable links in first-seen order
/// * `Err(ExtractionError)` - The tokenizer failed before the end of the document
pub fn extract_links(
    tokenizer: &dyn Tokenizer,
    origin: &Url,
    body: &[u8],
) -> Result<Vec<Url>, ExtractionError> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    for token in tokenizer.tokenize(body) {
        let tag = token.map_err(|source| ExtractionError {
            url: origin.to_string(),
            source,
        })?;

        if !tag.is_anchor() {
            continue;
        }

        for href in tag.attribute_values("href") {
            match normalize_link(origin, href) {
                Ok(link) => {
                    if seen.insert(link.as_str().to_string()) {
                        links.push(link);
                    }
                }
                Err(e) => {
                    tracing::debug!("Skipping link {:?} on {}: {}", href, origin, e);
                }
            }
        }
    }

    Ok(links)
}
