//! Page/document fetching and deal extraction
//!
//! Fetching is behind the [`PageFetcher`] and [`DocumentFetcher`] traits so the
//! runner can be driven by stubs in tests. Field lookups inside a candidate
//! element go through ordered [`TextStrategy`] cascades.

pub mod flyer;
pub mod html;
pub mod http;
pub mod ocr;
pub mod selenium;

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Selector};
use tracing::debug;

/// Returns fully rendered markup for a URL.
pub trait PageFetcher {
    fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Returns the raw bytes behind a URL; non-2xx responses are errors.
pub trait DocumentFetcher {
    fn fetch_document(&self, url: &str) -> Result<Vec<u8>>;
}

/// One way of pulling a text field out of a candidate element.
pub trait TextStrategy {
    fn describe(&self) -> String;

    /// `text` is the candidate's own flattened text.
    fn extract(&self, element: ElementRef<'_>, text: &str) -> Option<String>;
}

/// Try strategies in order, returning the first result.
pub fn first_success(
    strategies: &[Box<dyn TextStrategy>],
    element: ElementRef<'_>,
    text: &str,
) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        let found = strategy.extract(element, text)?;
        debug!(strategy = %strategy.describe(), value = %found, "strategy matched");
        Some(found)
    })
}

/// Text of the first descendant matching a selector, if long enough.
pub struct DescendantText {
    source: String,
    selector: Selector,
    min_chars: usize,
}

impl DescendantText {
    pub fn new(selector: &str, min_chars: usize) -> Result<Self> {
        Ok(Self {
            source: selector.to_string(),
            selector: parse_selector(selector)?,
            min_chars,
        })
    }
}

impl TextStrategy for DescendantText {
    fn describe(&self) -> String {
        format!("descendant `{}`", self.source)
    }

    fn extract(&self, element: ElementRef<'_>, _text: &str) -> Option<String> {
        let found = element.select(&self.selector).next()?;
        let text = element_text(found);
        (text.chars().count() >= self.min_chars).then_some(text)
    }
}

/// The candidate's text up to a cut-off token, truncated.
pub struct TextBeforeToken {
    token: String,
    max_chars: usize,
}

impl TextBeforeToken {
    pub fn new(token: &str, max_chars: usize) -> Self {
        Self {
            token: token.to_string(),
            max_chars,
        }
    }
}

impl TextStrategy for TextBeforeToken {
    fn describe(&self) -> String {
        format!("text before {:?}", self.token)
    }

    fn extract(&self, _element: ElementRef<'_>, text: &str) -> Option<String> {
        let head = match text.find(&self.token) {
            Some(pos) => &text[..pos],
            None => text,
        };
        let name: String = head.chars().take(self.max_chars).collect();
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Flattened element text: trimmed text nodes joined by single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid selector {:?}: {:?}", selector, e))
}
