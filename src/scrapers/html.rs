use super::{element_text, first_success, parse_selector, DescendantText, TextBeforeToken, TextStrategy};
use crate::price::{discount_pct, parse_price};
use crate::types::{Deal, Extraction, SiteProfile, SkipReason};
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Candidates with less text than this are layout fragments, not tiles.
const MIN_CANDIDATE_CHARS: usize = 15;
const MIN_NAME_CHARS: usize = 5;
const MAX_FALLBACK_NAME_CHARS: usize = 80;

/// Heuristic deal extractor for one store's rendered promotion page.
pub struct HtmlExtractor {
    store: String,
    candidates: Selector,
    currency_markers: Vec<String>,
    name_strategies: Vec<Box<dyn TextStrategy>>,
    regular_price_strategies: Vec<Box<dyn TextStrategy>>,
    link: Selector,
}

impl HtmlExtractor {
    /// Compile a profile's selector cascades. Fails on an unparsable selector.
    pub fn new(store: &str, profile: &SiteProfile) -> Result<Self> {
        let mut name_strategies: Vec<Box<dyn TextStrategy>> = Vec::new();
        for selector in &profile.name_selectors {
            name_strategies.push(Box::new(DescendantText::new(selector, MIN_NAME_CHARS)?));
        }
        name_strategies.push(Box::new(TextBeforeToken::new(
            &profile.name_cutoff,
            MAX_FALLBACK_NAME_CHARS,
        )));

        let mut regular_price_strategies: Vec<Box<dyn TextStrategy>> = Vec::new();
        for selector in &profile.regular_price_selectors {
            regular_price_strategies.push(Box::new(DescendantText::new(selector, 0)?));
        }

        Ok(Self {
            store: store.to_string(),
            candidates: parse_selector(&profile.candidate_tags.join(", "))?,
            currency_markers: profile
                .currency_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            name_strategies,
            regular_price_strategies,
            link: parse_selector("a")?,
        })
    }

    /// Extract every priced tile on the page. `page_url` is the fallback link.
    pub fn extract(&self, html: &str, page_url: &str) -> Extraction {
        let document = Html::parse_document(html);
        let mut extraction = Extraction::default();

        for element in document.select(&self.candidates) {
            let text = element_text(element);
            if !self.has_currency_marker(&text) {
                continue;
            }

            match self.extract_deal(element, &text, page_url) {
                Ok(deal) => extraction.deals.push(deal),
                Err(reason) => {
                    debug!(store = %self.store, %reason, "skipping candidate");
                    extraction.skipped.push(reason);
                }
            }
        }

        extraction
    }

    fn has_currency_marker(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.currency_markers.iter().any(|m| lower.contains(m.as_str()))
    }

    fn extract_deal(&self, element: ElementRef<'_>, text: &str, page_url: &str) -> Result<Deal, SkipReason> {
        if text.chars().count() < MIN_CANDIDATE_CHARS {
            return Err(SkipReason::TextTooShort { text: text.to_string() });
        }

        let price = match parse_price(text) {
            Some(p) if p > 0.0 => p,
            _ => return Err(SkipReason::NoPrice { text: text.to_string() }),
        };

        let product_name = first_success(&self.name_strategies, element, text)
            .ok_or_else(|| SkipReason::NoNameCandidate { line: text.to_string() })?;

        // The first old-price element found decides, even if it holds no number.
        let regular_price = first_success(&self.regular_price_strategies, element, text)
            .and_then(|t| parse_price(&t));

        Ok(Deal {
            store: self.store.clone(),
            product_name,
            price: Some(price),
            regular_price,
            discount_pct: discount_pct(Some(price), regular_price),
            url: self.deal_url(element, page_url),
        })
    }

    fn deal_url(&self, element: ElementRef<'_>, page_url: &str) -> String {
        element
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .filter(|href| href.starts_with("http"))
            .map(str::to_string)
            .unwrap_or_else(|| page_url.to_string())
    }
}
