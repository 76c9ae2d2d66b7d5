//! Deal extraction from OCR output of scanned flyers.
//!
//! Flyer pages come back as loosely ordered text lines. A price line is
//! paired with its neighbour above or below; strikethrough prices are not
//! recoverable from OCR text, so regular price and discount stay empty.

use crate::price::parse_price;
use crate::types::{Deal, Extraction, SkipReason};
use tracing::debug;

const MIN_NAME_CHARS: usize = 4;
const CURRENCY_TOKENS: [&str; 3] = ["zł", "zl", "pln"];

/// Nothing but digits, punctuation and currency: `2,99 zł`, `12,99`, `-30%`.
fn is_price_shaped(line: &str) -> bool {
    let mut rest = line.to_lowercase();
    for token in CURRENCY_TOKENS {
        rest = rest.replace(token, " ");
    }
    !rest.chars().any(char::is_alphabetic)
}

/// A neighbour line can name a product if it is long enough and not price-shaped.
/// Decimals inside a name (`Mleko 3,2% 1l`) are allowed.
fn is_name_candidate(line: &str) -> bool {
    line.chars().count() >= MIN_NAME_CHARS && !is_price_shaped(line)
}

/// Pair every priced line with the nearest usable name line.
pub fn extract_deals_from_ocr_text(text: &str, store: &str, homepage: &str) -> Extraction {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut extraction = Extraction::default();

    for (i, line) in lines.iter().enumerate() {
        let Some(price) = parse_price(line) else {
            continue;
        };

        let before = i.checked_sub(1).and_then(|j| lines.get(j));
        let after = lines.get(i + 1);

        let name = [before, after]
            .into_iter()
            .flatten()
            .find(|candidate| is_name_candidate(candidate));

        match name {
            Some(name) => extraction.deals.push(Deal {
                store: store.to_string(),
                product_name: name.to_string(),
                price: Some(price),
                regular_price: None,
                discount_pct: None,
                url: homepage.to_string(),
            }),
            None => {
                let reason = SkipReason::NoNameCandidate { line: line.to_string() };
                debug!(store, %reason, "skipping OCR line");
                extraction.skipped.push(reason);
            }
        }
    }

    extraction
}
