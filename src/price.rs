//! Price parsing for noisy promotional text.
//!
//! Only prices with a fractional part are recognised (`12,50`, `3.99`).
//! Integer-only amounts such as `5 zł` do not match; flyers and shop tiles
//! in practice always print the grosze.

use regex::Regex;
use std::sync::LazyLock;

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+[.,]\d+)").expect("price pattern is valid"));

const CURRENCY_TOKEN: &str = "zł";

/// Extract the first `digits[.,]digits` amount from `text`.
pub fn parse_price(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let cleaned = text
        .replace('\u{a0}', " ")
        .replace(CURRENCY_TOKEN, "")
        .to_lowercase();

    let found = PRICE_RE.captures(&cleaned)?.get(1)?;
    found.as_str().replace(',', ".").parse::<f64>().ok()
}

/// Discount in percent, rounded to one decimal place.
///
/// Only defined when both prices are known and the regular price is positive.
pub fn discount_pct(price: Option<f64>, regular_price: Option<f64>) -> Option<f64> {
    match (price, regular_price) {
        (Some(price), Some(regular)) if regular > 0.0 => {
            Some(round1(100.0 * (1.0 - price / regular)))
        }
        _ => None,
    }
}

/// Ties round away from zero (`f64::round`), not half-to-even.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
