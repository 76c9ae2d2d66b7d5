use crate::normalize::normalize_text;
use crate::types::{Deal, WatchlistRule};

/// Normalized forms of a rule's canonical name and synonyms.
fn rule_terms(rule: &WatchlistRule) -> Vec<String> {
    std::iter::once(&rule.canonical)
        .chain(rule.synonyms.iter())
        .map(|term| normalize_text(term))
        .filter(|term| !term.is_empty())
        .collect()
}

/// Whether a single rule accepts the deal.
///
/// Name must contain one of the rule's terms; then the first applicable
/// threshold decides. A rule without thresholds matches on name alone.
pub fn rule_matches(deal: &Deal, rule: &WatchlistRule) -> bool {
    let name = normalize_text(&deal.product_name);
    if !rule_terms(rule).iter().any(|term| name.contains(term.as_str())) {
        return false;
    }

    if let (Some(max_price), Some(price)) = (rule.max_price, deal.price) {
        if price <= max_price {
            return true;
        }
    }

    if let (Some(min_discount), Some(discount)) = (rule.min_discount_pct, deal.discount_pct) {
        if discount >= min_discount {
            return true;
        }
    }

    rule.max_price.is_none() && rule.min_discount_pct.is_none()
}

/// A deal matches the watchlist when any rule accepts it.
pub fn matches_watchlist(deal: &Deal, rules: &[WatchlistRule]) -> bool {
    rules.iter().any(|rule| rule_matches(deal, rule))
}

/// Keep only the deals the watchlist accepts, in input order.
pub fn filter_deals(deals: &[Deal], rules: &[WatchlistRule]) -> Vec<Deal> {
    deals
        .iter()
        .filter(|deal| matches_watchlist(deal, rules))
        .cloned()
        .collect()
}
