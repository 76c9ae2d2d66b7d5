//! Text normalization and deal deduplication
//!
//! Every containment check in the pipeline runs on normalized text, so
//! matching ignores case and whitespace layout.

use crate::types::Deal;
use std::collections::HashSet;

/// Collapse whitespace runs to one space, trim, lower-case.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Deduplication key: normalized product name plus the exact price.
fn dedup_key(deal: &Deal) -> (String, Option<u64>) {
    (normalize_text(&deal.product_name), deal.price.map(f64::to_bits))
}

/// Deduplication result with statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeduplicationStats {
    pub total_input: usize,
    pub unique_output: usize,
    pub duplicates_removed: usize,
}

/// Drop later deals sharing a (normalized name, price) key with an earlier one.
pub fn dedup_deals(deals: Vec<Deal>) -> Vec<Deal> {
    dedup_deals_with_stats(deals).0
}

/// Deduplicate deals and return statistics. First occurrence wins, order is kept.
pub fn dedup_deals_with_stats(deals: Vec<Deal>) -> (Vec<Deal>, DeduplicationStats) {
    let total_input = deals.len();
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(deals.len());

    for deal in deals {
        if seen.insert(dedup_key(&deal)) {
            unique.push(deal);
        }
    }

    let stats = DeduplicationStats {
        total_input,
        unique_output: unique.len(),
        duplicates_removed: total_input - unique.len(),
    };

    (unique, stats)
}
