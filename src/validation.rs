//! Configuration checks run before a scrape.

use crate::scrapers::html::HtmlExtractor;
use crate::types::{StoreConfig, WatchlistRule};
use regex::Regex;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

pub fn validate_config(stores: &[StoreConfig], rules: &[WatchlistRule]) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut names = HashSet::new();
    for store in stores {
        if store.name.trim().is_empty() {
            report.errors.push(format!("Store with URL {} has empty name", store.url));
        } else if !names.insert(store.name.to_lowercase()) {
            report.warnings.push(format!("Store '{}' is configured more than once", store.name));
        }

        if !store.url.starts_with("http://") && !store.url.starts_with("https://") {
            report.errors.push(format!(
                "Store '{}' has URL without http/https scheme: {}",
                store.name, store.url
            ));
        }

        if let Err(e) = HtmlExtractor::new(&store.name, &store.profile) {
            report.errors.push(format!("Store '{}' has a bad selector: {:#}", store.name, e));
        }

        if store.profile.currency_markers.is_empty() {
            report.errors.push(format!(
                "Store '{}' has no currency markers; no candidate would ever match",
                store.name
            ));
        }

        if let Some(flyer) = &store.flyer {
            if let Some(pattern) = &flyer.link_pattern {
                if let Err(e) = Regex::new(pattern) {
                    report.errors.push(format!(
                        "Store '{}' has an invalid flyer link pattern: {}",
                        store.name, e
                    ));
                }
            }
            if url::Url::parse(&flyer.url).is_err() {
                report.errors.push(format!("Store '{}' has an invalid flyer URL: {}", store.name, flyer.url));
            }
        }

        if !store.enabled {
            report.warnings.push(format!("Store '{}' is disabled", store.name));
        }
    }

    for rule in rules {
        if rule.canonical.trim().is_empty() {
            report.errors.push("Watchlist rule has empty canonical name".to_string());
        }

        if rule.max_price.is_some_and(|p| p < 0.0) {
            report.errors.push(format!("Rule '{}' has a negative max_price", rule.canonical));
        }

        if rule.min_discount_pct.is_some_and(|d| !(0.0..=100.0).contains(&d)) {
            report.errors.push(format!(
                "Rule '{}' has min_discount_pct outside 0..=100",
                rule.canonical
            ));
        }

        if rule.max_price.is_none() && rule.min_discount_pct.is_none() {
            report.warnings.push(format!(
                "Rule '{}' has no threshold and will match on name alone",
                rule.canonical
            ));
        }
    }

    if rules.is_empty() {
        report.warnings.push("Watchlist is empty; nothing will ever be reported".to_string());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{default_stores, default_watchlist};

    #[test]
    fn test_defaults_are_valid() {
        let report = validate_config(&default_stores(), &default_watchlist());
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_bad_store_and_rule() {
        let mut stores = default_stores();
        stores[0].url = "www.biedronka.pl".to_string();
        stores[1].profile.regular_price_selectors.push(".price[".to_string());

        let rules = vec![
            WatchlistRule::new(" ").with_max_price(-1.0),
            WatchlistRule::new("ser").with_min_discount(150.0),
        ];

        let report = validate_config(&stores, &rules);

        assert_eq!(report.errors.len(), 5, "{:?}", report.errors);
    }

    #[test]
    fn test_name_only_rule_is_a_warning() {
        let report = validate_config(&[], &[WatchlistRule::new("kawa")]);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }
}
