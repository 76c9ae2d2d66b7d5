use promo_watch::filter::matches_watchlist;
use promo_watch::normalize::{dedup_deals, normalize_text};
use promo_watch::price::{discount_pct, parse_price};
use promo_watch::types::{Deal, WatchlistRule};
use proptest::prelude::*;
use std::collections::HashSet;

fn deal(name: String, price: Option<f64>) -> Deal {
    Deal {
        store: "Test".to_string(),
        product_name: name,
        price,
        regular_price: None,
        discount_pct: None,
        url: "https://example.com".to_string(),
    }
}

proptest! {
    #[test]
    fn test_normalize_is_idempotent(s in "\\PC{0,40}") {
        let once = normalize_text(&s);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_parse_price_reads_first_decimal(
        prefix in "[a-zA-Zżółćęśąźń ]{0,20}",
        whole in 0u32..10000,
        frac in 0u32..100,
        comma in any::<bool>(),
    ) {
        let sep = if comma { ',' } else { '.' };
        let text = format!("{} {}{}{:02} zł", prefix, whole, sep, frac);
        let expected: f64 = format!("{}.{:02}", whole, frac).parse().unwrap();
        prop_assert_eq!(parse_price(&text), Some(expected));
    }

    #[test]
    fn test_dedup_output_is_unique_and_ordered(
        entries in prop::collection::vec(("[a-c]{1,2}( [A-C])?", prop::option::of(0u8..4)), 0..30),
    ) {
        let deals: Vec<Deal> = entries
            .iter()
            .map(|(name, price)| deal(name.clone(), price.map(|p| p as f64 + 0.99)))
            .collect();

        let out = dedup_deals(deals.clone());

        let keys: Vec<_> = out
            .iter()
            .map(|d| (normalize_text(&d.product_name), d.price.map(f64::to_bits)))
            .collect();
        let unique: HashSet<_> = keys.iter().cloned().collect();
        prop_assert_eq!(unique.len(), keys.len());

        // Output is exactly the first occurrence of each key, in input order.
        let mut seen = HashSet::new();
        let expected: Vec<Deal> = deals
            .into_iter()
            .filter(|d| seen.insert((normalize_text(&d.product_name), d.price.map(f64::to_bits))))
            .collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn test_discount_bounds(price in 0.01f64..1000.0, regular in 0.01f64..1000.0) {
        let pct = discount_pct(Some(price), Some(regular)).unwrap();
        prop_assert!(pct <= 100.0);
        prop_assert_eq!(pct, ((100.0 * (1.0 - price / regular)) * 10.0).round() / 10.0);
    }

    #[test]
    fn test_name_only_rule_ignores_price(name in "[a-z]{3,10}", price in prop::option::of(0.0f64..100.0)) {
        let rules = vec![WatchlistRule::new(&name.to_uppercase())];
        let d = deal(format!("Promo {} pack", name), price);
        prop_assert!(matches_watchlist(&d, &rules));
    }
}
