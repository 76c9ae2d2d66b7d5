//! Config Validation Binary
//!
//! Checks Config/stores.yaml, Config/watchlist.yaml and Config/settings.yaml
//! (or the built-in defaults) before a scrape is scheduled.

use anyhow::{Context, Result};
use promo_watch::storage::{load_settings, load_stores, load_watchlist};
use promo_watch::validation::validate_config;

fn main() -> Result<()> {
    let root = std::env::var("ROOT").unwrap_or_else(|_| ".".to_string());

    println!("=== PromoWatch Configuration Validator ===");

    let stores = load_stores(&root).context("Failed to load store configuration")?;
    let rules = load_watchlist(&root).context("Failed to load watchlist")?;
    let settings = load_settings(&root).context("Failed to load settings")?;

    println!("WebDriver: {}", settings.webdriver_url);
    println!("OCR language: {} @ {} dpi", settings.ocr_language, settings.ocr_dpi);

    let report = validate_config(&stores, &rules);

    if report.is_clean() {
        println!("✓ {} stores and {} watchlist rules are valid", stores.len(), rules.len());
        return Ok(());
    }

    if !report.errors.is_empty() {
        println!("\n❌ ERRORS (must fix):");
        for error in &report.errors {
            println!("  - {}", error);
        }
    }

    if !report.warnings.is_empty() {
        println!("\n⚠️  WARNINGS:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    if !report.errors.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
