use anyhow::{Context, Result};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use promo_watch::notify::TelegramNotifier;
use promo_watch::runner::{self, Collaborators};
use promo_watch::scrapers::flyer::TesseractFlyerReader;
use promo_watch::scrapers::http::HttpFetcher;
use promo_watch::scrapers::selenium::BrowserFetcher;
use promo_watch::storage;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let root = std::env::var("ROOT").unwrap_or_else(|_| ".".to_string());

    let settings = storage::load_settings(&root)?;
    let rules = storage::load_watchlist(&root)?;
    let stores = storage::load_stores(&root)?;

    let pages = BrowserFetcher::new(&settings);
    let documents = HttpFetcher::new(&settings)?;
    let flyers = TesseractFlyerReader::new(&settings);
    let notifier = TelegramNotifier::from_env(Duration::from_secs(settings.http_timeout_secs))
        .context("Failed to set up Telegram notifier")?;

    let collaborators = Collaborators {
        pages: &pages,
        documents: &documents,
        flyers: &flyers,
        notifier: &notifier,
    };

    let report = runner::run(&stores, &rules, &collaborators);

    if report.matched.is_empty() {
        println!("No watchlisted deals found.");
    } else {
        println!("{}", report.message);
    }

    Ok(())
}
