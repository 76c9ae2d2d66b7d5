//! Run orchestration
//!
//! Stores are processed one at a time. Whatever goes wrong inside a store
//! (fetch, markup, OCR) is logged and recorded in its [`StoreOutcome`]; the
//! store then contributes no deals and the run moves on.

use crate::filter::filter_deals;
use crate::normalize::dedup_deals_with_stats;
use crate::notify::{format_message, Notifier};
use crate::scrapers::flyer::{find_flyer_link, is_document_url, FlyerReader};
use crate::scrapers::html::HtmlExtractor;
use crate::scrapers::ocr::extract_deals_from_ocr_text;
use crate::scrapers::{DocumentFetcher, PageFetcher};
use crate::types::{
    Deal, Extraction, FlyerSource, RunReport, StoreConfig, StoreOutcome, StoreStatus, WatchlistRule,
};
use anyhow::{anyhow, Context};
use chrono::Utc;
use tracing::{info, warn};

/// External services a run depends on.
pub struct Collaborators<'a> {
    pub pages: &'a dyn PageFetcher,
    pub documents: &'a dyn DocumentFetcher,
    pub flyers: &'a dyn FlyerReader,
    pub notifier: &'a dyn Notifier,
}

/// A failed stage, classified for the store outcome.
struct StageError {
    status: StoreStatus,
    error: anyhow::Error,
}

impl StageError {
    fn new(status: StoreStatus, error: anyhow::Error) -> Self {
        Self { status, error }
    }
}

/// Fetch, extract, dedup, match, format and notify. Never fails as a whole.
pub fn run(stores: &[StoreConfig], rules: &[WatchlistRule], collab: &Collaborators<'_>) -> RunReport {
    let started_at = Utc::now();
    let mut outcomes = Vec::new();
    let mut deals = Vec::new();

    for store in stores.iter().filter(|s| s.enabled) {
        info!(store = %store.name, url = %store.url, "checking store");
        let (store_deals, outcome) = process_store(store, collab);

        match &outcome.error_message {
            Some(error) => warn!(store = %store.name, status = %outcome.status, %error, "store failed"),
            None => info!(
                store = %store.name,
                status = %outcome.status,
                deals = outcome.deals_found,
                skipped = outcome.skipped,
                flyer = outcome.used_flyer,
                "store done"
            ),
        }

        deals.extend(store_deals);
        outcomes.push(outcome);
    }

    let matched = filter_deals(&deals, rules);
    let message = format_message(&matched);

    let notification = match collab.notifier.send(&message) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            warn!("Notification failed: {:#}", e);
            None
        }
    };

    let report = RunReport {
        started_at,
        stores: outcomes,
        deals,
        matched,
        message,
        notification,
    };

    info!(
        started_at = %report.started_at.to_rfc3339(),
        stores = report.stores.len(),
        failed = report.failed_stores(),
        deals = report.deals.len(),
        matched = report.matched.len(),
        "run complete"
    );

    report
}

fn process_store(store: &StoreConfig, collab: &Collaborators<'_>) -> (Vec<Deal>, StoreOutcome) {
    let mut used_flyer = false;

    let mut result = extract_from_page(store, collab);

    let page_found_nothing = match &result {
        Ok(extraction) => extraction.deals.is_empty(),
        Err(_) => true,
    };

    if page_found_nothing {
        if let Some(flyer) = &store.flyer {
            if let Err(e) = &result {
                warn!(store = %store.name, error = %format!("{:#}", e.error), "page extraction failed; trying flyer");
            }
            match extract_from_flyer(store, flyer, collab) {
                Ok(Some(extraction)) => {
                    used_flyer = true;
                    if !extraction.deals.is_empty() || result.is_ok() {
                        result = Ok(extraction);
                    }
                }
                Ok(None) => info!(store = %store.name, "no flyer document found"),
                Err(e) => result = Err(e),
            }
        }
    }

    match result {
        Ok(extraction) => {
            let skipped = extraction.skipped.len();
            let (deals, stats) = dedup_deals_with_stats(extraction.deals);
            if stats.duplicates_removed > 0 {
                info!(store = %store.name, removed = stats.duplicates_removed, "dropped duplicate deals");
            }
            let status = if deals.is_empty() { StoreStatus::Empty } else { StoreStatus::Ok };
            let outcome = StoreOutcome {
                store: store.name.clone(),
                status,
                deals_found: deals.len(),
                skipped,
                used_flyer,
                error_message: None,
            };
            (deals, outcome)
        }
        Err(e) => {
            let outcome = StoreOutcome {
                store: store.name.clone(),
                status: e.status,
                deals_found: 0,
                skipped: 0,
                used_flyer,
                error_message: Some(format!("{:#}", e.error)),
            };
            (vec![], outcome)
        }
    }
}

fn extract_from_page(store: &StoreConfig, collab: &Collaborators<'_>) -> Result<Extraction, StageError> {
    let html = collab
        .pages
        .fetch_page(&store.url)
        .with_context(|| format!("Failed to load {}", store.url))
        .map_err(|e| StageError::new(StoreStatus::FetchFailed, e))?;

    let extractor = HtmlExtractor::new(&store.name, &store.profile)
        .map_err(|e| StageError::new(StoreStatus::ExtractFailed, e))?;

    Ok(extractor.extract(&html, &store.url))
}

/// `Ok(None)` when the intermediate page links no flyer.
fn extract_from_flyer(
    store: &StoreConfig,
    flyer: &FlyerSource,
    collab: &Collaborators<'_>,
) -> Result<Option<Extraction>, StageError> {
    let document_url = if is_document_url(&flyer.url) {
        flyer.url.clone()
    } else {
        let page = collab
            .documents
            .fetch_document(&flyer.url)
            .map_err(|e| StageError::new(StoreStatus::FetchFailed, e))?;
        let html = String::from_utf8_lossy(&page);

        match find_flyer_link(&flyer.url, &html, flyer.link_pattern.as_deref())
            .map_err(|e| StageError::new(StoreStatus::ExtractFailed, e))?
        {
            Some(link) => link,
            None => return Ok(None),
        }
    };

    info!(store = %store.name, document = %document_url, "reading flyer");

    let document = collab
        .documents
        .fetch_document(&document_url)
        .map_err(|e| StageError::new(StoreStatus::FetchFailed, e))?;

    let pages = collab
        .flyers
        .read_pages(&document)
        .map_err(|e| StageError::new(StoreStatus::OcrFailed, e))?;

    if pages.is_empty() {
        return Err(StageError::new(
            StoreStatus::OcrFailed,
            anyhow!("no text recognized in {}", document_url),
        ));
    }

    let mut extraction = Extraction::default();
    for page in &pages {
        let page_extraction = extract_deals_from_ocr_text(page, &store.name, &flyer.homepage);
        extraction.deals.extend(page_extraction.deals);
        extraction.skipped.extend(page_extraction.skipped);
    }

    Ok(Some(extraction))
}
