use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One extracted product/price/discount record from a retailer page or flyer.
#[derive(Debug, Clone, PartialEq)]
pub struct Deal {
    pub store: String,
    pub product_name: String,
    pub price: Option<f64>,
    pub regular_price: Option<f64>,
    pub discount_pct: Option<f64>,
    pub url: String,
}

/// A watchlist entry: name match plus optional price/discount threshold.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WatchlistRule {
    pub canonical: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_discount_pct: Option<f64>,
}

impl WatchlistRule {
    pub fn new(canonical: &str) -> Self {
        Self {
            canonical: canonical.to_string(),
            synonyms: vec![],
            max_price: None,
            min_discount_pct: None,
        }
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    pub fn with_min_discount(mut self, min_discount_pct: f64) -> Self {
        self.min_discount_pct = Some(min_discount_pct);
        self
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WatchlistFile {
    pub rules: Vec<WatchlistRule>,
}

/// Site-specific selector cascades used by the HTML extractor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SiteProfile {
    /// Container tags considered as deal candidates.
    #[serde(default = "default_candidate_tags")]
    pub candidate_tags: Vec<String>,
    /// Lower-cased substrings, any of which marks a candidate as priced.
    pub currency_markers: Vec<String>,
    /// Tried in order; the first descendant with a long enough text names the deal.
    pub name_selectors: Vec<String>,
    /// Tried in order; the first descendant found holds the pre-discount price.
    pub regular_price_selectors: Vec<String>,
    /// Candidate text before this token is the fallback name.
    #[serde(default = "default_name_cutoff")]
    pub name_cutoff: String,
}

fn default_candidate_tags() -> Vec<String> {
    vec!["div".to_string(), "li".to_string(), "article".to_string()]
}

fn default_name_cutoff() -> String {
    " zł".to_string()
}

impl SiteProfile {
    pub fn biedronka() -> Self {
        Self {
            candidate_tags: default_candidate_tags(),
            currency_markers: vec!["zł".to_string(), "zl".to_string()],
            name_selectors: ["strong", "b", "h3", "h4", "h5"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            regular_price_selectors: ["old", "regular", "strike", "przekreslone"]
                .iter()
                .map(|frag| format!("span[class*='{frag}'], div[class*='{frag}']"))
                .collect(),
            name_cutoff: default_name_cutoff(),
        }
    }

    pub fn kaufland() -> Self {
        Self {
            candidate_tags: default_candidate_tags(),
            currency_markers: vec!["zł".to_string()],
            name_selectors: ["h3", "h4", ".product__title", ".tile__title", "strong", "b"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            regular_price_selectors: [".old-price", ".price--old", ".regular-price", ".price__striked"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            name_cutoff: default_name_cutoff(),
        }
    }
}

/// Where a store's scanned flyer can be found when its markup yields nothing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlyerSource {
    /// Page (or direct document link) that leads to the flyer.
    pub url: String,
    /// Link attached to every deal read from the flyer.
    pub homepage: String,
    /// Regex for the flyer link on an intermediate page; defaults to any `.pdf` href.
    #[serde(default)]
    pub link_pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StoreConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub profile: SiteProfile,
    #[serde(default)]
    pub flyer: Option<FlyerSource>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub webdriver_url: String,
    pub page_load_timeout_secs: u64,
    pub settle_wait_secs: u64,
    pub http_timeout_secs: u64,
    pub ocr_language: String,
    pub ocr_dpi: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            page_load_timeout_secs: 60,
            settle_wait_secs: 2,
            http_timeout_secs: 30,
            ocr_language: "pol+eng".to_string(),
            ocr_dpi: 200,
        }
    }
}

/// Why an extractor dropped a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    TextTooShort { text: String },
    NoPrice { text: String },
    NoNameCandidate { line: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TextTooShort { text } => write!(f, "text too short: {:?}", text),
            SkipReason::NoPrice { text } => write!(f, "no price: {:?}", text),
            SkipReason::NoNameCandidate { line } => write!(f, "no name next to price line: {:?}", line),
        }
    }
}

/// Result of one extraction pass: the deals found plus what was skipped.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub deals: Vec<Deal>,
    pub skipped: Vec<SkipReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Ok,
    Empty,
    FetchFailed,
    ExtractFailed,
    OcrFailed,
}

impl fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreStatus::Ok => write!(f, "OK"),
            StoreStatus::Empty => write!(f, "EMPTY"),
            StoreStatus::FetchFailed => write!(f, "FETCH_FAILED"),
            StoreStatus::ExtractFailed => write!(f, "EXTRACT_FAILED"),
            StoreStatus::OcrFailed => write!(f, "OCR_FAILED"),
        }
    }
}

/// Per-store result of a run.
#[derive(Debug, Clone)]
pub struct StoreOutcome {
    pub store: String,
    pub status: StoreStatus,
    pub deals_found: usize,
    pub skipped: usize,
    pub used_flyer: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent { status: u16 },
    Skipped,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub stores: Vec<StoreOutcome>,
    pub deals: Vec<Deal>,
    pub matched: Vec<Deal>,
    pub message: String,
    /// `None` when delivery failed; the failure is logged, not raised.
    pub notification: Option<SendOutcome>,
}

impl RunReport {
    pub fn failed_stores(&self) -> usize {
        self.stores
            .iter()
            .filter(|s| !matches!(s.status, StoreStatus::Ok | StoreStatus::Empty))
            .count()
    }
}
