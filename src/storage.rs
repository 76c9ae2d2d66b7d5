use std::fs;
use std::path::PathBuf;
use anyhow::{Result, Context};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::types::{FlyerSource, Settings, SiteProfile, StoreConfig, StoresFile, WatchlistFile, WatchlistRule};

const WATCHLIST_FILE: &str = "Config/watchlist.yaml";
const STORES_FILE: &str = "Config/stores.yaml";
const SETTINGS_FILE: &str = "Config/settings.yaml";

/// Read a YAML file under `root`, or `None` if it does not exist.
fn load_optional_yaml<T: DeserializeOwned>(root: &str, relative: &str) -> Result<Option<T>> {
    let path = PathBuf::from(root).join(relative);

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {:?}", path))?;

    let value = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {:?}", path))?;

    Ok(Some(value))
}

pub fn load_watchlist(root: &str) -> Result<Vec<WatchlistRule>> {
    match load_optional_yaml::<WatchlistFile>(root, WATCHLIST_FILE)? {
        Some(file) => {
            info!(rules = file.rules.len(), "loaded watchlist from {}", WATCHLIST_FILE);
            Ok(file.rules)
        }
        None => Ok(default_watchlist()),
    }
}

pub fn load_stores(root: &str) -> Result<Vec<StoreConfig>> {
    match load_optional_yaml::<StoresFile>(root, STORES_FILE)? {
        Some(file) => {
            info!(stores = file.stores.len(), "loaded stores from {}", STORES_FILE);
            Ok(file.stores)
        }
        None => Ok(default_stores()),
    }
}

/// Settings file values, with `WEBDRIVER_URL` taking precedence.
pub fn load_settings(root: &str) -> Result<Settings> {
    let mut settings = load_optional_yaml::<Settings>(root, SETTINGS_FILE)?.unwrap_or_default();

    if let Ok(url) = std::env::var("WEBDRIVER_URL") {
        if !url.trim().is_empty() {
            settings.webdriver_url = url;
        }
    }

    Ok(settings)
}

pub fn default_watchlist() -> Vec<WatchlistRule> {
    vec![
        WatchlistRule::new("Молоко 3,2% 1л")
            .with_synonyms(&["mleko 3,2", "mleko 3.2% 1l", "milk 3.2% 1l"])
            .with_max_price(3.99),
        WatchlistRule::new("Лосось филе")
            .with_synonyms(&["łosoś", "losos", "salmon"])
            .with_min_discount(25.0),
    ]
}

pub fn default_stores() -> Vec<StoreConfig> {
    vec![
        StoreConfig {
            name: "Biedronka".to_string(),
            url: "https://www.biedronka.pl/pl/gazetki".to_string(),
            enabled: true,
            profile: SiteProfile::biedronka(),
            flyer: Some(FlyerSource {
                url: "https://www.biedronka.pl/pl/gazetki".to_string(),
                homepage: "https://www.biedronka.pl".to_string(),
                link_pattern: None,
            }),
        },
        StoreConfig {
            name: "Kaufland".to_string(),
            url: "https://sklep.kaufland.pl/oferta.html".to_string(),
            enabled: true,
            profile: SiteProfile::kaufland(),
            flyer: None,
        },
    ]
}
