use super::DocumentFetcher;
use crate::types::Settings;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

/// Plain blocking HTTP GET, used for flyer documents and the pages that link them.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; PromoWatch/1.0)")
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch_document(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Unexpected HTTP status from {}", url))?;

        let bytes = response
            .bytes()
            .with_context(|| format!("Failed to read body of {}", url))?;
        debug!(url, bytes = bytes.len(), "downloaded document");

        Ok(bytes.to_vec())
    }
}
