use super::PageFetcher;
use crate::types::Settings;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use thirtyfour::prelude::*;
use tracing::{debug, warn};

/// Renders pages in headless Chrome through a running ChromeDriver.
pub struct BrowserFetcher {
    webdriver_url: String,
    page_load_timeout: Duration,
    settle_wait: Duration,
}

impl BrowserFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            webdriver_url: settings.webdriver_url.clone(),
            page_load_timeout: Duration::from_secs(settings.page_load_timeout_secs),
            settle_wait: Duration::from_secs(settings.settle_wait_secs),
        }
    }

    async fn render(&self, url: &str) -> Result<String> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_chrome_option(
            "args",
            vec![
                "--headless=new",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-gpu",
                "--window-size=1920,1080",
                "--disable-blink-features=AutomationControlled",
            ],
        )?;

        let driver = WebDriver::new(&self.webdriver_url, caps)
            .await
            .context("Failed to connect to ChromeDriver")?;

        // The browser is torn down on every path out of here.
        let result = async {
            tokio::time::timeout(self.page_load_timeout, driver.goto(url))
                .await
                .map_err(|_| anyhow!("page load timed out after {:?}", self.page_load_timeout))?
                .context("Failed to navigate to URL")?;

            driver
                .query(By::Tag("body"))
                .first()
                .await
                .context("Failed to find body element")?;

            // Promotion grids are filled in by scripts after load.
            tokio::time::sleep(self.settle_wait).await;

            driver.source().await.context("Failed to get page source")
        }
        .await;

        if let Err(e) = driver.quit().await {
            warn!("Failed to quit browser: {}", e);
        }

        result
    }
}

impl PageFetcher for BrowserFetcher {
    fn fetch_page(&self, url: &str) -> Result<String> {
        debug!(url, "rendering page");
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start browser runtime")?;
        runtime.block_on(self.render(url))
    }
}
