//! Scanned flyer handling
//!
//! Locates a store's flyer document and turns it into text via external
//! rasterization (`pdftoppm`) and recognition (`tesseract`) tools.

use crate::types::Settings;
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static PDF_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)href\s*=\s*["']([^"']+\.pdf(?:\?[^"']*)?)["']"#).expect("flyer link pattern is valid")
});

/// Whether the URL already points at a PDF document.
pub fn is_document_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.to_lowercase().ends_with(".pdf")
}

/// Find the first flyer link in an intermediate page and make it absolute.
///
/// `link_pattern` must capture the link in group 1 (or match it whole);
/// without one, any `.pdf` href is taken.
pub fn find_flyer_link(page_url: &str, html: &str, link_pattern: Option<&str>) -> Result<Option<String>> {
    let custom;
    let re: &Regex = match link_pattern {
        Some(pattern) => {
            custom = Regex::new(pattern).with_context(|| format!("Invalid flyer link pattern {:?}", pattern))?;
            &custom
        }
        None => &*PDF_HREF_RE,
    };

    let Some(caps) = re.captures(html) else {
        return Ok(None);
    };
    let Some(link) = caps.get(1).or_else(|| caps.get(0)) else {
        return Ok(None);
    };

    let base = Url::parse(page_url).with_context(|| format!("Invalid page URL {:?}", page_url))?;
    let resolved = base
        .join(link.as_str())
        .with_context(|| format!("Cannot resolve flyer link {:?}", link.as_str()))?;

    Ok(Some(resolved.to_string()))
}

/// Recognizes text in a flyer document, one string per page.
pub trait FlyerReader {
    fn read_pages(&self, document: &[u8]) -> Result<Vec<String>>;
}

/// Rasterizes with poppler's `pdftoppm` and recognizes each page with `tesseract`.
pub struct TesseractFlyerReader {
    language: String,
    dpi: u32,
}

impl TesseractFlyerReader {
    pub fn new(settings: &Settings) -> Self {
        Self {
            language: settings.ocr_language.clone(),
            dpi: settings.ocr_dpi,
        }
    }

    fn rasterize(&self, pdf: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
        let output = Command::new("pdftoppm")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(dir.join("page"))
            .output()
            .context("Failed to run pdftoppm (is poppler installed?)")?;

        if !output.status.success() {
            bail!(
                "pdftoppm exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let mut pages: Vec<PathBuf> = fs::read_dir(dir)
            .context("Failed to list rasterized pages")?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        // pdftoppm zero-pads page numbers, so name order is page order.
        pages.sort();

        if pages.is_empty() {
            return Err(anyhow!("pdftoppm produced no pages"));
        }
        Ok(pages)
    }

    fn recognize(&self, image: &Path) -> Result<String> {
        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .context("Failed to run tesseract (is it installed?)")?;

        if !output.status.success() {
            bail!(
                "tesseract exited with {} on {:?}: {}",
                output.status,
                image,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl FlyerReader for TesseractFlyerReader {
    fn read_pages(&self, document: &[u8]) -> Result<Vec<String>> {
        let dir = tempfile::tempdir().context("Failed to create scratch directory")?;
        let pdf = dir.path().join("flyer.pdf");
        fs::write(&pdf, document).context("Failed to write flyer document")?;

        let pages_dir = dir.path().join("pages");
        fs::create_dir(&pages_dir).context("Failed to create page directory")?;

        let images = self.rasterize(&pdf, &pages_dir)?;
        debug!(pages = images.len(), language = %self.language, "running OCR");

        images.iter().map(|image| self.recognize(image)).collect()
    }
}
