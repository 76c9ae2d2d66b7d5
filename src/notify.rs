use crate::types::{Deal, SendOutcome};
use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use tracing::info;

const NO_MATCHES_MESSAGE: &str = "No new deals matched your watchlist.";

/// Render matched deals as a plain-text digest.
pub fn format_message(matched: &[Deal]) -> String {
    if matched.is_empty() {
        return NO_MATCHES_MESSAGE.to_string();
    }

    let blocks: Vec<String> = matched.iter().map(format_deal).collect();
    format!("New deals ({}):\n\n{}", matched.len(), blocks.join("\n\n"))
}

fn format_deal(deal: &Deal) -> String {
    let price = deal
        .price
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| "?".to_string());
    let discount = deal
        .discount_pct
        .map(|d| format!("{:.1}", d))
        .unwrap_or_else(|| "?".to_string());

    format!(
        "🔖 {}: {} — {} zł ({}%)\n{}",
        deal.store, deal.product_name, price, discount, deal.url
    )
}

/// Delivers the final digest.
pub trait Notifier {
    fn send(&self, message: &str) -> Result<SendOutcome>;
}

/// Telegram bot delivery; credentials come from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
pub struct TelegramNotifier {
    credentials: Option<(String, String)>,
    client: reqwest::blocking::Client,
}

impl TelegramNotifier {
    pub fn new(token: Option<String>, chat_id: Option<String>, timeout: Duration) -> Result<Self> {
        let credentials = match (token, chat_id) {
            (Some(token), Some(chat_id)) if !token.is_empty() && !chat_id.is_empty() => {
                Some((token, chat_id))
            }
            _ => None,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { credentials, client })
    }

    pub fn from_env(timeout: Duration) -> Result<Self> {
        Self::new(
            env::var("TELEGRAM_BOT_TOKEN").ok(),
            env::var("TELEGRAM_CHAT_ID").ok(),
            timeout,
        )
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, message: &str) -> Result<SendOutcome> {
        let Some((token, chat_id)) = &self.credentials else {
            info!("Telegram secrets are missing; skipping send");
            return Ok(SendOutcome::Skipped);
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let response = self
            .client
            .post(&url)
            .form(&[("chat_id", chat_id.as_str()), ("text", message)])
            .send()
            .context("Telegram request failed")?
            .error_for_status()
            .context("Telegram rejected the message")?;

        let status = response.status().as_u16();
        info!(status, "Telegram send status");
        Ok(SendOutcome::Sent { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(store: &str, name: &str, price: Option<f64>, discount_pct: Option<f64>) -> Deal {
        Deal {
            store: store.to_string(),
            product_name: name.to_string(),
            price,
            regular_price: None,
            discount_pct,
            url: format!("https://{}.example/promo", store.to_lowercase()),
        }
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(format_message(&[]), NO_MATCHES_MESSAGE);
    }

    #[test]
    fn test_header_and_blocks() {
        let msg = format_message(&[
            deal("Kaufland", "Mleko 3,2% 1l", Some(3.5), Some(12.5)),
            deal("Biedronka", "Łosoś filet", Some(29.99), None),
        ]);

        assert!(msg.starts_with("New deals (2):\n\n"));
        assert!(msg.contains("🔖 Kaufland: Mleko 3,2% 1l — 3.50 zł (12.5%)\nhttps://kaufland.example/promo"));
        assert!(msg.contains("🔖 Biedronka: Łosoś filet — 29.99 zł (?%)"));
        assert_eq!(msg.matches("🔖").count(), 2);
    }

    #[test]
    fn test_missing_credentials_skip_send() {
        let notifier = TelegramNotifier::new(Some("token".to_string()), None, Duration::from_secs(1)).unwrap();
        assert_eq!(notifier.send("hello").unwrap(), SendOutcome::Skipped);
    }

    #[test]
    fn test_empty_credentials_skip_send() {
        let notifier =
            TelegramNotifier::new(Some(String::new()), Some(String::new()), Duration::from_secs(1)).unwrap();
        assert_eq!(notifier.send("hello").unwrap(), SendOutcome::Skipped);
    }
}
