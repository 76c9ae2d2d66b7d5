//! PromoWatch Library
//!
//! Scrapes grocery promotion pages (and scanned flyers as a fallback),
//! matches the deals against a watchlist and formats a notification digest.

pub mod filter;
pub mod normalize;
pub mod notify;
pub mod price;
pub mod runner;
pub mod scrapers;
pub mod storage;
pub mod types;
pub mod validation;

pub use types::*;
