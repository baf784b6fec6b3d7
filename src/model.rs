use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_ASSET: &str = "Unknown Asset";
pub const UNKNOWN_CODE: &str = "Unknown Code";
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// One scraped promotion. Every field is always populated; missing facts
/// carry a sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRecord {
    pub name: String,
    pub url: String,
    pub code: String,
    pub publisher_url: String,
    pub end_date: String,
}

impl AssetRecord {
    /// A record with every field at its sentinel. URLs default to the promo page.
    pub fn unknown(promo_url: &str) -> Self {
        Self {
            name: UNKNOWN_ASSET.to_string(),
            url: promo_url.to_string(),
            code: UNKNOWN_CODE.to_string(),
            publisher_url: promo_url.to_string(),
            end_date: UNKNOWN_DATE.to_string(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.code != UNKNOWN_CODE
    }
}

/// One row of the yearly archive file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub url: String,
    pub code: String,
    pub publisher_url: String,
    pub end_date: String,
}

impl ArchiveEntry {
    pub fn new(record: &AssetRecord, affiliate_id: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            name: record.name.clone(),
            url: affiliate_url(&record.url, affiliate_id),
            code: record.code.clone(),
            publisher_url: record.publisher_url.clone(),
            end_date: record.end_date.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Extraction,
    Delivery,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Delivery => "delivery",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "Network Error",
            ErrorKind::Extraction => "Scraping Error",
            ErrorKind::Delivery => "Delivery Error",
        }
    }
}

/// Append the affiliate query parameter to an asset URL.
pub fn affiliate_url(url: &str, affiliate_id: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}aid={affiliate_id}")
}
