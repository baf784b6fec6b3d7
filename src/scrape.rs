//! Single linear scrape: promo page, then (optionally) the asset page.
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config;
use crate::extract;
use crate::fetch::{parse_page, PageSource};
use crate::model::{AssetRecord, ErrorKind, UNKNOWN_ASSET, UNKNOWN_DATE};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("promo page {0} is unavailable")]
    PromoUnavailable(String),
    #[error("no coupon code on the promo page; the promotion may be over or the layout changed")]
    CouponNotFound,
}

impl ScrapeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::PromoUnavailable(_) => ErrorKind::Transport,
            ScrapeError::CouponNotFound => ErrorKind::Extraction,
        }
    }
}

pub struct Scraper<'a> {
    pages: &'a dyn PageSource,
    cfg: &'a config::Scraper,
}

impl<'a> Scraper<'a> {
    pub fn new(pages: &'a dyn PageSource, cfg: &'a config::Scraper) -> Self {
        Self { pages, cfg }
    }

    #[instrument(skip_all, fields(promo_url = %self.cfg.promo_url))]
    pub async fn scrape(&self) -> Result<AssetRecord, ScrapeError> {
        let promo_url = &self.cfg.promo_url;
        info!("scraping promo page");
        let body = self
            .pages
            .fetch_html(promo_url)
            .await
            .ok_or_else(|| ScrapeError::PromoUnavailable(promo_url.clone()))?;

        let mut record = read_promo_page(&body, self.cfg)?;

        if record.url != *promo_url {
            match self.pages.fetch_html(&record.url).await {
                Some(asset_body) => {
                    if let Some(publisher) = read_asset_page(&asset_body, &self.cfg.site_origin) {
                        record.publisher_url = publisher;
                    } else {
                        warn!(url = %record.url, "no publisher link on asset page");
                    }
                }
                None => warn!(url = %record.url, "asset page unavailable; keeping default publisher url"),
            }
        }

        info!(name = %record.name, code = %record.code, "promotion found");
        Ok(record)
    }
}

/// Everything the promo page alone can tell us. The publisher link is left at
/// its default.
pub fn read_promo_page(body: &str, cfg: &config::Scraper) -> Result<AssetRecord, ScrapeError> {
    let document = parse_page(body);
    let mut record = AssetRecord::unknown(&cfg.promo_url);

    let Some(anchor) = extract::find_promo_anchor(&document) else {
        warn!("no 'coupon code' or 'use code' text on the promo page");
        return Err(ScrapeError::CouponNotFound);
    };
    let container = extract::nearest_block(anchor);

    if let Some(code) = extract::locate_coupon_code(&extract::flatten_text(container)) {
        record.code = code;
    }
    if !record.is_found() {
        warn!("coupon phrase present but no code follows it");
        return Err(ScrapeError::CouponNotFound);
    }

    record.name = extract::locate_title(container).unwrap_or_else(|| UNKNOWN_ASSET.to_string());

    if let Some(url) = extract::locate_asset_link(container, &cfg.site_origin)
        .or_else(|| extract::locate_asset_link(document.root_element(), &cfg.site_origin))
    {
        record.url = url;
    }

    let page_text = extract::flatten_text(document.root_element());
    record.end_date = extract::locate_sale_end_date(&page_text).unwrap_or_else(|| {
        let skip = page_text.chars().count().saturating_sub(500);
        let tail: String = page_text.chars().skip(skip).collect();
        warn!(%tail, "could not find sale end date");
        UNKNOWN_DATE.to_string()
    });

    Ok(record)
}

pub fn read_asset_page(body: &str, site_origin: &str) -> Option<String> {
    let document = parse_page(body);
    extract::locate_publisher_link(document.root_element(), site_origin)
}
