//! Weekly Unity Asset Store gift relay: scrape the promo page, archive the
//! result, announce it on Telegram.
pub mod app;
pub mod archive;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod format;
pub mod model;
pub mod notify;
pub mod scrape;
