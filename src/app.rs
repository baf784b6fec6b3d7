//! One scheduled run: scrape, archive, then announce or preview.
use std::io::Write;
use tracing::{error, info, instrument, warn};

use crate::archive::ArchiveStore;
use crate::notify::Notifier;
use crate::scrape::Scraper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    DryRun,
}

/// How a run ended. Only `NoData` is a failing exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    DeliveryFailed,
    Previewed,
    NoData,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::NoData => 1,
            Outcome::Delivered | Outcome::DeliveryFailed | Outcome::Previewed => 0,
        }
    }
}

/// Scrape once, archive the result, then send it (live) or write it to `out` (dry run).
/// A live run that finds nothing reports the failure to the chat; a dry run never does.
#[instrument(skip_all, fields(mode = ?mode))]
pub async fn run<W: Write>(
    mode: Mode,
    scraper: &Scraper<'_>,
    archive: &ArchiveStore,
    notifier: &Notifier,
    out: &mut W,
) -> Outcome {
    let record = match scraper.scrape().await {
        Ok(record) => record,
        Err(err) => {
            error!(%err, "scraping failed or returned no data");
            if mode == Mode::Live {
                notifier.send_error(err.kind(), &err.to_string()).await;
            }
            return Outcome::NoData;
        }
    };

    archive.save(&record);

    match mode {
        Mode::DryRun => {
            let preview = notifier.preview(&record);
            if let Err(err) = writeln!(
                out,
                "\n--- GENERATED MESSAGE PREVIEW ---\n{preview}\n---------------------------------"
            ) {
                warn!(%err, "failed to print preview");
            }
            Outcome::Previewed
        }
        Mode::Live => {
            if notifier.send(&record).await {
                info!("run complete");
                Outcome::Delivered
            } else {
                Outcome::DeliveryFailed
            }
        }
    }
}
