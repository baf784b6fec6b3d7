use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tg_giftbot::app::{self, Mode};
use tg_giftbot::archive::ArchiveStore;
use tg_giftbot::config;
use tg_giftbot::fetch::HttpPageSource;
use tg_giftbot::notify::Notifier;
use tg_giftbot::scrape::Scraper;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Relay the Unity Asset Store weekly free asset to Telegram"
)]
struct Args {
    /// Print the message to stdout instead of sending it to Telegram
    #[arg(long)]
    dry_run: bool,

    /// Optional YAML config file; built-in defaults otherwise
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(args.config.as_deref())?;
    let mode = if args.dry_run { Mode::DryRun } else { Mode::Live };

    info!(?mode, "starting unity gift relay");
    let pages = HttpPageSource::from_config(&cfg.scraper)?;
    let scraper = Scraper::new(&pages, &cfg.scraper);
    let archive = ArchiveStore::new(&cfg.archive.dir, &cfg.message.affiliate_id);
    let notifier = Notifier::from_config(&cfg)?;

    let outcome = app::run(mode, &scraper, &archive, &notifier, &mut std::io::stdout()).await;
    Ok(ExitCode::from(outcome.exit_code()))
}
