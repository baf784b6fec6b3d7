use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use tg_giftbot::config;
use tg_giftbot::extract;
use tg_giftbot::fetch::parse_page;
use tg_giftbot::scrape::{read_asset_page, read_promo_page};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Run the promo-page locators against saved HTML, without any network I/O"
)]
struct Args {
    /// Saved copy of the promo page
    #[arg(long)]
    file: PathBuf,

    /// Saved copy of the asset detail page, for the publisher link
    #[arg(long)]
    asset_file: Option<PathBuf>,

    /// Optional YAML config file (reads only `scraper`)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = config::load(args.config.as_deref())?;
    let body = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let document = parse_page(&body);
    match extract::find_promo_anchor(&document) {
        Some(anchor) => {
            let container = extract::nearest_block(anchor);
            println!("anchor element:    <{}>", anchor.value().name());
            println!("container element: <{}>", container.value().name());
            println!("container text:    {}", extract::flatten_text(container));
        }
        None => println!("anchor element:    (none)"),
    }

    match read_promo_page(&body, &cfg.scraper) {
        Ok(record) => {
            println!("name:          {}", record.name);
            println!("url:           {}", record.url);
            println!("code:          {}", record.code);
            println!("end_date:      {}", record.end_date);
        }
        Err(err) => println!("promo page:    {err}"),
    }

    if let Some(path) = &args.asset_file {
        let asset_body = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let publisher = read_asset_page(&asset_body, &cfg.scraper.site_origin);
        println!(
            "publisher_url: {}",
            publisher.as_deref().unwrap_or("(none)")
        );
    }
    Ok(())
}
