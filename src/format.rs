//! Telegram HTML payloads. Scraped values are interpolated as-is; they come
//! from a single known page. Free-form error text goes through `escape_html`.
use chrono::Utc;
use rand::seq::SliceRandom;

use crate::config;
use crate::model::{affiliate_url, AssetRecord, ErrorKind};

/// Render the weekly announcement with a random greeting from the pool.
pub fn format_asset_message(record: &AssetRecord, cfg: &config::Message) -> String {
    let greeting = cfg
        .greetings
        .choose(&mut rand::thread_rng())
        .map(String::as_str)
        .unwrap_or_default();
    render_asset_message(greeting, record, &cfg.affiliate_id)
}

pub fn render_asset_message(greeting: &str, record: &AssetRecord, affiliate_id: &str) -> String {
    format!(
        "{greeting}\n\n\
         Free this week \"<b>{name}</b>\" {url}\n\
         with the code \"<code>{code}</code>\".\n\
         Also, 50% off publisher assets:\n\
         {publisher}\n\
         {end_date}\n\n\
         Enjoy!!",
        name = record.name,
        url = affiliate_url(&record.url, affiliate_id),
        code = record.code,
        publisher = record.publisher_url,
        end_date = record.end_date,
    )
}

/// Escape the three characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn format_error_message(kind: ErrorKind, details: &str, include_timestamp: bool) -> String {
    let mut message = format!(
        "⚠️ <b>Unity gift relay failed</b>\n\n\
         Type: <b>{}</b>\n\
         Details: {details}",
        kind.label()
    );
    if include_timestamp {
        message.push_str(&format!(
            "\nTime: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AssetRecord {
        AssetRecord {
            name: "Super Sword Pack".into(),
            url: "https://assetstore.unity.com/packages/1234/super-sword".into(),
            code: "SWORD99".into(),
            publisher_url: "https://assetstore.unity.com/publishers/99".into(),
            end_date: "* Sale and related free asset promotion end June 1, 2025.".into(),
        }
    }

    #[test]
    fn asset_message_has_every_field_whatever_the_greeting() {
        let cfg = config::Message::default();
        for _ in 0..50 {
            let msg = format_asset_message(&record(), &cfg);
            assert!(cfg.greetings.iter().any(|g| msg.starts_with(g.as_str())));
            assert!(msg.contains("Super Sword Pack"));
            assert!(msg.contains("<code>SWORD99</code>"));
            assert!(msg.contains(
                "https://assetstore.unity.com/packages/1234/super-sword?aid=1011lHuMX"
            ));
            assert!(msg.contains("https://assetstore.unity.com/publishers/99"));
            assert!(msg.contains("June 1, 2025."));
        }
    }

    #[test]
    fn asset_message_layout() {
        let msg = render_asset_message("Hi!", &record(), "X");
        let lines: Vec<&str> = msg.lines().collect();
        assert_eq!(lines[0], "Hi!");
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "Free this week \"<b>Super Sword Pack</b>\" https://assetstore.unity.com/packages/1234/super-sword?aid=X"
        );
        assert_eq!(lines[3], "with the code \"<code>SWORD99</code>\".");
        assert_eq!(lines.last(), Some(&"Enjoy!!"));
    }

    #[test]
    fn escape_markup_characters() {
        assert_eq!(escape_html("Tom & Jerry <Pack>"), "Tom &amp; Jerry &lt;Pack&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn error_message_optional_timestamp() {
        let plain = format_error_message(ErrorKind::Extraction, "no coupon", false);
        assert!(plain.contains("<b>Scraping Error</b>"));
        assert!(plain.contains("Details: no coupon"));
        assert!(!plain.contains("Time:"));

        let stamped = format_error_message(ErrorKind::Delivery, "boom", true);
        assert!(stamped.contains("Time: "));
        assert!(stamped.ends_with(" UTC"));
    }
}
