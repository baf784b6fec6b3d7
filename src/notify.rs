use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::ParseMode;
use teloxide::Bot;
use tracing::{error, info, instrument, warn};

use crate::config::{self, Config, Credentials};
use crate::format::{escape_html, format_asset_message, format_error_message};
use crate::model::{AssetRecord, ErrorKind};

/// Delivers one HTML-formatted text to the configured chat.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_html(&self, creds: &Credentials, text: &str) -> Result<()>;
}

/// Bot API `sendMessage` with `parse_mode = HTML`.
#[derive(Debug, Clone, Default)]
pub struct TelegramTransport {
    api_url: Option<Url>,
}

impl TelegramTransport {
    pub fn new(api_url: Option<Url>) -> Self {
        Self { api_url }
    }

    pub fn from_config(cfg: &config::Telegram) -> Result<Self> {
        let api_url = cfg
            .api_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .context("invalid telegram.api_url")?;
        Ok(Self::new(api_url))
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_html(&self, creds: &Credentials, text: &str) -> Result<()> {
        let mut bot = Bot::new(creds.bot_token.clone());
        if let Some(url) = &self.api_url {
            bot = bot.set_api_url(url.clone());
        }
        bot.send_message(creds.recipient(), text)
            .parse_mode(ParseMode::Html)
            .await
            .context("telegram sendMessage failed")?;
        Ok(())
    }
}

pub struct Notifier {
    credentials: Option<Credentials>,
    transport: Box<dyn ChatTransport>,
    message: config::Message,
}

impl Notifier {
    pub fn new(
        credentials: Option<Credentials>,
        transport: Box<dyn ChatTransport>,
        message: config::Message,
    ) -> Self {
        if credentials.is_none() {
            warn!(
                "{} / {} not set; notifications are disabled",
                config::ENV_BOT_TOKEN,
                config::ENV_CHAT_ID
            );
        }
        Self {
            credentials,
            transport,
            message,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let transport = TelegramTransport::from_config(&cfg.telegram)?;
        Ok(Self::new(
            cfg.credentials(),
            Box::new(transport),
            cfg.message.clone(),
        ))
    }

    /// The announcement exactly as `send` would deliver it.
    pub fn preview(&self, record: &AssetRecord) -> String {
        format_asset_message(record, &self.message)
    }

    /// Announce a promotion. A failed delivery triggers one error notification.
    #[instrument(skip_all, fields(code = %record.code))]
    pub async fn send(&self, record: &AssetRecord) -> bool {
        let Some(creds) = &self.credentials else {
            error!("telegram credentials missing; not sending");
            return false;
        };
        let text = self.preview(record);
        info!("sending telegram message");
        match self.transport.send_html(creds, &text).await {
            Ok(()) => {
                info!("message sent");
                true
            }
            Err(err) => {
                error!(?err, "failed to send asset message");
                let details = format!(
                    "Could not deliver this week's announcement: {}",
                    escape_html(&format!("{err:#}"))
                );
                self.send_error(ErrorKind::Delivery, &details).await;
                false
            }
        }
    }

    /// Report a failure to the chat. Never escalates further.
    #[instrument(skip_all, fields(kind = kind.as_str()))]
    pub async fn send_error(&self, kind: ErrorKind, details: &str) -> bool {
        let Some(creds) = &self.credentials else {
            error!("telegram credentials missing; not sending error notification");
            return false;
        };
        let text = format_error_message(kind, details, true);
        match self.transport.send_html(creds, &text).await {
            Ok(()) => {
                info!("error notification sent");
                true
            }
            Err(err) => {
                error!(?err, "failed to send error notification");
                false
            }
        }
    }
}
