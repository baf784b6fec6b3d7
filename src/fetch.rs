use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, warn};

use crate::config;

/// Anything that can hand back the HTML of a page. Every failure is `None`.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Option<String>;
}

/// Plain GET over reqwest, presenting itself as a desktop browser.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    http: Client,
}

impl HttpPageSource {
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http })
    }

    pub fn from_config(cfg: &config::Scraper) -> Result<Self> {
        Self::new(&cfg.user_agent)
    }

    async fn get(&self, url: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to reach {url}"))?;
        let status = res.status();
        if !status.is_success() {
            anyhow::bail!("{url} answered {status}");
        }
        res.text()
            .await
            .with_context(|| format!("failed to read body of {url}"))
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_html(&self, url: &str) -> Option<String> {
        match self.get(url).await {
            Ok(body) if !body.trim().is_empty() => {
                debug!(url, bytes = body.len(), "fetched page");
                Some(body)
            }
            Ok(_) => {
                warn!(url, "page body is empty");
                None
            }
            Err(err) => {
                warn!(?err, url, "page unavailable");
                None
            }
        }
    }
}

/// Parse fetched HTML into a navigable tree.
pub fn parse_page(body: &str) -> Html {
    Html::parse_document(body)
}
