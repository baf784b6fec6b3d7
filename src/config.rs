//! Configuration loader and validator for the asset gift relay.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use teloxide::types::{ChatId, Recipient};
use thiserror::Error;

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

const DEFAULT_PROMO_URL: &str = "https://assetstore.unity.com/publisher-sale";
const DEFAULT_SITE_ORIGIN: &str = "https://assetstore.unity.com";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_AFFILIATE_ID: &str = "1011lHuMX";

const DEFAULT_GREETINGS: [&str; 20] = [
    "🎉 Happy Friday! Time to level up your game dev journey!",
    "🌟 It's Friday and Unity Asset Store knows it! Get ready for something awesome!",
    "🚀 Friday vibes incoming! Your weekend game dev adventure starts now!",
    "✨ TGIF! Unity's got a special gift to kickstart your creative weekend!",
    "🎮 Happy Friday, developers! Let's end the week with a bang!",
    "🌈 Friday feels + free assets = Perfect combo for game developers!",
    "💎 It's Friday! Time to add some premium quality to your project!",
    "🎊 Cheers to Friday and free Unity assets! Your project deserves this!",
    "⚡ Friday energy is here! Grab this week's free asset and create magic!",
    "🎁 Happy Friday! Unity's Publisher of the Week is bringing the goods!",
    "🌟 Weekend mode: ACTIVATED! Start it right with this free asset!",
    "🔥 It's Friday! Time to fuel your creative fire with premium assets!",
    "🎯 Friday = Game dev freedom! Here's your weekly treasure!",
    "💫 TGIF, devs! Your weekend project just got a whole lot better!",
    "🏆 Happy Friday! Treat yourself to this week's amazing free asset!",
    "🎨 Friday creativity boost incoming! Unity's got you covered!",
    "🚀 It's Friday! Launch your weekend projects with this free gem!",
    "✨ Happy Friday, creators! Time to make something incredible!",
    "🎮 Weekend warriors, assemble! Here's your Friday power-up!",
    "🌟 It's Friday and your game dev toolkit is about to get richer!",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration, built once at startup and shared read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub scraper: Scraper,
    pub message: Message,
    pub archive: Archive,
    pub telegram: Telegram,
}

/// Where and how pages are fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scraper {
    pub promo_url: String,
    /// Origin prefixed to relative links found on either page.
    pub site_origin: String,
    pub user_agent: String,
}

/// Message rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Message {
    pub affiliate_id: String,
    pub greetings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Archive {
    pub dir: PathBuf,
}

/// Telegram credentials. Usually left empty in the file and supplied through
/// the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Telegram {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: Option<String>,
}

/// Both halves of the Telegram credential pair, present and non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Credentials {
    /// Numeric ids address a chat directly, anything else is a channel username.
    pub fn recipient(&self) -> Recipient {
        let chat = self.chat_id.trim();
        match chat.parse::<i64>() {
            Ok(id) => Recipient::Id(ChatId(id)),
            Err(_) => Recipient::ChannelUsername(chat.to_string()),
        }
    }
}

impl Default for Scraper {
    fn default() -> Self {
        Self {
            promo_url: DEFAULT_PROMO_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Self {
            affiliate_id: DEFAULT_AFFILIATE_ID.to_string(),
            greetings: DEFAULT_GREETINGS.iter().map(|g| g.to_string()).collect(),
        }
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Override credentials from a variable lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_BOT_TOKEN).filter(|v| !v.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(chat) = lookup(ENV_CHAT_ID).filter(|v| !v.trim().is_empty()) {
            self.telegram.chat_id = chat;
        }
    }

    /// `None` unless both the bot token and the chat id are set.
    pub fn credentials(&self) -> Option<Credentials> {
        let token = self.telegram.bot_token.trim();
        let chat = self.telegram.chat_id.trim();
        if token.is_empty() || chat.is_empty() {
            return None;
        }
        Some(Credentials {
            bot_token: token.to_string(),
            chat_id: chat.to_string(),
        })
    }
}

/// Load configuration and validate it.
/// - If `path` is None, starts from the built-in defaults.
/// - Credentials from the process environment override the file.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut cfg = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        }
        None => Config::default(),
    };
    cfg.apply_env(|key| std::env::var(key).ok());
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.scraper.promo_url.trim().is_empty() {
        return Err(ConfigError::Invalid("scraper.promo_url must be non-empty"));
    }
    if reqwest::Url::parse(&cfg.scraper.site_origin).is_err() {
        return Err(ConfigError::Invalid("scraper.site_origin must be an absolute URL"));
    }
    if cfg.scraper.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid("scraper.user_agent must be non-empty"));
    }
    if cfg.message.affiliate_id.trim().is_empty() {
        return Err(ConfigError::Invalid("message.affiliate_id must be non-empty"));
    }
    if cfg.message.greetings.iter().all(|g| g.trim().is_empty()) {
        return Err(ConfigError::Invalid("message.greetings must contain at least one greeting"));
    }
    if cfg.archive.dir.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("archive.dir must be non-empty"));
    }
    if let Some(api_url) = &cfg.telegram.api_url {
        if reqwest::Url::parse(api_url).is_err() {
            return Err(ConfigError::Invalid("telegram.api_url must be an absolute URL"));
        }
    }
    Ok(())
}

/// Example YAML; every key is optional.
pub fn example() -> &'static str {
    r#"scraper:
  promo_url: "https://assetstore.unity.com/publisher-sale"
  site_origin: "https://assetstore.unity.com"
  user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"

message:
  affiliate_id: "1011lHuMX"
  greetings:
    - "🎉 Happy Friday! Time to level up your game dev journey!"
    - "🎁 Happy Friday! Unity's Publisher of the Week is bringing the goods!"

archive:
  dir: "./archive"

# Prefer TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID in the environment.
telegram:
  bot_token: ""
  chat_id: ""
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn parse_example_ok() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg.message.greetings.len(), 2);
        assert_eq!(cfg.archive.dir, PathBuf::from("./archive"));
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        validate(&cfg).unwrap();
        assert_eq!(cfg.message.greetings.len(), 20);
        assert_eq!(cfg.message.affiliate_id, "1011lHuMX");
        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("archive:\n  dir: /tmp/gifts\n").unwrap();
        assert_eq!(cfg.scraper, Scraper::default());
        assert_eq!(cfg.archive.dir, PathBuf::from("/tmp/gifts"));
    }

    #[test]
    fn invalid_fields() {
        let mut cfg = Config::default();
        cfg.scraper.site_origin = "assetstore".into();
        match validate(&cfg).unwrap_err() {
            ConfigError::Invalid(msg) => assert!(msg.contains("site_origin")),
            _ => panic!("wrong error"),
        }

        let mut cfg = Config::default();
        cfg.message.greetings = vec!["  ".into()];
        match validate(&cfg).unwrap_err() {
            ConfigError::Invalid(msg) => assert!(msg.contains("greetings")),
            _ => panic!("wrong error"),
        }

        let mut cfg = Config::default();
        cfg.message.affiliate_id = "".into();
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg = Config::default();
        cfg.telegram.api_url = Some("not a url".into());
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn env_overrides_credentials() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(ENV_BOT_TOKEN, "123:abc"), (ENV_CHAT_ID, "@gifts")]);
        let mut cfg = Config::default();
        cfg.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        let creds = cfg.credentials().unwrap();
        assert_eq!(creds.bot_token, "123:abc");
        assert_eq!(creds.recipient(), Recipient::ChannelUsername("@gifts".into()));
    }

    #[test]
    fn one_missing_credential_disables_sending() {
        let mut cfg = Config::default();
        cfg.apply_env(|k| (k == ENV_BOT_TOKEN).then(|| "123:abc".to_string()));
        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn numeric_chat_id_is_direct_recipient() {
        let creds = Credentials {
            bot_token: "t".into(),
            chat_id: "-100123".into(),
        };
        assert_eq!(creds.recipient(), Recipient::Id(ChatId(-100123)));
        assert!(!format!("{creds:?}").contains("\"t\""));
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, example()).unwrap();
        let cfg = load(Some(&p)).unwrap();
        assert_eq!(cfg.scraper.site_origin, "https://assetstore.unity.com");
    }
}
