//! Run configuration and credentials.
//!
//! [`Settings`] is read once at startup from a YAML document (JSON is valid
//! YAML, so `user_config.json` works unchanged) and passed by reference to
//! every stage. [`Credentials`] merges CLI/environment values with an
//! optional credentials document; environment wins.

use crate::cli::CredentialArgs;
use crate::error::ConfigError;
use crate::pipeline::DedupStrategy;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Top-level user configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Two-letter language code passed to every provider.
    pub language: String,
    #[serde(default)]
    pub country: Option<String>,
    /// A single category or a list, joined with commas.
    #[serde(default, deserialize_with = "comma_joined")]
    pub category: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    /// Per-provider result count.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Digest length after ranking.
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default)]
    pub dedup: DedupStrategy,
    #[serde(default = "default_feeds")]
    pub rss_feeds: Vec<Feed>,
    #[serde(default)]
    pub rss: RssPolicy,
    #[serde(default)]
    pub newsapi: ProviderSettings,
    #[serde(default)]
    pub gnews: ProviderSettings,
    #[serde(default)]
    pub mediastack: ProviderSettings,
    #[serde(default)]
    pub expander: ExpanderSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub mail: MailSettings,
}

fn default_page_size() -> u32 {
    30
}

fn default_max_articles() -> usize {
    15
}

fn default_feeds() -> Vec<Feed> {
    [
        ("https://feeds.bbci.co.uk/news/rss.xml", "BBC"),
        (
            "https://www.reutersagency.com/feed/?best-topics=world&post_type=best",
            "Reuters",
        ),
        ("https://www.aljazeera.com/xml/rss/all.xml", "Al Jazeera"),
        ("https://www.theguardian.com/world/rss", "The Guardian"),
    ]
    .into_iter()
    .map(|(url, name)| Feed {
        url: url.to_string(),
        name: Some(name.to_string()),
    })
    .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => s.split(',').map(|p| p.trim().to_string()).collect(),
            OneOrMany::Many(v) => v,
        }
    }
}

fn comma_joined<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<OneOrMany>::deserialize(deserializer)?;
    Ok(value.map(|v| {
        v.into_vec()
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }))
}

impl Settings {
    /// Read and validate the configuration document at `path`.
    #[instrument(level = "info")]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let settings = Self::from_yaml(&raw).map_err(|e| match e {
            LoadError::Parse(source) => ConfigError::Parse {
                path: shown.clone(),
                source,
            },
            LoadError::Invalid(e) => e,
        })?;
        info!(
            path = %shown,
            language = %settings.language,
            feeds = settings.rss_feeds.len(),
            max_articles = settings.max_articles,
            dedup = ?settings.dedup,
            "Loaded configuration"
        );
        Ok(settings)
    }

    fn from_yaml(raw: &str) -> Result<Self, LoadError> {
        let mut settings: Settings = serde_yaml::from_str(raw).map_err(LoadError::Parse)?;
        settings.normalize().map_err(LoadError::Invalid)?;
        Ok(settings)
    }

    fn normalize(&mut self) -> Result<(), ConfigError> {
        self.language = self.language.trim().to_string();
        if self.language.is_empty() {
            return Err(ConfigError::Empty("language"));
        }
        for field in [&mut self.country, &mut self.category, &mut self.keyword] {
            *field = field
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
        if self.max_articles == 0 {
            return Err(ConfigError::Empty("max_articles"));
        }
        debug!(?self.country, ?self.category, ?self.keyword, "Normalized settings");
        Ok(())
    }

    /// Query parameters shared by the API adapters.
    pub fn query(&self) -> Query {
        Query {
            language: self.language.clone(),
            country: self.country.clone(),
            category: self.category.clone(),
            keyword: self.keyword.clone(),
            page_size: self.page_size,
        }
    }
}

enum LoadError {
    Parse(serde_yaml::Error),
    Invalid(ConfigError),
}

/// The provider-independent part of a headline request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub language: String,
    pub country: Option<String>,
    pub category: Option<String>,
    pub keyword: Option<String>,
    pub page_size: u32,
}

/// An RSS/Atom feed to poll.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "FeedEntry")]
pub struct Feed {
    pub url: String,
    /// Label used as the article source; the channel title when absent.
    pub name: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedEntry {
    Url(String),
    Named { url: String, name: Option<String> },
}

impl From<FeedEntry> for Feed {
    fn from(entry: FeedEntry) -> Self {
        match entry {
            FeedEntry::Url(url) => Feed { url, name: None },
            FeedEntry::Named { url, name } => Feed { url, name },
        }
    }
}

/// How feed entries are filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RssPolicy {
    /// Drop entries with an empty title or summary, like the API adapters.
    pub require_title_and_description: bool,
    /// Keep only entries whose title or summary mentions the keyword.
    pub keyword_filter: bool,
}

/// Which endpoint family an API adapter queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiMode {
    #[default]
    TopHeadlines,
    Search,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// `None` runs the provider whenever its key is present; `Some(true)`
    /// makes a missing key fatal; `Some(false)` disables it.
    pub enabled: Option<bool>,
    pub mode: ApiMode,
    /// Endpoint root override, mostly for testing.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExpanderSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub min_paragraph_chars: usize,
    pub max_sentences: usize,
}

impl Default for ExpanderSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 10,
            min_paragraph_chars: 50,
            max_sentences: 2,
        }
    }
}

/// OpenAI-compatible chat completion endpoint used by `summarize`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/".to_string(),
            model: "gpt-4".to_string(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }
}

/// TLS mode of the SMTP relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailSecurity {
    /// Plain connection upgraded with STARTTLS, port 587.
    #[default]
    Starttls,
    /// TLS from the first byte, port 465.
    ImplicitTls,
}

impl MailSecurity {
    pub fn default_port(self) -> u16 {
        match self {
            MailSecurity::Starttls => 587,
            MailSecurity::ImplicitTls => 465,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    pub host: String,
    pub port: Option<u16>,
    pub security: MailSecurity,
    pub subject: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            host: "smtp.office365.com".to_string(),
            port: None,
            security: MailSecurity::Starttls,
            subject: "📰 Your Daily News Digest".to_string(),
        }
    }
}

impl MailSettings {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.security.default_port())
    }
}

/// Credentials document, keyed like the environment variables.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsFile {
    #[serde(rename = "NEWS_API_KEY", alias = "api_key")]
    news_api_key: Option<String>,
    #[serde(rename = "GNEWS_API_KEY")]
    gnews_api_key: Option<String>,
    #[serde(rename = "MEDIASTACK_API_KEY")]
    mediastack_api_key: Option<String>,
    #[serde(rename = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
    #[serde(rename = "EMAIL_SENDER")]
    email_sender: Option<String>,
    #[serde(rename = "EMAIL_PASSWORD")]
    email_password: Option<String>,
    #[serde(rename = "EMAIL_RECIPIENTS", default, deserialize_with = "comma_list")]
    email_recipients: Option<Vec<String>>,
}

fn comma_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(OneOrMany::into_vec))
}

impl CredentialsFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }
}

/// Resolved secrets. `Debug` never prints values.
#[derive(Clone, Default)]
pub struct Credentials {
    pub news_api: Option<String>,
    pub gnews: Option<String>,
    pub mediastack: Option<String>,
    pub openai: Option<String>,
    email_sender: Option<String>,
    email_password: Option<String>,
    email_recipients: Vec<String>,
}

/// SMTP login plus the digest's audience.
#[derive(Clone)]
pub struct MailAccount {
    pub sender: String,
    pub password: String,
    pub recipients: Vec<String>,
}

impl fmt::Debug for MailAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailAccount")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients)
            .finish()
    }
}

fn redact(v: &Option<String>) -> Option<&'static str> {
    v.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("news_api", &redact(&self.news_api))
            .field("gnews", &redact(&self.gnews))
            .field("mediastack", &redact(&self.mediastack))
            .field("openai", &redact(&self.openai))
            .field("email_sender", &self.email_sender)
            .field("email_password", &redact(&self.email_password))
            .field("email_recipients", &self.email_recipients)
            .finish()
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Credentials {
    /// Merge CLI/environment values over the credentials document.
    pub fn resolve(args: &CredentialArgs, file: CredentialsFile) -> Self {
        let recipients = if args.email_recipients.is_empty() {
            file.email_recipients.unwrap_or_default()
        } else {
            args.email_recipients.clone()
        };
        Self {
            news_api: non_blank(args.news_api_key.clone().or(file.news_api_key)),
            gnews: non_blank(args.gnews_api_key.clone().or(file.gnews_api_key)),
            mediastack: non_blank(args.mediastack_api_key.clone().or(file.mediastack_api_key)),
            openai: non_blank(args.openai_api_key.clone().or(file.openai_api_key)),
            email_sender: non_blank(args.email_sender.clone().or(file.email_sender)),
            email_password: non_blank(args.email_password.clone().or(file.email_password)),
            email_recipients: recipients
                .into_iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Mail login and recipients; every piece is required.
    pub fn mail_account(&self) -> Result<MailAccount, ConfigError> {
        let sender = self
            .email_sender
            .clone()
            .ok_or(ConfigError::MissingCredential("EMAIL_SENDER"))?;
        let password = self
            .email_password
            .clone()
            .ok_or(ConfigError::MissingCredential("EMAIL_PASSWORD"))?;
        if self.email_recipients.is_empty() {
            return Err(ConfigError::MissingCredential("EMAIL_RECIPIENTS"));
        }
        Ok(MailAccount {
            sender,
            password,
            recipients: self.email_recipients.clone(),
        })
    }

    pub fn openai_key(&self) -> Result<&str, ConfigError> {
        self.openai
            .as_deref()
            .ok_or(ConfigError::MissingCredential("OPENAI_API_KEY"))
    }
}
