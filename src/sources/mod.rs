//! Source adapters: one per provider, each turning a provider response into
//! [`Article`]s.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | NewsAPI | [`newsapi`] | JSON API | `top-headlines` or `everything` |
//! | GNews | [`gnews`] | JSON API | `top-headlines` or `search` |
//! | Mediastack | [`mediastack`] | JSON API | `/v1/news`, newest first |
//! | RSS/Atom | [`rss`] | Feed XML | One adapter per configured feed |
//!
//! # Common Patterns
//!
//! Every adapter exposes `fetch(&self, &reqwest::Client)` returning
//! `Result<Vec<Article>, SourceError>`. A failed request fails the whole
//! adapter; a malformed entry is skipped on its own. The pipeline turns the
//! result into a [`SourceReport`](crate::models::SourceReport).

pub mod gnews;
pub mod mediastack;
pub mod newsapi;
pub mod rss;

use crate::config::{Credentials, ProviderSettings, Settings};
use crate::error::{ConfigError, SourceError};
use crate::models::Article;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

/// A configured adapter.
#[derive(Debug, Clone)]
pub enum Source {
    NewsApi(newsapi::NewsApi),
    GNews(gnews::GNews),
    Mediastack(mediastack::Mediastack),
    Rss(rss::RssFeed),
}

impl Source {
    /// Label used in logs and reports.
    pub fn name(&self) -> String {
        match self {
            Source::NewsApi(_) => "newsapi".to_string(),
            Source::GNews(_) => "gnews".to_string(),
            Source::Mediastack(_) => "mediastack".to_string(),
            Source::Rss(feed) => format!("rss:{}", feed.label()),
        }
    }

    pub async fn fetch(&self, http: &reqwest::Client) -> Result<Vec<Article>, SourceError> {
        match self {
            Source::NewsApi(s) => s.fetch(http).await,
            Source::GNews(s) => s.fetch(http).await,
            Source::Mediastack(s) => s.fetch(http).await,
            Source::Rss(s) => s.fetch(http).await,
        }
    }
}

/// Decide whether a keyed provider runs.
///
/// No explicit setting: run when a key is present. `enabled: true` with no
/// key is a setup error.
fn provider_key(
    provider: &'static str,
    env_name: &'static str,
    settings: &ProviderSettings,
    key: Option<&String>,
) -> Result<Option<String>, ConfigError> {
    match (settings.enabled, key) {
        (Some(false), _) => {
            info!(provider, "Provider disabled in configuration");
            Ok(None)
        }
        (_, Some(key)) => Ok(Some(key.clone())),
        (Some(true), None) => Err(ConfigError::MissingCredential(env_name)),
        (None, None) => {
            info!(provider, "No API key; skipping provider");
            Ok(None)
        }
    }
}

/// Build every adapter the configuration and credentials allow, in the
/// fixed fetch order: NewsAPI, GNews, Mediastack, then each feed.
pub fn from_settings(
    settings: &Settings,
    credentials: &Credentials,
) -> Result<Vec<Source>, ConfigError> {
    let query = settings.query();
    let mut sources = Vec::new();

    if let Some(key) = provider_key(
        "newsapi",
        "NEWS_API_KEY",
        &settings.newsapi,
        credentials.news_api.as_ref(),
    )? {
        sources.push(Source::NewsApi(newsapi::NewsApi::new(
            key,
            query.clone(),
            &settings.newsapi,
        )));
    }
    if let Some(key) = provider_key(
        "gnews",
        "GNEWS_API_KEY",
        &settings.gnews,
        credentials.gnews.as_ref(),
    )? {
        sources.push(Source::GNews(gnews::GNews::new(
            key,
            query.clone(),
            &settings.gnews,
        )));
    }
    if let Some(key) = provider_key(
        "mediastack",
        "MEDIASTACK_API_KEY",
        &settings.mediastack,
        credentials.mediastack.as_ref(),
    )? {
        sources.push(Source::Mediastack(mediastack::Mediastack::new(
            key,
            query.clone(),
            &settings.mediastack,
        )));
    }
    for feed in &settings.rss_feeds {
        sources.push(Source::Rss(rss::RssFeed::new(
            feed.clone(),
            settings.rss,
            settings.keyword.clone(),
        )));
    }

    debug!(count = sources.len(), "Configured sources");
    Ok(sources)
}

/// Resolve `path` against a provider root, honouring an override.
///
/// The root must end in `/` for [`Url::join`] to keep its last segment, so
/// one is appended when missing.
pub(crate) fn endpoint(
    base_override: Option<&str>,
    default_base: &str,
    path: &str,
) -> Result<Url, SourceError> {
    let base = base_override.unwrap_or(default_base);
    let base = if base.ends_with('/') {
        Url::parse(base)?
    } else {
        Url::parse(&format!("{base}/"))?
    };
    Ok(base.join(path)?)
}

/// Append the present `(name, value)` pairs; absent values are omitted.
pub(crate) fn query_pairs(pairs: &[(&'static str, Option<String>)]) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .filter_map(|(k, v)| v.clone().map(|v| (*k, v)))
        .collect()
}

/// Envelope shared by the JSON providers: the entries live under one named
/// array. Entries stay raw so a single malformed one can be skipped.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

/// Which top-level array of the [`Envelope`] holds the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryArray {
    /// `articles`: NewsAPI and GNews.
    Articles,
    /// `data`: Mediastack.
    Data,
}

impl EntryArray {
    fn key(self) -> &'static str {
        match self {
            EntryArray::Articles => "articles",
            EntryArray::Data => "data",
        }
    }

    fn select(self, envelope: Envelope) -> Result<Vec<serde_json::Value>, SourceError> {
        match self {
            EntryArray::Articles => envelope.articles,
            EntryArray::Data => envelope.data,
        }
        .ok_or(SourceError::MissingField(self.key()))
    }
}

/// GET `url` with `params`, require 2xx, and decode each entry of the
/// `array` as `T`, skipping entries that do not fit.
pub(crate) async fn get_entries<T: DeserializeOwned>(
    http: &reqwest::Client,
    provider: &'static str,
    url: Url,
    params: &[(&'static str, String)],
    array: EntryArray,
) -> Result<Vec<T>, SourceError> {
    let body = http
        .get(url)
        .query(params)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let envelope: Envelope = serde_json::from_str(&body)?;
    let raw = array.select(envelope)?;

    let total = raw.len();
    let entries: Vec<T> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(provider, error = %e, "Skipping malformed entry");
                None
            }
        })
        .collect();
    debug!(provider, total, decoded = entries.len(), "Decoded provider entries");
    Ok(entries)
}

/// `source: { name }` object used by NewsAPI and GNews.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct NamedSource {
    pub name: Option<String>,
}

/// Entry shape shared by NewsAPI and GNews.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HeadlineEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<NamedSource>,
    pub published_at: Option<String>,
}

impl HeadlineEntry {
    pub fn into_article(self, fallback_source: &str) -> Option<Article> {
        let source = self
            .source
            .and_then(|s| s.name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_source.to_string());
        Article::from_api_fields(
            self.title,
            self.description,
            self.content,
            self.url,
            source,
            self.published_at,
        )
    }
}
