//! Data models shared by every stage of the pipeline.
//!
//! - [`Article`]: one normalized news item, whatever the provider
//! - [`SourceReport`]: the typed outcome of running one adapter
//! - [`ExpandedArticle`]: an article paired with its fetched text and summary

use crate::error::SourceError;
use crate::utils::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news item normalized from a provider response or a feed entry.
///
/// Field names serialize in camelCase to match the provider JSON shape
/// (`publishedAt`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Headline.
    pub title: String,
    /// Short teaser text.
    pub description: String,
    /// Longer body text when the provider supplies one.
    pub content: Option<String>,
    /// Link to the full article. Identity key for URL deduplication.
    pub url: String,
    /// Outlet or feed name.
    pub source: String,
    /// Raw publication timestamp as reported upstream.
    pub published_at: Option<String>,
}

impl Article {
    /// Build an article from API fields, enforcing the API-adapter rule:
    /// title, description and url must all be present and non-blank.
    ///
    /// Returns `None` for entries that should be skipped.
    pub fn from_api_fields(
        title: Option<String>,
        description: Option<String>,
        content: Option<String>,
        url: Option<String>,
        source: String,
        published_at: Option<String>,
    ) -> Option<Self> {
        let title = title.filter(|t| !t.trim().is_empty())?;
        let description = description.filter(|d| !d.trim().is_empty())?;
        let url = url.filter(|u| !u.trim().is_empty())?;
        Some(Self {
            title,
            description,
            content,
            url,
            source,
            published_at,
        })
    }

    /// Parsed publication time; missing or unparsable values are the oldest
    /// representable instant so they rank last.
    pub fn published(&self) -> DateTime<Utc> {
        self.published_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Text handed to summarizers: full content when known, else the teaser.
    pub fn body(&self) -> &str {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&self.description)
    }
}

/// The outcome of one adapter invocation.
#[derive(Debug)]
pub struct SourceReport {
    /// Provider or feed label used in logs.
    pub source: String,
    pub outcome: Result<Vec<Article>, SourceError>,
}

impl SourceReport {
    pub fn articles(&self) -> &[Article] {
        match &self.outcome {
            Ok(articles) => articles,
            Err(_) => &[],
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// An article enriched with the text of its landing page.
///
/// An empty `full_text` means nothing could be retrieved.
#[derive(Debug, Clone, Serialize)]
pub struct ExpandedArticle {
    pub article: Article,
    pub full_text: String,
    pub summary: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Article;

    /// Minimal valid article for tests.
    pub fn article(title: &str, url: &str, published_at: Option<&str>) -> Article {
        Article {
            title: title.to_string(),
            description: format!("About {title}"),
            content: None,
            url: url.to_string(),
            source: "Test Wire".to_string(),
            published_at: published_at.map(str::to_string),
        }
    }
}
