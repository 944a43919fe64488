//! [Mediastack](https://mediastack.com) adapter.
//!
//! Results come back under `data`, with snake_case timestamps and a plain
//! string `source`. There is no body text, so `content` repeats the
//! description.

use super::{EntryArray, endpoint, get_entries, query_pairs};
use crate::config::{ProviderSettings, Query};
use crate::error::SourceError;
use crate::models::Article;
use serde::Deserialize;
use tracing::{info, instrument};

const DEFAULT_BASE: &str = "http://api.mediastack.com/v1/";

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<String>,
    published_at: Option<String>,
}

impl Entry {
    fn into_article(self) -> Option<Article> {
        let source = self
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Mediastack".to_string());
        let content = self.description.clone();
        Article::from_api_fields(
            self.title,
            self.description,
            content,
            self.url,
            source,
            self.published_at,
        )
    }
}

#[derive(Clone)]
pub struct Mediastack {
    access_key: String,
    query: Query,
    base_url: Option<String>,
}

impl std::fmt::Debug for Mediastack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediastack")
            .field("access_key", &"<redacted>")
            .field("query", &self.query)
            .finish()
    }
}

impl Mediastack {
    pub fn new(access_key: String, query: Query, settings: &ProviderSettings) -> Self {
        Self {
            access_key,
            query,
            base_url: settings.base_url.clone(),
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let q = &self.query;
        query_pairs(&[
            ("access_key", Some(self.access_key.clone())),
            ("languages", Some(q.language.clone())),
            ("countries", q.country.clone()),
            ("categories", q.category.clone()),
            ("keywords", q.keyword.clone()),
            ("limit", Some(q.page_size.to_string())),
            ("sort", Some("published_desc".to_string())),
        ])
    }

    #[instrument(level = "info", skip_all)]
    pub async fn fetch(&self, http: &reqwest::Client) -> Result<Vec<Article>, SourceError> {
        let url = endpoint(self.base_url.as_deref(), DEFAULT_BASE, "news")?;
        let entries: Vec<Entry> =
            get_entries(http, "mediastack", url, &self.params(), EntryArray::Data).await?;
        let total = entries.len();
        let articles: Vec<Article> = entries.into_iter().filter_map(Entry::into_article).collect();
        info!(total, kept = articles.len(), "Fetched Mediastack articles");
        Ok(articles)
    }
}
