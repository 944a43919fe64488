//! [GNews](https://gnews.io) adapter.

use super::{EntryArray, HeadlineEntry, endpoint, get_entries, query_pairs};
use crate::config::{ApiMode, ProviderSettings, Query};
use crate::error::SourceError;
use crate::models::Article;
use tracing::{info, instrument};

const DEFAULT_BASE: &str = "https://gnews.io/api/v4/";

#[derive(Clone)]
pub struct GNews {
    token: String,
    query: Query,
    mode: ApiMode,
    base_url: Option<String>,
}

impl std::fmt::Debug for GNews {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GNews")
            .field("token", &"<redacted>")
            .field("query", &self.query)
            .field("mode", &self.mode)
            .finish()
    }
}

impl GNews {
    pub fn new(token: String, query: Query, settings: &ProviderSettings) -> Self {
        Self {
            token,
            query,
            mode: settings.mode,
            base_url: settings.base_url.clone(),
        }
    }

    fn request(&self) -> (&'static str, Vec<(&'static str, String)>) {
        let q = &self.query;
        match self.mode {
            // GNews scopes headlines to the US when no country is given.
            ApiMode::TopHeadlines => (
                "top-headlines",
                query_pairs(&[
                    ("token", Some(self.token.clone())),
                    ("lang", Some(q.language.clone())),
                    ("country", Some(q.country.clone().unwrap_or_else(|| "us".into()))),
                    ("category", q.category.clone()),
                    ("max", Some(q.page_size.to_string())),
                    ("q", q.keyword.clone()),
                ]),
            ),
            ApiMode::Search => (
                "search",
                query_pairs(&[
                    ("q", q.keyword.clone()),
                    ("lang", Some(q.language.clone())),
                    ("token", Some(self.token.clone())),
                    ("max", Some(q.page_size.to_string())),
                ]),
            ),
        }
    }

    #[instrument(level = "info", skip_all, fields(mode = ?self.mode))]
    pub async fn fetch(&self, http: &reqwest::Client) -> Result<Vec<Article>, SourceError> {
        let (path, params) = self.request();
        let url = endpoint(self.base_url.as_deref(), DEFAULT_BASE, path)?;
        let entries: Vec<HeadlineEntry> =
            get_entries(http, "gnews", url, &params, EntryArray::Articles).await?;
        let total = entries.len();
        let articles: Vec<Article> = entries
            .into_iter()
            .filter_map(|e| e.into_article("GNews"))
            .collect();
        info!(total, kept = articles.len(), "Fetched GNews articles");
        Ok(articles)
    }
}
