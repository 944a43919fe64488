//! [NewsAPI](https://newsapi.org) adapter.
//!
//! `top-headlines` takes country/category filters; `everything` is a
//! keyword search across all indexed outlets and ignores them.

use super::{EntryArray, HeadlineEntry, endpoint, get_entries, query_pairs};
use crate::config::{ApiMode, ProviderSettings, Query};
use crate::error::SourceError;
use crate::models::Article;
use tracing::{info, instrument};

const DEFAULT_BASE: &str = "https://newsapi.org/v2/";

#[derive(Clone)]
pub struct NewsApi {
    api_key: String,
    query: Query,
    mode: ApiMode,
    base_url: Option<String>,
}

impl std::fmt::Debug for NewsApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApi")
            .field("api_key", &"<redacted>")
            .field("query", &self.query)
            .field("mode", &self.mode)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl NewsApi {
    pub fn new(api_key: String, query: Query, settings: &ProviderSettings) -> Self {
        Self {
            api_key,
            query,
            mode: settings.mode,
            base_url: settings.base_url.clone(),
        }
    }

    fn request(&self) -> (&'static str, Vec<(&'static str, String)>) {
        let q = &self.query;
        match self.mode {
            ApiMode::TopHeadlines => (
                "top-headlines",
                query_pairs(&[
                    ("apiKey", Some(self.api_key.clone())),
                    ("language", Some(q.language.clone())),
                    ("country", q.country.clone()),
                    ("category", q.category.clone()),
                    ("q", q.keyword.clone()),
                    ("pageSize", Some(q.page_size.to_string())),
                ]),
            ),
            ApiMode::Search => (
                "everything",
                query_pairs(&[
                    ("apiKey", Some(self.api_key.clone())),
                    ("q", q.keyword.clone()),
                    ("language", Some(q.language.clone())),
                    ("pageSize", Some(q.page_size.to_string())),
                ]),
            ),
        }
    }

    #[instrument(level = "info", skip_all, fields(mode = ?self.mode))]
    pub async fn fetch(&self, http: &reqwest::Client) -> Result<Vec<Article>, SourceError> {
        let (path, params) = self.request();
        let url = endpoint(self.base_url.as_deref(), DEFAULT_BASE, path)?;
        let entries: Vec<HeadlineEntry> =
            get_entries(http, "newsapi", url, &params, EntryArray::Articles).await?;
        let total = entries.len();
        let articles: Vec<Article> = entries
            .into_iter()
            .filter_map(|e| e.into_article("NewsAPI"))
            .collect();
        info!(total, kept = articles.len(), "Fetched NewsAPI articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query() -> Query {
        Query {
            language: "en".into(),
            country: Some("us".into()),
            category: Some("technology".into()),
            keyword: None,
            page_size: 30,
        }
    }

    fn adapter(server: &MockServer, mode: ApiMode) -> NewsApi {
        let settings = ProviderSettings {
            enabled: None,
            mode,
            base_url: Some(format!("{}/v2/", server.uri())),
        };
        NewsApi::new("test-key".into(), query(), &settings)
    }

    #[tokio::test]
    async fn top_headlines_skips_entries_without_title_or_description() {
        let server = MockServer::start().await;
        let body = json!({
            "status": "ok",
            "totalResults": 4,
            "articles": [
                {
                    "source": {"id": null, "name": "The Verge"},
                    "title": "Chip makers rally",
                    "description": "Shares climbed.",
                    "content": "Shares climbed on Monday...",
                    "url": "https://example.com/chips",
                    "publishedAt": "2024-03-01T10:00:00Z"
                },
                {
                    "source": {"name": "Wire"},
                    "title": "[Removed]",
                    "description": null,
                    "url": "https://example.com/removed",
                    "publishedAt": "2024-03-01T09:00:00Z"
                },
                {
                    "source": {"name": "Wire"},
                    "title": "",
                    "description": "No headline",
                    "url": "https://example.com/blank",
                    "publishedAt": "2024-03-01T08:00:00Z"
                },
                {
                    "source": {"name": "Wire"},
                    "title": 42,
                    "description": "Wrong type",
                    "url": "https://example.com/bad"
                }
            ]
        });

        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("apiKey", "test-key"))
            .and(query_param("language", "en"))
            .and(query_param("country", "us"))
            .and(query_param("category", "technology"))
            .and(query_param("pageSize", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let articles = adapter(&server, ApiMode::TopHeadlines)
            .fetch(&reqwest::Client::new())
            .await
            .expect("fetch should succeed");

        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title, "Chip makers rally");
        assert_eq!(a.source, "The Verge");
        assert_eq!(a.content.as_deref(), Some("Shares climbed on Monday..."));
        assert_eq!(a.published_at.as_deref(), Some("2024-03-01T10:00:00Z"));
        assert!(articles.iter().all(|a| !a.title.is_empty() && !a.description.is_empty()));
    }

    #[tokio::test]
    async fn search_mode_hits_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("apiKey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"articles": []})))
            .mount(&server)
            .await;

        let articles = adapter(&server, ApiMode::Search)
            .fetch(&reqwest::Client::new())
            .await
            .expect("fetch should succeed");
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn http_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid"
            })))
            .mount(&server)
            .await;

        let result = adapter(&server, ApiMode::TopHeadlines)
            .fetch(&reqwest::Client::new())
            .await;
        assert!(matches!(result, Err(SourceError::Http(_))));
    }

    #[tokio::test]
    async fn non_json_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = adapter(&server, ApiMode::TopHeadlines)
            .fetch(&reqwest::Client::new())
            .await;
        assert!(matches!(result, Err(SourceError::Json(_))));
    }
}
