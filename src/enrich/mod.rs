//! Optional enrichment: fetch each article's page, keep its body text and
//! build a short extractive summary.
//!
//! A page that cannot be fetched or parsed yields empty text, never an
//! error. Articles are processed one at a time.

pub mod text;

use crate::config::ExpanderSettings;
use crate::models::{Article, ExpandedArticle};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub use text::{extract_paragraphs, summarize};

/// Fetches article pages with a browser-like client.
#[derive(Debug, Clone)]
pub struct Expander {
    http: reqwest::Client,
    min_paragraph_chars: usize,
    max_sentences: usize,
}

impl Expander {
    /// Build the page client: browser `User-Agent` and a per-request
    /// timeout, unlike the provider client.
    pub fn new(settings: &ExpanderSettings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            min_paragraph_chars: settings.min_paragraph_chars,
            max_sentences: settings.max_sentences,
        })
    }

    /// Body text of the page at `url`.
    ///
    /// # Arguments
    ///
    /// * `url` - Article landing page
    ///
    /// # Returns
    ///
    /// Paragraphs longer than the configured threshold, one per line. Any
    /// request, status or decode failure yields `""`.
    #[instrument(level = "info", skip_all, fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> String {
        let html = match self.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(error = %e, "Page fetch failed; treating as no content");
                return String::new();
            }
        };
        let text = extract_paragraphs(&html, self.min_paragraph_chars);
        debug!(bytes = html.len(), text_chars = text.len(), "Extracted page text");
        text
    }

    async fn fetch_html(&self, url: &str) -> Result<String, reqwest::Error> {
        self.http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    /// Fetch and summarize one article.
    pub async fn expand(&self, article: Article) -> ExpandedArticle {
        let full_text = self.fetch_text(&article.url).await;
        let summary = summarize(&full_text, self.max_sentences);
        ExpandedArticle {
            article,
            full_text,
            summary,
        }
    }

    /// Expand every article, sequentially, preserving order.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn expand_all(&self, articles: Vec<Article>) -> Vec<ExpandedArticle> {
        let expanded: Vec<ExpandedArticle> = stream::iter(articles)
            .then(|article| self.expand(article))
            .collect()
            .await;
        let with_text = expanded.iter().filter(|e| !e.full_text.is_empty()).count();
        info!(total = expanded.len(), with_text, "Expanded articles");
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::article;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><body>
        <nav><p>Home</p></nav>
        <p>The central bank held rates steady on Wednesday, citing slowing inflation. Analysts had expected the move.</p>
        <p>Subscribe now!</p>
        <p>Markets rose modestly after the announcement, with bond yields slipping across maturities.</p>
    </body></html>"#;

    fn expander() -> Expander {
        Expander::new(&ExpanderSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn fetches_with_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let text = expander().fetch_text(&format!("{}/story", server.uri())).await;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("The central bank"));
    }

    #[tokio::test]
    async fn failures_become_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(PAGE))
            .mount(&server)
            .await;

        assert_eq!(expander().fetch_text(&format!("{}/gone", server.uri())).await, "");
        assert_eq!(expander().fetch_text("http://127.0.0.1:9/closed").await, "");
        assert_eq!(expander().fetch_text("not a url").await, "");
    }

    #[tokio::test]
    async fn expand_all_keeps_order_and_summarizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let articles = vec![
            article("Rates", &format!("{}/rates", server.uri()), None),
            article("Missing", &format!("{}/missing", server.uri()), None),
        ];
        let expanded = expander().expand_all(articles).await;

        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[0].article.title, "Rates");
        assert_eq!(
            expanded[0].summary,
            "The central bank held rates steady on Wednesday, citing slowing inflation. Analysts had expected the move."
        );
        assert_eq!(expanded[1].article.title, "Missing");
        assert!(expanded[1].full_text.is_empty());
        assert!(expanded[1].summary.is_empty());
    }
}
