//! Language-model summaries over an OpenAI-compatible chat API.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait defining async LLM interaction
//! - [`ChatClient`]: `POST {base}/chat/completions` implementation
//! - [`summarize_news_item`]: builds the prompt and substitutes a
//!   placeholder when the call fails
//!
//! There is no retry: a failed call yields the placeholder once.

use crate::config::LlmSettings;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Returned when the model cannot be reached or answers with nothing.
pub const SUMMARY_PLACEHOLDER: &str = "Summary not available.";

/// Trait for async LLM interaction.
///
/// Implementors send text to a model and return its reply. The seam lets
/// tests substitute a canned responder.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client for any OpenAI-compatible endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: Url,
    settings: LlmSettings,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.settings.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl ChatClient {
    pub fn new(
        http: reqwest::Client,
        api_key: String,
        settings: &LlmSettings,
    ) -> Result<Self, url::ParseError> {
        let base = if settings.base_url.ends_with('/') {
            settings.base_url.clone()
        } else {
            format!("{}/", settings.base_url)
        };
        let endpoint = Url::parse(&base)?.join("chat/completions")?;
        Ok(Self {
            http,
            api_key,
            endpoint,
            settings: settings.clone(),
        })
    }
}

impl AskAsync for ChatClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.settings.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: text,
            }],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        let body = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(&request)?)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let response: ChatResponse = serde_json::from_str(&body)?;
        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or("model returned no content")?;
        info!(
            elapsed_ms = t0.elapsed().as_millis(),
            chars = reply.len(),
            "Chat completion succeeded"
        );
        debug!(preview = %truncate_for_log(&reply, 200), "Model reply");
        Ok(reply)
    }
}

/// Prompt asking for a gist and a longer explanation of one story.
pub fn summary_prompt(title: &str, content: &str) -> String {
    format!(
        "News Title: {title}\n\n\
         Full Content: {content}\n\n\
         Give me:\n\
         1. A short gist (1-2 lines)\n\
         2. A detailed explanation (2-3 paragraphs)\n"
    )
}

/// Ask the model about one story; any failure yields
/// [`SUMMARY_PLACEHOLDER`].
#[instrument(level = "info", skip_all, fields(title = %title))]
pub async fn summarize_news_item<A>(asker: &A, title: &str, content: &str) -> String
where
    A: AskAsync<Response = String>,
{
    match asker.ask(&summary_prompt(title, content)).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(error = %e, "Summarization failed; using placeholder");
            SUMMARY_PLACEHOLDER.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records prompts and replies with a canned answer.
    struct Canned {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl AskAsync for Canned {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.prompts.lock().unwrap().push(text.to_string());
            self.reply.map(str::to_string).ok_or_else(|| "boom".into())
        }
    }

    #[tokio::test]
    async fn prompt_carries_title_and_content() {
        let asker = Canned {
            reply: Some("Gist. Explanation."),
            prompts: Mutex::new(Vec::new()),
        };
        let summary = summarize_news_item(&asker, "Dam opens", "Water flows.").await;
        assert_eq!(summary, "Gist. Explanation.");

        let prompts = asker.prompts.lock().unwrap();
        assert!(prompts[0].contains("News Title: Dam opens"));
        assert!(prompts[0].contains("Full Content: Water flows."));
        assert!(prompts[0].contains("A short gist (1-2 lines)"));
    }

    #[tokio::test]
    async fn failure_yields_placeholder() {
        let asker = Canned {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        };
        assert_eq!(
            summarize_news_item(&asker, "t", "c").await,
            SUMMARY_PLACEHOLDER
        );
    }

    fn client(server: &MockServer) -> ChatClient {
        let settings = LlmSettings {
            base_url: format!("{}/v1", server.uri()),
            ..LlmSettings::default()
        };
        ChatClient::new(reqwest::Client::new(), "sk-test".into(), &settings).unwrap()
    }

    #[tokio::test]
    async fn chat_client_posts_completion_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-4", "max_tokens": 500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "  Short gist.\n\nLonger take.  "},
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let summary = summarize_news_item(&client(&server), "t", "c").await;
        assert_eq!(summary, "Short gist.\n\nLonger take.");
    }

    #[tokio::test]
    async fn chat_client_error_status_yields_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        assert_eq!(
            summarize_news_item(&client(&server), "t", "c").await,
            SUMMARY_PLACEHOLDER
        );
    }

    #[tokio::test]
    async fn empty_choices_yield_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        assert_eq!(
            summarize_news_item(&client(&server), "t", "c").await,
            SUMMARY_PLACEHOLDER
        );
    }
}
