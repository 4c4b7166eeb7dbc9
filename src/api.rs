//! LLM API interaction for article classification.
//!
//! [`AskAsync`] is the seam between the orchestrator and the completion
//! service; [`ChatCompletionClient`] implements it against any
//! OpenAI-compatible `/chat/completions` endpoint (OpenRouter by default).
//!
//! Each call is a single attempt. Failures are returned as
//! [`ClassifyError`] and the orchestrator substitutes an empty response.

use crate::error::{ClassifyError, ClassifyResult};
use crate::prompt::SYSTEM_PROMPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a model and return its raw text output.
pub trait AskAsync {
    /// Send `text` as the user message and return the model's reply.
    async fn ask(&self, text: &str) -> ClassifyResult<String>;

    /// Identifier of the model answering requests.
    fn model(&self) -> &str;
}

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 500,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    sampling: Sampling,
}

impl ChatCompletionClient {
    /// Create a client bound to one model and sampling configuration.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared reqwest client used for every request
    /// * `base_url` - API root, e.g. `https://openrouter.ai/api/v1`
    /// * `api_key` - Bearer token sent with each request
    /// * `model` - Model identifier reported in requests and run metadata
    /// * `sampling` - Temperature and token limit for completions
    ///
    /// # Returns
    ///
    /// The client, or a URL error if `<base_url>/chat/completions` cannot be
    /// formed.
    pub fn new(
        http: Client,
        base_url: &Url,
        api_key: String,
        model: String,
        sampling: Sampling,
    ) -> Result<Self, url::ParseError> {
        let endpoint = completions_endpoint(base_url)?;
        Ok(Self {
            http,
            endpoint,
            api_key,
            model,
            sampling,
        })
    }
}

/// Resolve `<base>/chat/completions`, tolerating a missing trailing slash.
fn completions_endpoint(base_url: &Url) -> Result<Url, url::ParseError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions")
}

impl AskAsync for ChatCompletionClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> ClassifyResult<String> {
        let t0 = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: self.sampling.temperature,
            max_tokens: self.sampling.max_tokens,
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ClassifyError::Transport)?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClassifyError::Auth {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClassifyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await.map_err(ClassifyError::Decode)?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ClassifyError::MissingChoice)?;
        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or(ClassifyError::EmptyContent)?;

        let dt = t0.elapsed();
        debug!(
            elapsed_ms = dt.as_millis() as u64,
            bytes = content.len(),
            "Completion received"
        );
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Ask once and collapse any failure into an empty response.
pub async fn ask_or_empty<A: AskAsync>(client: &A, prompt: &str) -> String {
    match client.ask(prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, model = client.model(), "AI analysis failed");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;
    use std::time::Duration;

    async fn client_for(server: &MockServer) -> ChatCompletionClient {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let base = Url::parse(&server.url("/api/v1")).unwrap();
        ChatCompletionClient::new(
            http,
            &base,
            "sk-test".to_string(),
            "meta-llama/llama-2-70b-chat".to_string(),
            Sampling::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_completions_endpoint_appends_path() {
        let base = Url::parse("https://openrouter.ai/api/v1").unwrap();
        assert_eq!(
            completions_endpoint(&base).unwrap().as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        let slashed = Url::parse("https://openrouter.ai/api/v1/").unwrap();
        assert_eq!(
            completions_endpoint(&slashed).unwrap().as_str(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_ask_sends_two_messages_and_sampling() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/v1/chat/completions")
                    .header("Authorization", "Bearer sk-test")
                    .json_body(json!({
                        "model": "meta-llama/llama-2-70b-chat",
                        "messages": [
                            {"role": "system", "content": SYSTEM_PROMPT},
                            {"role": "user", "content": "classify this"}
                        ],
                        "temperature": 0.3,
                        "max_tokens": 500
                    }));
                then.status(200).json_body(json!({
                    "id": "gen-1",
                    "choices": [
                        {"index": 0, "message": {"role": "assistant", "content": "{\"sentiment\":\"positive\"}"}}
                    ]
                }));
            })
            .await;

        let client = client_for(&server).await;
        let reply = client.ask("classify this").await.unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "{\"sentiment\":\"positive\"}");
    }

    #[tokio::test]
    async fn test_ask_maps_unauthorized_to_auth_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/chat/completions");
                then.status(401).body(r#"{"error":{"message":"No auth"}}"#);
            })
            .await;

        let err = client_for(&server).await.ask("x").await.unwrap_err();
        assert!(matches!(err, ClassifyError::Auth { status: 401 }));
    }

    #[tokio::test]
    async fn test_ask_maps_server_error_to_provider_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/chat/completions");
                then.status(502).body("upstream unavailable");
            })
            .await;

        let err = client_for(&server).await.ask("x").await.unwrap_err();
        match err {
            ClassifyError::Provider { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_without_choices_is_missing_choice() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let err = client_for(&server).await.ask("x").await.unwrap_err();
        assert!(matches!(err, ClassifyError::MissingChoice));
    }

    #[tokio::test]
    async fn test_ask_or_empty_swallows_failures() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/v1/chat/completions");
                then.status(200).json_body(json!({"choices": [{"message": {"content": null}}]}));
            })
            .await;

        let client = client_for(&server).await;
        assert_eq!(ask_or_empty(&client, "x").await, "");
    }
}
