//! Structured-output completion clients.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use ktable_core::config::LlmSettings;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::response::ResponseModel;
use crate::types::CompletionRequest;

/// Sends a structured completion request and returns the raw JSON text the
/// model produced.
pub trait CompletionClient: Send + Sync {
    /// Run one completion.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

impl<C: CompletionClient> CompletionClient for Arc<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.as_ref().complete(request).await
    }
}

/// Client for an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
}

// The key never reaches log output.
impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.trim().is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &key)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Create a client for `base_url` (without the `/v1` suffix).
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] if no API key is configured.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        if !settings.has_credentials() {
            return Err(LlmError::ConfigError("no OpenAI API key configured".into()));
        }
        Ok(Self::new(settings.base_url.clone(), settings.openai_api_key.trim()))
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = self.endpoint();
        let body = request.to_request_json();

        let start = Instant::now();
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), latency_ms, "chat completions request failed");
            return Err(map_status(status, &text));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        debug!(
            model = %request.model,
            schema = %request.response_format.name,
            latency_ms,
            "chat completion received"
        );

        extract_content(&json)
    }
}

/// Map a non-success HTTP status onto an error, pulling the API's error
/// message out of the body when there is one.
fn map_status(status: StatusCode, body: &str) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::Authentication,
        429 => LlmError::RateLimited,
        code => {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(ToOwned::to_owned))
                .unwrap_or_else(|| body.to_string());
            LlmError::Api {
                status: code,
                message,
            }
        }
    }
}

/// Extract the assistant message text from a chat completions response.
fn extract_content(response: &Value) -> Result<String, LlmError> {
    let message = &response["choices"][0]["message"];
    if let Some(refusal) = message["refusal"].as_str() {
        return Err(LlmError::Refused(refusal.to_string()));
    }
    match message["content"].as_str() {
        Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
        _ => Err(LlmError::EmptyResponse),
    }
}

/// A client with no backend. Every call fails with [`LlmError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClient;

impl CompletionClient for NoopClient {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
        Err(LlmError::Unavailable("no LLM provider configured".into()))
    }
}

/// Parse model output into `T` and run its validation.
///
/// # Errors
///
/// [`LlmError::ParseError`] if `text` is not JSON at all,
/// [`LlmError::SchemaValidation`] if it is JSON of the wrong shape or fails
/// [`ResponseModel::validate`].
pub fn parse_structured<T: ResponseModel>(text: &str) -> Result<T, LlmError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| LlmError::ParseError(format!("{e}; raw text: '{text}'")))?;
    let model: T = serde_json::from_value(value)
        .map_err(|e| LlmError::SchemaValidation(format!("{}: {e}", T::NAME)))?;
    model
        .validate()
        .map_err(|e| LlmError::SchemaValidation(format!("{}: {e}", T::NAME)))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{KeywordsResponse, SchemaResponse};
    use crate::types::{Message, ResponseFormat};
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".into(),
            messages: vec![Message::user("Extract keywords")],
            response_format: ResponseFormat::for_model::<KeywordsResponse>(KeywordsResponse::NAME, true),
        }
    }

    fn completion(message: Value) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": "gpt-4o",
            "choices": [{ "index": 0, "message": message, "finish_reason": "stop" }],
        })
    }

    async fn server_returning(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "response_format": {
                    "type": "json_schema",
                    "json_schema": { "name": "keywords_response", "strict": true }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": r#"{"keywords":["revenue"]}"#,
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(server.uri(), "sk-test");
        let text = client.complete(&request()).await.expect("should succeed");
        assert_eq!(text, r#"{"keywords":["revenue"]}"#);
    }

    #[tokio::test]
    async fn maps_auth_error() {
        let server = server_returning(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key", "type": "invalid_request_error" }
        })))
        .await;
        let err = OpenAiClient::new(server.uri(), "bad").complete(&request()).await.expect_err("401");
        assert!(matches!(err, LlmError::Authentication), "got {err:?}");
    }

    #[tokio::test]
    async fn maps_rate_limit() {
        let server = server_returning(ResponseTemplate::new(429)).await;
        let err = OpenAiClient::new(server.uri(), "k").complete(&request()).await.expect_err("429");
        assert!(matches!(err, LlmError::RateLimited), "got {err:?}");
    }

    #[tokio::test]
    async fn maps_server_error_with_message() {
        let server = server_returning(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "The server had an error" }
        })))
        .await;
        let err = OpenAiClient::new(server.uri(), "k").complete(&request()).await.expect_err("500");
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "The server had an error");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn maps_refusal() {
        let server = server_returning(ResponseTemplate::new(200).set_body_json(completion(json!({
            "role": "assistant",
            "content": null,
            "refusal": "I can't help with that.",
        }))))
        .await;
        let err = OpenAiClient::new(server.uri(), "k").complete(&request()).await.expect_err("refused");
        assert!(matches!(err, LlmError::Refused(ref r) if r.contains("can't help")), "got {err:?}");
    }

    #[tokio::test]
    async fn maps_missing_content() {
        let server = server_returning(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] }))).await;
        let err = OpenAiClient::new(server.uri(), "k").complete(&request()).await.expect_err("empty");
        assert!(matches!(err, LlmError::EmptyResponse), "got {err:?}");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_ignored() {
        let server = server_returning(ResponseTemplate::new(200).set_body_json(completion(json!({
            "role": "assistant",
            "content": "{}",
        }))))
        .await;
        let client = OpenAiClient::new(format!("{}/", server.uri()), "k");
        assert_eq!(client.complete(&request()).await.expect("ok"), "{}");
    }

    #[tokio::test]
    async fn noop_client_is_unavailable() {
        let err = NoopClient.complete(&request()).await.expect_err("noop");
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[test]
    fn from_settings_requires_a_key() {
        let settings = LlmSettings::default();
        assert!(matches!(OpenAiClient::from_settings(&settings), Err(LlmError::ConfigError(_))));

        let settings = LlmSettings {
            openai_api_key: " sk-live ".into(),
            ..LlmSettings::default()
        };
        let client = OpenAiClient::from_settings(&settings).expect("configured");
        assert_eq!(client.api_key, "sk-live");
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let client = OpenAiClient::new("https://api.openai.com", "sk-very-secret");
        let printed = format!("{client:?}");
        assert!(!printed.contains("sk-very-secret"), "{printed}");
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("https://api.openai.com"));

        let service = crate::QueryService::new(client, "gpt-4o");
        assert!(!format!("{service:?}").contains("sk-very-secret"));

        assert!(format!("{:?}", OpenAiClient::new("http://localhost", "")).contains("<unset>"));
    }

    #[test]
    fn parse_structured_distinguishes_syntax_from_shape() {
        let ok: KeywordsResponse = parse_structured(r#"{"keywords":["a","b"]}"#).expect("valid");
        assert_eq!(ok.keywords, vec!["a", "b"]);

        assert!(matches!(
            parse_structured::<KeywordsResponse>("not json"),
            Err(LlmError::ParseError(_))
        ));
        assert!(matches!(
            parse_structured::<KeywordsResponse>(r#"{"keywords": 3}"#),
            Err(LlmError::SchemaValidation(_))
        ));
        assert!(matches!(
            parse_structured::<SchemaResponse>(
                r#"{"relationships":[{"head":"","relation":"owns","tail":"Asset"}]}"#
            ),
            Err(LlmError::SchemaValidation(_))
        ));
    }
}
