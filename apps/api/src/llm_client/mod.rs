//! Inference client: the single point of entry for text-generation calls.
//!
//! No other module talks to the inference service directly. The recommendation
//! pipeline depends on the `InferenceClient` trait so tests can script responses.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::InferenceConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited by inference service")]
    RateLimited,

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("prompt is empty")]
    EmptyPrompt,
}

impl LlmError {
    /// Only failures where the upstream cannot have produced a generation are
    /// retried: refused/failed connections and 5xx statuses. Timeouts are not.
    fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_connect(),
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Sends a prompt to a text-generation service and returns the raw generated text.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
    use_cache: bool,
}

/// Hosted inference API client (bearer-token authenticated).
#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    url: String,
    max_new_tokens: u32,
    temperature: f32,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HuggingFaceClient {
    pub fn new(api_key: String, config: &InferenceConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("Inference API key must not be empty");
        }

        let config = config.clone().bounded();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            url: config.url,
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_secs(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerationRequest<'a> {
        GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
                use_cache: true,
            },
        }
    }

    async fn send_once(&self, body: &GenerationRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        debug!("Inference API responded with {status}");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        let text = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        decode_generated_text(&text)
    }
}

#[async_trait]
impl InferenceClient for HuggingFaceClient {
    /// Retries connection failures and 5xx responses with exponential backoff.
    /// A successful response always ends the loop.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if prompt.trim().is_empty() {
            return Err(LlmError::EmptyPrompt);
        }

        let body = self.request_body(prompt);
        let mut attempt = 0;

        loop {
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(self.retry_base_delay, attempt);
                    warn!(
                        "Inference call failed ({e}), retry {}/{} after {}ms",
                        attempt,
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Exponential backoff: base, 2*base, 4*base, ... Saturates instead of overflowing.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

fn classify_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(e)
    }
}

/// Reads `generated_text` from the first element of the response list.
fn decode_generated_text(body: &str) -> Result<String, LlmError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LlmError::UnexpectedShape(format!("response is not JSON: {e}")))?;

    let first = value
        .as_array()
        .ok_or_else(|| LlmError::UnexpectedShape("response is not a list".to_string()))?
        .first()
        .ok_or_else(|| LlmError::UnexpectedShape("response list is empty".to_string()))?;

    first
        .get("generated_text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            LlmError::UnexpectedShape("first element has no generated_text string".to_string())
        })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};

    use super::*;

    #[test]
    fn test_decode_generated_text() {
        let body = r#"[{"generated_text": "{\"matches\": []}"}]"#;
        assert_eq!(decode_generated_text(body).unwrap(), r#"{"matches": []}"#);
    }

    #[test]
    fn test_decode_rejects_object_body() {
        let err = decode_generated_text(r#"{"generated_text": "hi"}"#).unwrap_err();
        assert!(matches!(err, LlmError::UnexpectedShape(_)));
    }

    #[test]
    fn test_decode_rejects_empty_list() {
        assert!(matches!(
            decode_generated_text("[]"),
            Err(LlmError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_string_text() {
        assert!(matches!(
            decode_generated_text(r#"[{"generated_text": 42}]"#),
            Err(LlmError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let client = HuggingFaceClient::new("key".into(), &InferenceConfig::default()).unwrap();
        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(body["inputs"], "hello");
        assert_eq!(body["parameters"]["max_new_tokens"], 1000);
        assert_eq!(body["parameters"]["return_full_text"], false);
        assert_eq!(body["parameters"]["use_cache"], true);
        assert!((body["parameters"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_new_rejects_blank_api_key() {
        assert!(HuggingFaceClient::new("  ".into(), &InferenceConfig::default()).is_err());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(LlmError::Api {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!LlmError::Api {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!LlmError::RateLimited.is_retryable());
        assert!(!LlmError::Timeout.is_retryable());
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 1), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(4));
        assert_eq!(backoff_delay(base, 40), base.saturating_mul(u32::MAX));
    }

    #[test]
    fn test_new_bounds_retries() {
        let config = InferenceConfig {
            max_retries: 1_000,
            timeout_secs: 0,
            ..InferenceConfig::default()
        };
        let client = HuggingFaceClient::new("key".into(), &config).unwrap();
        assert_eq!(client.max_retries, crate::config::MAX_INFERENCE_RETRIES);
    }

    // ── Local fake upstream ─────────────────────────────────────────────────

    #[derive(Clone)]
    struct FakeUpstream {
        responses: Arc<Vec<(u16, String)>>,
        hits: Arc<AtomicUsize>,
        delay: Duration,
        last_request: Arc<Mutex<Option<(String, Value)>>>,
    }

    async fn upstream_handler(
        State(upstream): State<FakeUpstream>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (axum::http::StatusCode, String) {
        let n = upstream.hits.fetch_add(1, Ordering::SeqCst);
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        *upstream.last_request.lock().unwrap() = Some((auth, body));
        tokio::time::sleep(upstream.delay).await;
        let (status, body) = upstream.responses[n.min(upstream.responses.len() - 1)].clone();
        (axum::http::StatusCode::from_u16(status).unwrap(), body)
    }

    async fn spawn_upstream(responses: Vec<(u16, &str)>, delay: Duration) -> (String, FakeUpstream) {
        let upstream = FakeUpstream {
            responses: Arc::new(
                responses
                    .into_iter()
                    .map(|(s, b)| (s, b.to_string()))
                    .collect(),
            ),
            hits: Arc::new(AtomicUsize::new(0)),
            delay,
            last_request: Arc::new(Mutex::new(None)),
        };
        let app = Router::new()
            .route("/generate", post(upstream_handler))
            .with_state(upstream.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/generate"), upstream)
    }

    fn client_for(url: String, max_retries: u32, timeout_secs: u64) -> HuggingFaceClient {
        let config = InferenceConfig {
            url,
            max_retries,
            timeout_secs,
            ..InferenceConfig::default()
        };
        let mut client = HuggingFaceClient::new("test-key".into(), &config).unwrap();
        client.retry_base_delay = Duration::from_millis(1);
        client
    }

    #[tokio::test]
    async fn test_generate_sends_bearer_token_and_returns_text() {
        let (url, upstream) = spawn_upstream(
            vec![(200, r#"[{"generated_text": "ok"}]"#)],
            Duration::ZERO,
        )
        .await;
        let client = client_for(url, 0, 5);

        let text = client.generate("prompt text").await.unwrap();

        assert_eq!(text, "ok");
        let (auth, body) = upstream.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(auth, "Bearer test-key");
        assert_eq!(body["inputs"], "prompt text");
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_prompt_without_calling() {
        let (url, upstream) = spawn_upstream(vec![(200, "[]")], Duration::ZERO).await;
        let client = client_for(url, 0, 5);

        assert!(matches!(client.generate("   ").await, Err(LlmError::EmptyPrompt)));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let (url, upstream) = spawn_upstream(vec![(429, "slow down")], Duration::ZERO).await;
        let client = client_for(url, 3, 5);

        assert!(matches!(client.generate("p").await, Err(LlmError::RateLimited)));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_retried_until_success() {
        let (url, upstream) = spawn_upstream(
            vec![
                (503, "loading"),
                (502, "bad gateway"),
                (200, r#"[{"generated_text": "done"}]"#),
            ],
            Duration::ZERO,
        )
        .await;
        let client = client_for(url, 2, 5);

        assert_eq!(client.generate("p").await.unwrap(), "done");
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_server_error_surfaces_after_retries_exhausted() {
        let (url, upstream) = spawn_upstream(vec![(500, "boom")], Duration::ZERO).await;
        let client = client_for(url, 1, 5);

        let err = client.generate("p").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, upstream) = spawn_upstream(vec![(401, "bad token")], Duration::ZERO).await;
        let client = client_for(url, 3, 5);

        assert!(matches!(
            client.generate("p").await,
            Err(LlmError::Api { status: 401, .. })
        ));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unexpected_success_body_is_shape_error() {
        let (url, _) = spawn_upstream(vec![(200, r#"{"error": "nope"}"#)], Duration::ZERO).await;
        let client = client_for(url, 2, 5);

        assert!(matches!(
            client.generate("p").await,
            Err(LlmError::UnexpectedShape(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let (url, upstream) = spawn_upstream(
            vec![(200, r#"[{"generated_text": "late"}]"#)],
            Duration::from_secs(3),
        )
        .await;
        let client = client_for(url, 2, 1);

        assert!(matches!(client.generate("p").await, Err(LlmError::Timeout)));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }
}
