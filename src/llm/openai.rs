//! OpenAI-compatible chat completions client

use super::{CompletionRequest, LanguageModel, RetryPolicy};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat completions client with a request timeout and bounded retry
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn attempt(&self, api_key: &str, body: &ChatRequest<'_>) -> Result<String, Attempt> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    Attempt::Transient(format!("request failed: {}", e))
                } else {
                    Attempt::Fatal(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = format!("API error ({}): {}", status, truncate(&text, 500));
            return Err(if is_retryable(status) {
                Attempt::Transient(message)
            } else {
                Attempt::Fatal(message)
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Attempt::Fatal(format!("invalid response body: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Attempt::Fatal("response contained no message content".to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("OPENAI_API_KEY is not configured".to_string()))?;

        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        let mut attempt = 0;
        loop {
            match self.attempt(api_key, &body).await {
                Ok(text) => {
                    log::debug!(
                        "Completion from {} ({} chars, attempt {})",
                        request.model,
                        text.len(),
                        attempt + 1
                    );
                    return Ok(text);
                }
                Err(Attempt::Transient(message)) if attempt < self.retry.max_retries => {
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    log::warn!(
                        "Transient model failure ({}), retry {}/{} in {:?}",
                        message,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(Attempt::Transient(message)) | Err(Attempt::Fatal(message)) => {
                    return Err(AppError::Upstream(message));
                }
            }
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}

enum Attempt {
    Transient(String),
    Fatal(String),
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o".into(),
            system_prompt: "system".into(),
            user_prompt: "user".into(),
            temperature: 0.3,
            max_output_tokens: 100,
        }
    }

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        }
    }

    /// Serve a fake completions endpoint that fails `failures` times first
    async fn fake_api(failures: usize, status: AxumStatus) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    move |State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>| async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        if n < failures {
                            return (status, Json(json!({"error": "busy"})));
                        }
                        let echo = body["messages"][1]["content"].as_str().unwrap_or("").to_string();
                        (
                            AxumStatus::OK,
                            Json(json!({"choices": [{"message": {"role": "assistant", "content": format!("echo: {}", echo)}}]})),
                        )
                    },
                ),
            )
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v1", addr), hits)
    }

    #[tokio::test]
    async fn test_missing_api_key_is_upstream_error() {
        let client = OpenAiClient::new(
            "http://127.0.0.1:9",
            Some("  ".into()),
            Duration::from_secs(1),
            fast_retry(0),
        )
        .unwrap();
        assert!(!client.has_api_key());
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let (base_url, hits) = fake_api(2, AxumStatus::SERVICE_UNAVAILABLE).await;
        let client =
            OpenAiClient::new(base_url, Some("key".into()), Duration::from_secs(5), fast_retry(3))
                .unwrap();

        let text = client.complete(request()).await.unwrap();
        assert_eq!(text, "echo: user");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_bounded_retries() {
        let (base_url, hits) = fake_api(10, AxumStatus::TOO_MANY_REQUESTS).await;
        let client =
            OpenAiClient::new(base_url, Some("key".into()), Duration::from_secs(5), fast_retry(2))
                .unwrap();

        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let (base_url, hits) = fake_api(10, AxumStatus::UNAUTHORIZED).await;
        let client =
            OpenAiClient::new(base_url, Some("key".into()), Duration::from_secs(5), fast_retry(3))
                .unwrap();

        let err = client.complete(request()).await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
