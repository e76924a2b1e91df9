//! HTTP client for OpenAI-compatible chat completion APIs (Groq by default).

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::LlmConfig;

use super::LanguageModel;
use super::error::{ApiErrorResponse, LlmError};
use super::types::{Completion, CompletionRequest, WireRequest, WireResponse};

/// Chat completion client.
///
/// Built even when no API key is configured; every call then fails fast with
/// [`LlmError::MissingApiKey`] so callers can degrade instead of crashing.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<ChatClientInner>,
}

struct ChatClientInner {
    /// `None` when no API key is configured.
    client: Option<reqwest::Client>,
    endpoint: String,
    model: String,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key contains invalid header characters or
    /// the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = match &config.api_key {
            Some(api_key) => {
                let mut bearer =
                    HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
                        .map_err(|_| LlmError::Unauthorized("invalid API key format".to_owned()))?;
                bearer.set_sensitive(true);

                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                headers.insert(AUTHORIZATION, bearer);

                Some(
                    reqwest::Client::builder()
                        .default_headers(headers)
                        .timeout(config.timeout)
                        .build()?,
                )
            }
            None => {
                tracing::warn!("GROQ_API_KEY not set; assistant replies will be degraded");
                None
            }
        };

        Ok(Self {
            inner: Arc::new(ChatClientInner {
                client,
                endpoint: format!(
                    "{}/chat/completions",
                    config.base_url.as_str().trim_end_matches('/')
                ),
                model: config.model.clone(),
            }),
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.client.is_some()
    }

    /// Model name sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.inner.model
    }

    #[instrument(skip(self, request), fields(model = %self.inner.model, tools = request.tools.len()))]
    async fn send(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let client = self.inner.client.as_ref().ok_or(LlmError::MissingApiKey)?;
        let body = WireRequest::new(&self.inner.model, &request);

        let response = client.post(&self.inner.endpoint).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let text = response.text().await?;
        let parsed: WireResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::Parse(format!("Failed to parse response: {e}")))?;

        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;
        Ok(choice.message.into())
    }
}

impl LanguageModel for ChatClient {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<Completion, LlmError>> + Send {
        self.send(request)
    }
}

/// Map an error status code to an [`LlmError`].
async fn handle_error_status(status: reqwest::StatusCode, response: reqwest::Response) -> LlmError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return LlmError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return LlmError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_error) => LlmError::Api {
                error_type: api_error
                    .error
                    .error_type
                    .unwrap_or_else(|| status.as_u16().to_string()),
                message: api_error.error.message,
            },
            Err(_) => LlmError::Api {
                error_type: status.as_u16().to_string(),
                message: body,
            },
        },
        Err(e) => LlmError::Http(e),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use url::Url;

    use super::*;

    fn config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            api_key: api_key.map(|k| SecretString::from(k.to_owned())),
            base_url: Url::parse("https://api.groq.com/openai/v1/").expect("url"),
            model: "llama-3.3-70b-versatile".to_owned(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = ChatClient::new(&config(Some("gsk_test"))).expect("client");
        assert_eq!(
            client.inner.endpoint,
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert!(client.is_configured());
    }

    #[tokio::test]
    async fn test_missing_key_fails_fast() {
        let client = ChatClient::new(&config(None)).expect("client");
        assert!(!client.is_configured());
        let err = client
            .complete(CompletionRequest::new("sys", "hi"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn test_chat_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ChatClient>();
    }
}
