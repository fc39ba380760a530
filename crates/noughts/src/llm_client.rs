//! LLM API client abstraction for Gemini, OpenAI and Anthropic.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";

/// OpenAI error code for a 429 that is worth retrying.
const OPENAI_RATE_LIMIT_CODE: &str = "rate_limit_exceeded";

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini.
    Gemini,
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

impl LlmProvider {
    /// Default API base URL.
    pub fn default_api_base(self) -> &'static str {
        match self {
            LlmProvider::Gemini => GEMINI_API_BASE,
            LlmProvider::OpenAI => OPENAI_API_BASE,
            LlmProvider::Anthropic => ANTHROPIC_API_BASE,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// How rate-limited requests are retried.
///
/// The delay doubles after every rate-limited attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_new::new)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    provider: LlmProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
    retry: RetryPolicy,
    api_base: String,
}

impl LlmConfig {
    /// Creates a new LLM configuration with the default retry policy.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            retry: RetryPolicy::default(),
            api_base: provider.default_api_base().to_string(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Points requests at another API base, e.g. a proxy.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Gets the provider.
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    /// Gets the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the max tokens.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Gets the retry policy.
    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Gets the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Generates a completion, retrying with backoff while rate limited.
    #[instrument(skip(self, system_prompt, user_message), fields(provider = ?self.config.provider, model = %self.config.model))]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Generating completion");
        with_backoff(self.config.retry, move || async move {
            match self.config.provider {
                LlmProvider::Gemini => self.generate_gemini(system_prompt, user_message).await,
                LlmProvider::OpenAI => self.generate_openai(system_prompt, user_message).await,
                LlmProvider::Anthropic => {
                    self.generate_anthropic(system_prompt, user_message).await
                }
            }
        })
        .await
    }

    /// Generates a completion using Google Gemini.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_gemini(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Building Gemini API request");
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base, self.config.model
        );
        let request_body = serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": system_prompt }]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": user_message }]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens
            }
        });

        debug!("Sending request to Gemini");
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", self.config.api_key.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gemini API request failed");
                LlmError::new(
                    LlmErrorKind::Request,
                    format!("Gemini API request failed: {}", e),
                )
            })?;

        let response_json = read_json_response("Gemini", response).await?;

        let content = response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Gemini response");
                LlmError::new(
                    LlmErrorKind::MalformedResponse,
                    "Unexpected Gemini response format",
                )
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using Anthropic Claude.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_anthropic(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Building Anthropic API request");
        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": system_prompt,
            "messages": [
                {
                    "role": "user",
                    "content": user_message
                }
            ]
        });

        debug!("Sending request to Anthropic");
        let response = self
            .http
            .post(format!("{}/messages", self.config.api_base))
            .header("x-api-key", self.config.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                LlmError::new(
                    LlmErrorKind::Request,
                    format!("Anthropic API request failed: {}", e),
                )
            })?;

        let response_json = read_json_response("Anthropic", response).await?;

        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Anthropic response");
                LlmError::new(
                    LlmErrorKind::MalformedResponse,
                    "No text content in Anthropic response",
                )
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using OpenAI.
    #[instrument(skip(self, system_prompt, user_message))]
    async fn generate_openai(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, LlmError> {
        debug!("Creating OpenAI client");

        // Built-in retries off: rate limits go through `with_backoff` like
        // the other providers.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_key(self.config.api_key.clone())
                .with_api_base(self.config.api_base.clone()),
        )
        .with_backoff(no_retry);

        debug!("Building chat completion request");
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build system message");
                        LlmError::new(
                            LlmErrorKind::Request,
                            format!("Failed to build system message: {}", e),
                        )
                    })?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_message)
                    .build()
                    .map_err(|e| {
                        error!(error = ?e, "Failed to build user message");
                        LlmError::new(
                            LlmErrorKind::Request,
                            format!("Failed to build user message: {}", e),
                        )
                    })?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .max_completion_tokens(self.config.max_tokens)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build request");
                LlmError::new(
                    LlmErrorKind::Request,
                    format!("Failed to build request: {}", e),
                )
            })?;

        debug!("Sending request to OpenAI");
        let response = client.chat().create(request).await.map_err(|e| {
            let kind = openai_error_kind(&e);
            error!(error = ?e, %kind, "OpenAI API error");
            LlmError::new(kind, format!("OpenAI API error: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                LlmError::new(
                    LlmErrorKind::MalformedResponse,
                    "No content in OpenAI response",
                )
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

/// Classifies an async-openai error. Only `rate_limit_exceeded` counts as a
/// rate limit; quota errors also arrive as 429 but retrying won't help.
fn openai_error_kind(err: &OpenAIError) -> LlmErrorKind {
    match err {
        OpenAIError::ApiError(api)
            if api.code.as_deref() == Some(OPENAI_RATE_LIMIT_CODE)
                || api.r#type.as_deref() == Some(OPENAI_RATE_LIMIT_CODE) =>
        {
            LlmErrorKind::RateLimited
        }
        OpenAIError::JSONDeserialize(..) => LlmErrorKind::MalformedResponse,
        _ => LlmErrorKind::Request,
    }
}

/// Checks the status and parses the body of a provider response.
///
/// HTTP 429 maps to [`LlmErrorKind::RateLimited`] so the caller can back off.
async fn read_json_response(
    provider: &str,
    response: reqwest::Response,
) -> Result<serde_json::Value, LlmError> {
    let status = response.status();
    let response_text = response.text().await.map_err(|e| {
        error!(error = ?e, provider, "Failed to read response");
        LlmError::new(
            LlmErrorKind::Request,
            format!("Failed to read response: {}", e),
        )
    })?;

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        warn!(provider, "Rate limit exceeded");
        return Err(LlmError::new(
            LlmErrorKind::RateLimited,
            format!("{} rate limit exceeded", provider),
        ));
    }
    if !status.is_success() {
        error!(status = %status, provider, response = %response_text, "API error");
        return Err(LlmError::new(
            LlmErrorKind::Status(status.as_u16()),
            format!("{} API error {}: {}", provider, status, response_text),
        ));
    }

    debug!(response_length = response_text.len(), provider, "Parsing response");
    serde_json::from_str(&response_text).map_err(|e| {
        error!(error = ?e, provider, response = %response_text, "Failed to parse response");
        LlmError::new(
            LlmErrorKind::MalformedResponse,
            format!("Failed to parse response: {}", e),
        )
    })
}

/// Runs `op` until it succeeds, fails with something other than a rate
/// limit, or `policy.max_attempts` is used up.
#[instrument(skip(op))]
pub async fn with_backoff<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.kind == LlmErrorKind::RateLimited && attempt < policy.max_attempts => {
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Broad category of an [`LlmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LlmErrorKind {
    /// Provider answered 429.
    #[display("rate limited")]
    RateLimited,
    /// Transport or request-building failure.
    #[display("request failed")]
    Request,
    /// Non-success HTTP status other than 429.
    #[display("status {}", _0)]
    Status(u16),
    /// Response did not have the expected shape.
    #[display("malformed response")]
    MalformedResponse,
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error ({}): {} at {}:{}", kind, message, file, line)]
pub struct LlmError {
    /// Error category.
    pub kind: LlmErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, %kind, "LLM error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_backoff_retries_rate_limits_until_success() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = with_backoff(fast_policy(5), move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(LlmError::new(LlmErrorKind::RateLimited, "slow down"))
            } else {
                Ok("tip")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "tip");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_backoff_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = with_backoff(fast_policy(5), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::new(LlmErrorKind::RateLimited, "slow down"))
        })
        .await;

        assert_eq!(result.unwrap_err().kind, LlmErrorKind::RateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_backoff_does_not_retry_other_errors() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = with_backoff(fast_policy(5), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::new(LlmErrorKind::Status(500), "boom"))
        })
        .await;

        assert_eq!(result.unwrap_err().kind, LlmErrorKind::Status(500));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn openai_api_error(code: &str) -> OpenAIError {
        let api: async_openai::error::ApiError = serde_json::from_value(serde_json::json!({
            "message": "Rate limit reached for gpt-4o-mini",
            "type": "requests",
            "param": null,
            "code": code,
        }))
        .unwrap();
        OpenAIError::ApiError(api)
    }

    #[test]
    fn test_openai_rate_limit_is_retryable() {
        assert_eq!(
            openai_error_kind(&openai_api_error("rate_limit_exceeded")),
            LlmErrorKind::RateLimited
        );
        assert_eq!(
            openai_error_kind(&openai_api_error("insufficient_quota")),
            LlmErrorKind::Request
        );
    }

    #[tokio::test]
    async fn test_openai_rate_limit_uses_policy_attempts() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = with_backoff(fast_policy(3), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            let err = openai_api_error("rate_limit_exceeded");
            Err(LlmError::new(openai_error_kind(&err), err.to_string()))
        })
        .await;

        assert_eq!(result.unwrap_err().kind, LlmErrorKind::RateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_api_base_defaults_and_override() {
        let config = LlmConfig::new(
            LlmProvider::Anthropic,
            "key".to_string(),
            "claude-3-5-haiku-20241022".to_string(),
            10,
        );
        assert_eq!(config.api_base(), "https://api.anthropic.com/v1");
        let config = config.with_api_base("http://localhost:8080/v1/");
        assert_eq!(config.api_base(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_provider_key_vars() {
        assert_eq!(LlmProvider::Gemini.api_key_var(), "GEMINI_API_KEY");
        assert_eq!(LlmProvider::OpenAI.to_string(), "openai");
    }
}
