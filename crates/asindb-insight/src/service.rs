//! The provider pass-through.
//!
//! One service instance holds both optional provider keys. OpenAI is
//! preferred when both are configured; a provider fault falls back to the
//! deterministic mock text for the requested kind rather than erroring.

use std::time::Duration;

use serde::Serialize;

use crate::prompts::{
    analysis_prompt, insights_prompt, mock_analysis, mock_insights, AnalysisKind, InsightKind,
};
use crate::InsightError;

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_COMPLETION_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Availability flags for the two provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightHealth {
    pub openai_available: bool,
    pub anthropic_available: bool,
    pub service_ready: bool,
}

/// Text-generation pass-through with mock fallback.
pub struct InsightService {
    client: reqwest::Client,
    openai_api_key: Option<String>,
    anthropic_api_key: Option<String>,
    openai_base_url: String,
    anthropic_base_url: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'static str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

impl InsightService {
    /// Creates the service with whichever provider keys the configuration
    /// supplied. Placeholder filtering is the config layer's job; keys
    /// arriving here are taken at face value.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        openai_api_key: Option<String>,
        anthropic_api_key: Option<String>,
    ) -> Result<Self, InsightError> {
        Self::with_base_urls(
            openai_api_key,
            anthropic_api_key,
            OPENAI_BASE_URL,
            ANTHROPIC_BASE_URL,
        )
    }

    /// Creates the service with custom provider base URLs (for testing with
    /// wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the HTTP client cannot be constructed.
    pub fn with_base_urls(
        openai_api_key: Option<String>,
        anthropic_api_key: Option<String>,
        openai_base_url: &str,
        anthropic_base_url: &str,
    ) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("asindb/0.1 (product-analytics)")
            .build()?;

        Ok(Self {
            client,
            openai_api_key,
            anthropic_api_key,
            openai_base_url: openai_base_url.trim_end_matches('/').to_string(),
            anthropic_base_url: anthropic_base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn health(&self) -> InsightHealth {
        let openai_available = self.openai_api_key.is_some();
        let anthropic_available = self.anthropic_api_key.is_some();
        InsightHealth {
            openai_available,
            anthropic_available,
            service_ready: openai_available || anthropic_available,
        }
    }

    /// Produces analysis text for a product. Never errors: without a
    /// provider (or when the provider call fails) the deterministic mock
    /// text for the kind is returned.
    pub async fn analyze_product(&self, asin: &str, kind: AnalysisKind) -> String {
        let prompt = analysis_prompt(asin, kind);
        match self.complete(&prompt).await {
            Some(text) => text,
            None => mock_analysis(asin, kind),
        }
    }

    /// Produces insight text from structured analytics data. Never errors.
    pub async fn generate_insights(&self, data: &serde_json::Value, kind: InsightKind) -> String {
        let prompt = insights_prompt(data, kind);
        match self.complete(&prompt).await {
            Some(text) => text,
            None => mock_insights(data, kind),
        }
    }

    /// Runs the prompt through the preferred configured provider.
    ///
    /// Returns `None` when no provider is configured or the call failed in
    /// any way; the caller substitutes the mock text.
    async fn complete(&self, prompt: &str) -> Option<String> {
        if let Some(key) = self.openai_api_key.as_deref() {
            match self.call_openai(key, prompt).await {
                Ok(text) => return Some(text),
                Err(e) => {
                    tracing::warn!(error = %e, "openai completion failed, using mock text");
                    return None;
                }
            }
        }
        if let Some(key) = self.anthropic_api_key.as_deref() {
            match self.call_anthropic(key, prompt).await {
                Ok(text) => return Some(text),
                Err(e) => {
                    tracing::warn!(error = %e, "anthropic completion failed, using mock text");
                    return None;
                }
            }
        }
        None
    }

    async fn call_openai(&self, key: &str, prompt: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}/v1/chat/completions", self.openai_base_url);
        let request = OpenAiRequest {
            model: OPENAI_MODEL,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let body: serde_json::Value = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn call_anthropic(&self, key: &str, prompt: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}/v1/messages", self.anthropic_base_url);
        let request = AnthropicRequest {
            model: ANTHROPIC_MODEL,
            max_tokens: MAX_COMPLETION_TOKENS,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let body: serde_json::Value = self
            .client
            .post(url)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }
}
