//! OpenRouter gateway, the primary provider.
//!
//! Speaks the OpenAI-compatible chat-completions API. The endpoint URL is
//! configurable so any compatible gateway can stand in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;
use vitae_core::{
    config::OpenRouterConfig,
    context::{ApiMessage, CompletionRequest},
    error::VitaeError,
    message::{Completion, CompletionMetadata, ProviderFailure, ProviderResult},
    traits::CompletionProvider,
};

use crate::http::{build_client, decode_failure, request_failure, status_failure};

/// Value shipped in sample configs; never a usable key.
pub const PLACEHOLDER_API_KEY: &str = "sk-or-v1-REPLACE_WITH_YOUR_KEY";

/// Keys at or below this length are rejected without a network call.
const MIN_API_KEY_LEN: usize = 10;

/// Cheap local credential check: present, long enough, not the placeholder.
pub fn has_usable_key(api_key: &str) -> bool {
    let key = api_key.trim();
    key.len() > MIN_API_KEY_LEN && key != PLACEHOLDER_API_KEY
}

/// OpenRouter chat-completions provider.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    referer: String,
    title: String,
}

impl OpenRouterProvider {
    /// Create from config values; `timeout` bounds every request.
    pub fn from_config(config: &OpenRouterConfig, timeout: Duration) -> Result<Self, VitaeError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            referer: config.referer.clone(),
            title: config.title.clone(),
        })
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub(crate) struct ChatCompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Option<Vec<ChatChoice>>,
    pub model: Option<String>,
    pub usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatCompletionMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatUsage {
    pub total_tokens: Option<u64>,
}

fn to_wire_messages(api_messages: &[ApiMessage]) -> Vec<ChatCompletionMessage> {
    api_messages
        .iter()
        .map(|m| ChatCompletionMessage {
            role: m.role.clone(),
            content: Some(m.content.clone()),
        })
        .collect()
}

/// Pull the first non-blank `choices[0].message.content`.
fn extract_text(parsed: &ChatCompletionResponse) -> Option<String> {
    parsed
        .choices
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.message.as_ref())
        .and_then(|m| m.content.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn preflight(&self) -> Result<(), ProviderFailure> {
        if has_usable_key(&self.api_key) {
            Ok(())
        } else {
            Err(ProviderFailure::Unauthorized(
                "openrouter API key not configured".to_string(),
            ))
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> ProviderResult {
        let start = Instant::now();
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: to_wire_messages(&request.to_api_messages()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("openrouter: POST {} model={}", self.api_url, self.model);

        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failure("openrouter", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(status_failure("openrouter", status, &text));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| decode_failure("openrouter", e))?;

        let text = extract_text(&parsed).ok_or_else(|| {
            ProviderFailure::MalformedPayload(
                "openrouter: response missing choices[0].message.content".to_string(),
            )
        })?;

        Ok(Completion {
            text,
            metadata: CompletionMetadata {
                provider_used: "openrouter".to_string(),
                tokens_used: parsed.usage.as_ref().and_then(|u| u.total_tokens),
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: parsed.model.or_else(|| Some(self.model.clone())),
            },
        })
    }
}
