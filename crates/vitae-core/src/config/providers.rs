use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Provider chain configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Deadline for each network provider attempt, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            openrouter: OpenRouterConfig::default(),
            huggingface: HuggingFaceConfig::default(),
        }
    }
}

/// Primary gateway (OpenRouter, OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Full chat-completions endpoint URL.
    #[serde(default = "default_openrouter_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openrouter_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sent as `HTTP-Referer` for OpenRouter app attribution.
    #[serde(default = "default_referer")]
    pub referer: String,
    /// Sent as `X-Title` for OpenRouter app attribution.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_openrouter_url(),
            api_key: String::new(),
            model: default_openrouter_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            referer: default_referer(),
            title: default_title(),
        }
    }
}

/// Secondary inference service (Hugging Face text-generation API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL; the model id is appended as a path segment.
    #[serde(default = "default_huggingface_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_huggingface_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_huggingface_url(),
            api_key: String::new(),
            model: default_huggingface_model(),
            max_new_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}
