//! Hugging Face Inference API, the secondary network provider.
//!
//! Uses the text-generation task with an instruction-formatted prompt, so the
//! system prompt and the visitor's message travel as one `inputs` string.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;
use vitae_core::{
    config::HuggingFaceConfig,
    context::CompletionRequest,
    error::VitaeError,
    message::{Completion, CompletionMetadata, ProviderFailure, ProviderResult},
    traits::CompletionProvider,
};

use crate::http::{build_client, decode_failure, request_failure, status_failure};

/// Hugging Face text-generation provider.
pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_new_tokens: u32,
    temperature: f32,
}

impl HuggingFaceProvider {
    /// Create from config values; `timeout` bounds every request.
    pub fn from_config(config: &HuggingFaceConfig, timeout: Duration) -> Result<Self, VitaeError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
        })
    }

    fn model_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.model.trim_start_matches('/')
        )
    }
}

#[derive(Serialize)]
struct GenerationRequest {
    inputs: String,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: Option<String>,
}

/// Mistral-style instruction prompt.
fn build_inputs(request: &CompletionRequest) -> String {
    format!(
        "<s>[INST] {}\n\n{} [/INST]",
        request.system_prompt, request.message
    )
}

/// First non-blank generation, with any echoed prompt stripped.
fn extract_text(generations: &[GeneratedText], inputs: &str) -> Option<String> {
    let raw = generations.first()?.generated_text.as_deref()?;
    let text = raw.strip_prefix(inputs).unwrap_or(raw).trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl CompletionProvider for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn preflight(&self) -> Result<(), ProviderFailure> {
        if self.api_key.is_empty() {
            Err(ProviderFailure::Unauthorized(
                "huggingface API key not configured".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    async fn attempt(&self, request: &CompletionRequest) -> ProviderResult {
        let start = Instant::now();
        let url = self.model_url();
        let inputs = build_inputs(request);
        let body = GenerationRequest {
            inputs: inputs.clone(),
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
            },
        };

        debug!("huggingface: POST {url}");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failure("huggingface", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(status_failure("huggingface", status, &text));
        }

        let generations: Vec<GeneratedText> = resp
            .json()
            .await
            .map_err(|e| decode_failure("huggingface", e))?;

        let text = extract_text(&generations, &inputs).ok_or_else(|| {
            ProviderFailure::MalformedPayload(
                "huggingface: response missing generated_text".to_string(),
            )
        })?;

        Ok(Completion {
            text,
            metadata: CompletionMetadata {
                provider_used: "huggingface".to_string(),
                tokens_used: None,
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: Some(self.model.clone()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vitae_core::context::UserContext;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HuggingFaceProvider {
        let config = HuggingFaceConfig {
            api_url: format!("{}/models/", server.uri()),
            api_key: "hf_test_token".to_string(),
            ..Default::default()
        };
        HuggingFaceProvider::from_config(&config, Duration::from_secs(5)).unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("Explain hashing", UserContext::minimal())
    }

    #[test]
    fn test_preflight_requires_key() {
        let p = HuggingFaceProvider::from_config(
            &HuggingFaceConfig::default(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(p.name(), "huggingface");
        assert_eq!(p.preflight().unwrap_err().kind(), "unauthorized");
    }

    #[test]
    fn test_inputs_carry_prompt_and_message() {
        let req = request();
        let inputs = build_inputs(&req);
        assert!(inputs.starts_with("<s>[INST] You are AI Portfolio Agent"));
        assert!(inputs.ends_with("\n\nExplain hashing [/INST]"));
    }

    #[test]
    fn test_extract_strips_echoed_prompt() {
        let inputs = "<s>[INST] q [/INST]";
        let gens = vec![GeneratedText {
            generated_text: Some(format!("{inputs} The answer.")),
        }];
        assert_eq!(extract_text(&gens, inputs), Some("The answer.".into()));
        assert_eq!(extract_text(&[], inputs), None);
    }

    #[tokio::test]
    async fn test_attempt_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/mistralai/Mistral-7B-Instruct-v0.1"))
            .and(header("Authorization", "Bearer hf_test_token"))
            .and(body_partial_json(json!({
                "parameters": {"return_full_text": false}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"generated_text": "Hashing maps keys to buckets."}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let completion = provider(&server).attempt(&request()).await.unwrap();
        assert_eq!(completion.text, "Hashing maps keys to buckets.");
        assert_eq!(completion.metadata.provider_used, "huggingface");
        assert_eq!(
            completion.metadata.model.as_deref(),
            Some("mistralai/Mistral-7B-Instruct-v0.1")
        );
    }

    #[tokio::test]
    async fn test_attempt_model_loading_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503)
                    .set_body_json(json!({"error": "Model is currently loading"})),
            )
            .mount(&server)
            .await;

        let err = provider(&server).attempt(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "transport_error");
    }

    #[tokio::test]
    async fn test_attempt_object_payload_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "oops"})))
            .mount(&server)
            .await;

        let err = provider(&server).attempt(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "malformed_payload");
    }

    #[tokio::test]
    async fn test_attempt_empty_generation_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "  "}])),
            )
            .mount(&server)
            .await;

        let err = provider(&server).attempt(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "malformed_payload");
    }
}
