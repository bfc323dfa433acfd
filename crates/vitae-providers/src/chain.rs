//! Ordered provider chain with a never-failing terminal stage.
//!
//! Stages are tried strictly in order. A stage that fails its preflight is
//! skipped without a network call; a remote attempt is bounded by the chain
//! deadline. The first non-empty completion wins and no stage is retried.
//! When every stage fails, the rule-based responder answers.

use std::time::Duration;
use tracing::{debug, info, warn};
use vitae_core::{
    config::ProviderConfig,
    context::{CompletionRequest, UserContext},
    error::VitaeError,
    message::{Completion, ProviderFailure, ProviderResult},
    traits::CompletionProvider,
};

use crate::{
    huggingface::HuggingFaceProvider, openrouter::OpenRouterProvider, rules::RuleBasedResponder,
};

/// Per-attempt deadline when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The provider chain executor.
pub struct ProviderChain {
    stages: Vec<Box<dyn CompletionProvider>>,
    terminal: RuleBasedResponder,
    timeout: Duration,
}

impl ProviderChain {
    /// Chain over `stages`, terminated by the rule-based responder.
    pub fn new(stages: Vec<Box<dyn CompletionProvider>>, timeout: Duration) -> Self {
        Self {
            stages,
            terminal: RuleBasedResponder::new(),
            timeout,
        }
    }

    /// A chain with only the rule-based responder.
    pub fn offline() -> Self {
        Self::new(Vec::new(), DEFAULT_TIMEOUT)
    }

    /// Build the standard chain: OpenRouter, then Hugging Face, then rules.
    ///
    /// Disabled providers are left out. Enabled providers without usable
    /// credentials stay in and are skipped at preflight.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, VitaeError> {
        let timeout = match config.timeout_secs {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        };

        let mut stages: Vec<Box<dyn CompletionProvider>> = Vec::new();
        if config.openrouter.enabled {
            stages.push(Box::new(OpenRouterProvider::from_config(
                &config.openrouter,
                timeout,
            )?));
        }
        if config.huggingface.enabled {
            stages.push(Box::new(HuggingFaceProvider::from_config(
                &config.huggingface,
                timeout,
            )?));
        }

        Ok(Self::new(stages, timeout))
    }

    /// Stage names in attempt order, terminal included.
    pub fn stage_names(&self) -> Vec<String> {
        self.stages
            .iter()
            .map(|s| s.name().to_string())
            .chain(std::iter::once(self.terminal.name().to_string()))
            .collect()
    }

    /// Produce a completion for `message`. Never fails.
    pub async fn complete(&self, message: &str, user: &UserContext) -> Completion {
        let request = CompletionRequest::new(message, user.clone());

        for stage in &self.stages {
            let name = stage.name();

            if let Err(reason) = stage.preflight() {
                info!("provider chain: skipping {name} ({reason})");
                continue;
            }

            match self.run_stage(stage.as_ref(), &request).await {
                Ok(completion) if !completion.text.trim().is_empty() => {
                    info!(
                        "provider chain: answered by {name} in {}ms",
                        completion.metadata.processing_time_ms
                    );
                    return completion;
                }
                Ok(_) => {
                    warn!("provider chain: {name} failed (malformed_payload: empty completion)");
                }
                Err(reason) => {
                    warn!("provider chain: {name} failed ({reason})");
                }
            }
        }

        let completion = self.terminal.complete(&request);
        info!("provider chain: answered by {}", self.terminal.name());
        completion
    }

    /// Text-only convenience over [`complete`](Self::complete).
    pub async fn get_response(&self, message: &str, user: &UserContext) -> String {
        self.complete(message, user).await.text
    }

    async fn run_stage(
        &self,
        stage: &dyn CompletionProvider,
        request: &CompletionRequest,
    ) -> ProviderResult {
        if !stage.is_remote() {
            return stage.attempt(request).await;
        }
        debug!("provider chain: trying {} (deadline {:?})", stage.name(), self.timeout);
        match tokio::time::timeout(self.timeout, stage.attempt(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderFailure::Timeout),
        }
    }
}
