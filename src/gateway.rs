//! Chat pipeline: validate, build context, run the provider chain, persist.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;
use vitae_core::{
    context::build_context,
    error::VitaeError,
    message::{ChatMessage, CompletionMetadata},
    traits::{ProfileSource, TranscriptStore},
};
use vitae_providers::ProviderChain;

/// Longest message preview written to the log.
const PREVIEW_CHARS: usize = 60;

fn preview(message: &str) -> String {
    let trimmed = message.trim();
    let mut out: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    if trimmed.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

/// Answer provenance for the log line: provider plus model and tokens when known.
fn provenance(meta: &CompletionMetadata) -> String {
    let mut out = meta.provider_used.clone();
    if let Some(model) = &meta.model {
        out.push_str(&format!(" ({model})"));
    }
    if let Some(tokens) = meta.tokens_used {
        out.push_str(&format!(", {tokens} tokens"));
    }
    out
}

/// Wires the profile source, provider chain, and transcript store together.
#[derive(Clone)]
pub struct Gateway {
    profiles: Arc<dyn ProfileSource>,
    transcripts: Arc<dyn TranscriptStore>,
    chain: Arc<ProviderChain>,
}

impl Gateway {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        transcripts: Arc<dyn TranscriptStore>,
        chain: Arc<ProviderChain>,
    ) -> Self {
        Self {
            profiles,
            transcripts,
            chain,
        }
    }

    /// Answer one visitor message on behalf of `user_id` and record the exchange.
    ///
    /// Fails with `Validation` for a blank message (no provider is called) and
    /// with `Persistence` when the answer was computed but could not be stored.
    pub async fn handle_chat_message(
        &self,
        user_id: i64,
        message: &str,
    ) -> Result<ChatMessage, VitaeError> {
        if message.trim().is_empty() {
            return Err(VitaeError::Validation("message is required".to_string()));
        }

        let span = info_span!("chat", request_id = %Uuid::new_v4(), user_id);
        self.process(user_id, message).instrument(span).await
    }

    async fn process(&self, user_id: i64, message: &str) -> Result<ChatMessage, VitaeError> {
        let start = Instant::now();
        info!("message: {}", preview(message));

        let context = build_context(self.profiles.as_ref(), user_id).await;
        let completion = self.chain.complete(message, &context).await;

        let receipt = self
            .transcripts
            .append_transcript(user_id, message, &completion.text)
            .await
            .map_err(|e| {
                error!("answer computed but not persisted: {e}");
                e
            })?;

        info!(
            "answered via {} in {}ms (transcript id {})",
            provenance(&completion.metadata),
            start.elapsed().as_millis(),
            receipt.id
        );

        Ok(ChatMessage {
            id: receipt.id,
            user_id,
            message: message.to_string(),
            response: completion.text,
            created_at: receipt.created_at,
        })
    }

    /// The stored transcript for `user_id`, oldest first.
    pub async fn transcript(&self, user_id: i64) -> Result<Vec<ChatMessage>, VitaeError> {
        self.transcripts.list_transcript(user_id).await
    }

    /// Provider stage names in attempt order.
    pub fn stage_names(&self) -> Vec<String> {
        self.chain.stage_names()
    }
}
