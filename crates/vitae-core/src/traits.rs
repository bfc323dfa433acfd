use crate::{
    context::{CompletionRequest, Connection, PersonaSettings, Project, UserProfile},
    error::VitaeError,
    message::{ChatMessage, ProviderFailure, ProviderResult, TranscriptReceipt},
};
use async_trait::async_trait;

/// A completion backend: one stage of the provider chain.
///
/// Network gateways, secondary inference services, and the local rule engine
/// all implement this trait so the chain can iterate them uniformly.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider talks to the network (and so needs a deadline).
    fn is_remote(&self) -> bool {
        true
    }

    /// Cheap local readiness check run before `attempt`. A failure skips the
    /// provider without any network traffic.
    fn preflight(&self) -> Result<(), ProviderFailure> {
        Ok(())
    }

    /// Try to answer the request. Failures are typed so the chain can log why
    /// it advanced.
    async fn attempt(&self, request: &CompletionRequest) -> ProviderResult;
}

/// Read side of the profile store, consumed by the context builder.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Identity row, if the user exists.
    async fn read_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, VitaeError>;

    /// Persona settings row, if one was saved.
    async fn read_persona_settings(
        &self,
        user_id: i64,
    ) -> Result<Option<PersonaSettings>, VitaeError>;

    /// Up to `limit` projects, most relevant first.
    async fn read_projects(&self, user_id: i64, limit: usize) -> Result<Vec<Project>, VitaeError>;

    /// Linked social accounts.
    async fn read_connections(&self, user_id: i64) -> Result<Vec<Connection>, VitaeError>;
}

/// Append-only transcript persistence.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Persist one exchange; the store assigns `id` and `created_at`.
    async fn append_transcript(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
    ) -> Result<TranscriptReceipt, VitaeError>;

    /// All exchanges for a user, oldest first.
    async fn list_transcript(&self, user_id: i64) -> Result<Vec<ChatMessage>, VitaeError>;
}
