use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One persisted exchange in a user's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Assigned by the store at write time.
    pub id: i64,
    pub user_id: i64,
    /// The visitor's message as received.
    pub message: String,
    /// The answer produced by the provider chain.
    pub response: String,
    /// Assigned by the store at write time.
    pub created_at: DateTime<Utc>,
}

/// What the store hands back after appending an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptReceipt {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

/// A completion produced by one stage of the provider chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub metadata: CompletionMetadata,
}

/// Metadata about how a completion was generated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletionMetadata {
    /// Which provider produced this response.
    pub provider_used: String,
    /// Token count (if available from the provider).
    pub tokens_used: Option<u64>,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
    /// Model identifier (if applicable).
    pub model: Option<String>,
}

/// Why a provider attempt did not produce an answer.
///
/// Every variant is recovered by advancing the chain; none is surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The attempt exceeded the chain's per-provider deadline.
    Timeout,
    /// Connection problems and non-auth HTTP error statuses.
    Transport(String),
    /// The response body lacked the completion field, or it was empty.
    MalformedPayload(String),
    /// Missing/placeholder credentials, or a 401/403 from the endpoint.
    Unauthorized(String),
}

impl ProviderFailure {
    /// Short machine-friendly label, used in diagnostic events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport_error",
            Self::MalformedPayload(_) => "malformed_payload",
            Self::Unauthorized(_) => "unauthorized",
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Transport(detail)
            | Self::MalformedPayload(detail)
            | Self::Unauthorized(detail) => write!(f, "{}: {detail}", self.kind()),
        }
    }
}

/// Outcome of a single provider attempt.
pub type ProviderResult = Result<Completion, ProviderFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_labels() {
        assert_eq!(ProviderFailure::Timeout.kind(), "timeout");
        assert_eq!(
            ProviderFailure::Transport("reset".into()).kind(),
            "transport_error"
        );
        assert_eq!(
            ProviderFailure::MalformedPayload("no choices".into()).kind(),
            "malformed_payload"
        );
        assert_eq!(
            ProviderFailure::Unauthorized("no key".into()).kind(),
            "unauthorized"
        );
    }

    #[test]
    fn test_failure_display_includes_detail() {
        let f = ProviderFailure::Unauthorized("openrouter returned 401".into());
        assert_eq!(f.to_string(), "unauthorized: openrouter returned 401");
        assert_eq!(ProviderFailure::Timeout.to_string(), "timeout");
    }

    #[test]
    fn test_chat_message_serializes_created_at_as_rfc3339() {
        let created_at = DateTime::parse_from_rfc3339("2026-01-02T03:04:05.678Z")
            .unwrap()
            .with_timezone(&Utc);
        let msg = ChatMessage {
            id: 7,
            user_id: 42,
            message: "hi".into(),
            response: "hello".into(),
            created_at,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["user_id"], 42);
        assert!(json["created_at"]
            .as_str()
            .unwrap()
            .starts_with("2026-01-02T03:04:05.678"));
    }
}
