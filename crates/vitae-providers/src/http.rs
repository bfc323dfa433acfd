//! Failure classification shared by the HTTP providers.

use reqwest::StatusCode;
use std::time::Duration;
use vitae_core::{error::VitaeError, message::ProviderFailure};

/// Longest slice of an error body carried into a failure message.
const MAX_ERROR_BODY: usize = 200;

/// Build a client whose requests give up after `timeout`.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, VitaeError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VitaeError::Provider(format!("failed to build http client: {e}")))
}

/// Map a send/read error to a chain failure.
pub(crate) fn request_failure(provider: &str, e: reqwest::Error) -> ProviderFailure {
    if e.is_timeout() {
        ProviderFailure::Timeout
    } else {
        ProviderFailure::Transport(format!("{provider} request failed: {e}"))
    }
}

/// Map a non-success HTTP status to a chain failure.
pub(crate) fn status_failure(provider: &str, status: StatusCode, body: &str) -> ProviderFailure {
    let body: String = body.chars().take(MAX_ERROR_BODY).collect();
    let detail = format!("{provider} returned {status}: {body}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderFailure::Unauthorized(detail),
        _ => ProviderFailure::Transport(detail),
    }
}

/// Map a body decode error to a chain failure.
pub(crate) fn decode_failure(provider: &str, e: reqwest::Error) -> ProviderFailure {
    if e.is_timeout() {
        ProviderFailure::Timeout
    } else {
        ProviderFailure::MalformedPayload(format!("{provider}: failed to parse response: {e}"))
    }
}
