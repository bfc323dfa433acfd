//! Append-only chat transcript.

use super::Store;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use vitae_core::{
    error::VitaeError,
    message::{ChatMessage, TranscriptReceipt},
    traits::TranscriptStore,
};

/// Timestamps are stored as RFC 3339 UTC with millisecond precision so that
/// text order matches time order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, VitaeError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| VitaeError::Persistence(format!("bad created_at '{raw}': {e}")))
}

#[async_trait]
impl TranscriptStore for Store {
    async fn append_transcript(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
    ) -> Result<TranscriptReceipt, VitaeError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO chat_messages (user_id, message, response, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(message)
        .bind(response)
        .bind(format_timestamp(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("append transcript failed: {e}")))?;

        // Receipt carries the stored millisecond precision.
        let id = result.last_insert_rowid();
        Ok(TranscriptReceipt {
            id,
            created_at: parse_timestamp(&format_timestamp(created_at))?,
        })
    }

    async fn list_transcript(&self, user_id: i64) -> Result<Vec<ChatMessage>, VitaeError> {
        let rows: Vec<(i64, i64, String, String, String)> = sqlx::query_as(
            "SELECT id, user_id, message, response, created_at FROM chat_messages \
             WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| VitaeError::Persistence(format!("list transcript failed: {e}")))?;

        rows.into_iter()
            .map(|(id, user_id, message, response, created_at)| {
                Ok(ChatMessage {
                    id,
                    user_id,
                    message,
                    response,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }
}
