//! The progress-tracking API as seen by the tracker

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body sent to the progress API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub article_id: String,
    pub read_percentage: u8,
}

/// What the progress API answers. A missing `xp_earned` means nothing was
/// awarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressAck {
    #[serde(default)]
    pub xp_earned: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("progress API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode progress API response: {0}")]
    Decode(String),
    #[error("progress API rejected the credentials")]
    Unauthorized,
}

/// Delivers reading progress for the signed-in viewer.
///
/// Implementations must tolerate the same percentage being sent twice: the
/// API is expected to award XP for a milestone only once.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, article_id: &str, read_percentage: u8)
        -> Result<ProgressAck, ReportError>;
}
