use thiserror::Error;

/// Per-video failures. Each one skips the video; none aborts the batch.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("could not extract a video ID from {url}")]
    InvalidLink { url: String },

    #[error("no transcript available for {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("model request failed: {reason}")]
    ModelRequest { reason: String },

    #[error("model reply has no usable JSON object: {reason}")]
    MalformedReply { reason: String },
}

impl AnalysisError {
    /// Short stable name of the error kind, used in logs and the run summary
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidLink { .. } => "invalid-link",
            AnalysisError::TranscriptUnavailable { .. } => "transcript-unavailable",
            AnalysisError::ModelRequest { .. } => "model-request",
            AnalysisError::MalformedReply { .. } => "malformed-reply",
        }
    }

    pub(crate) fn unavailable(video_id: &str, reason: impl ToString) -> Self {
        AnalysisError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn model(reason: impl ToString) -> Self {
        AnalysisError::ModelRequest {
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(reason: impl ToString) -> Self {
        AnalysisError::MalformedReply {
            reason: reason.to_string(),
        }
    }
}
