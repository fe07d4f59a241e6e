use thiserror::Error;

/// Why a summarizer call produced no report.
///
/// Never escapes [`crate::summarizer::summarize_or_fallback`]; callers of the
/// orchestration API always get a report.
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("summarizer API key not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("summarizer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("summarizer returned no text")]
    EmptyResponse,

    #[error("failed to decode summarizer response: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid summarizer URL: {0}")]
    InvalidUrl(String),
}

/// A run lifecycle step that is not allowed from the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move run from {from} to {to}")]
pub struct InvalidTransition {
    pub from: crate::run::RunPhase,
    pub to: crate::run::RunPhase,
}
