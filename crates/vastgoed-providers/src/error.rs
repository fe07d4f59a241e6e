use thiserror::Error;

/// Phrase the energy-label registry uses when an address has no label.
pub(crate) const NO_LABEL_PHRASE: &str = "geen energielabel gevonden";

/// Errors raised inside the provider clients.
///
/// These never leave the crate's public fetch methods: each one is folded
/// into a [`crate::ProviderResult`] at the boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} request timed out after {secs}s")]
    Timeout { provider: &'static str, secs: u64 },

    /// 401 or 403 from the upstream.
    #[error("API authentication failed")]
    Auth,

    /// 400 from the upstream, carrying the provider's own message when given.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// 422 from the upstream.
    #[error("invalid address format")]
    InvalidAddress,

    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected response shape from {0}")]
    UnexpectedShape(&'static str),
}

impl ProviderError {
    /// Maps a transport error, separating timeouts so the message names the
    /// configured limit.
    pub(crate) fn transport(provider: &'static str, secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { provider, secs }
        } else {
            Self::Http(err)
        }
    }

    /// Whether this error means "the registry has no label for this address"
    /// rather than a fault. Only consulted for the energy-label provider.
    #[must_use]
    pub fn indicates_absence(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::UnexpectedStatus { status: 404, .. } => true,
            other => is_absence_message(&other.to_string()),
        }
    }
}

/// Case-insensitive match on the "no record" phrasings the energy-label
/// registry produces.
#[must_use]
pub fn is_absence_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("not found") || lower.contains(NO_LABEL_PHRASE)
}
