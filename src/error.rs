use thiserror::Error;

/// Failure classes surfaced by the external API collaborators.
///
/// The split between quota-class and everything else drives the retry
/// policy: quota failures rotate to the next API key, anything else aborts
/// the current unit of work and keeps whatever was already collected.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Quota or rate-limit class failure (HTTP 403/429/500/503).
    #[error("quota/rate limit hit (HTTP {status})")]
    QuotaExceeded { status: u16 },

    /// Any other upstream failure: network error, bad response body,
    /// non-rotatable HTTP status.
    #[error("upstream error: {message}")]
    Upstream { message: String },
}

impl ApiError {
    /// Classify an HTTP status code at the collaborator boundary.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            403 | 429 | 500 | 503 => ApiError::QuotaExceeded { status },
            _ => ApiError::Upstream {
                message: format!("HTTP {}: {}", status, body.trim()),
            },
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, ApiError::QuotaExceeded { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream {
            message: err.to_string(),
        }
    }
}

/// Harvest-level failures. Page- and batch-level problems degrade to
/// partial results instead; only these two conditions escalate.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("no API keys configured")]
    EmptyKeySet,

    /// Every key was tried in a full rotation cycle without a single
    /// successful page. Reported distinctly from "no results".
    #[error("all {key_count} API keys exhausted with zero progress")]
    KeysExhausted { key_count: usize },
}
