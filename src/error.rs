use thiserror::Error;

/// Failure of a single upstream call or of the shape check on its body.
///
/// All variants are expected at runtime; controllers downgrade them to a
/// `fallback` response.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UpstreamError {
    #[error("{api} timed out after {timeout_ms}ms")]
    Timeout { api: &'static str, timeout_ms: u64 },

    #[error("{api} returned HTTP {status}")]
    HttpStatus { api: &'static str, status: u16 },

    #[error("{api} sent a malformed body: {reason}")]
    Malformed { api: &'static str, reason: String },

    #[error("{api} transport error: {reason}")]
    Network { api: &'static str, reason: String },
}

impl UpstreamError {
    pub fn malformed(api: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            api,
            reason: reason.into(),
        }
    }

    /// Maps a reqwest failure onto the upstream taxonomy.
    pub fn from_reqwest(api: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest does not expose the configured duration
            Self::Timeout { api, timeout_ms: 0 }
        } else if err.is_decode() {
            Self::malformed(api, err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                api,
                status: status.as_u16(),
            }
        } else {
            Self::Network {
                api,
                reason: err.to_string(),
            }
        }
    }
}

/// Failure inside a controller that is not attributable to the upstream.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),

    #[error("pipeline panicked: {0}")]
    Panicked(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Renders a panic payload from `catch_unwind` as text.
pub fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
