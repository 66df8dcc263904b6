use crate::constants::RETRYABLE_STATUSES;

/// Errors raised while talking to the remote healthcare API.
///
/// These are surfaced to callers unchanged: the fetcher and the assessment service never wrap
/// them, so the original status and body stay available at the top of the stack.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed with status {status}")]
    Status {
        status: u16,
        url: String,
        body: Option<String>,
    },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    /// Status code returned by the remote API, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { .. } | ApiError::Decode { .. } => None,
        }
    }

    /// Response body captured alongside a status error.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => body.as_deref(),
            ApiError::Transport { .. } | ApiError::Decode { .. } => None,
        }
    }

    /// Whether a page request that failed with this error may be retried.
    ///
    /// Only rate limiting and transient server statuses qualify. Errors without a status are
    /// always fatal.
    pub fn is_retryable(&self) -> bool {
        self.status()
            .is_some_and(|status| RETRYABLE_STATUSES.contains(&status))
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors raised while resolving startup configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a non-negative integer (got {value:?})")]
    InvalidNumber { name: &'static str, value: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
