use thiserror::Error;

pub const DEFAULT_LOAD_ERROR: &str = "Failed to load Terms of Use";

/// Why the TOU document could not be obtained. Every variant is recoverable:
/// the gate shows the message and offers the continue-anyway path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TouError {
    /// Network, timeout or decode failure.
    #[error("Failed to load Terms of Use ({0})")]
    Fetch(String),

    /// The backend answered with `ok: false`.
    #[error("{0}")]
    Api(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for TouError {
    fn from(err: reqwest::Error) -> Self {
        let detail = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "could not connect to server".to_string()
        } else {
            err.to_string()
        };
        TouError::Fetch(detail)
    }
}

impl From<serde_json::Error> for TouError {
    fn from(err: serde_json::Error) -> Self {
        TouError::Fetch(format!("invalid response: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, TouError>;
