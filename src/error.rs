use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaFreeError {
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("HTTP error {status} for URL: {url}")]
    HttpError { status: u16, url: String },

    /// Non-2xx response whose body carried the service's `detail` message
    #[error("{detail}")]
    ApiError { status: u16, detail: String },

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Unsupported or invalid URL: {0}")]
    UnsupportedUrl(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MediaFreeError {
    /// Service-provided detail, when the failure came with one
    pub fn detail(&self) -> Option<&str> {
        match self {
            MediaFreeError::ApiError { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MediaFreeError>;
