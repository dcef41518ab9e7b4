use thiserror::Error;

/// Errors that can occur while talking to a test case store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Test case not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Store returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse store response: {0}")]
    Parse(String),

    #[error("Store rejected {id}: {reason}")]
    Rejected { id: String, reason: String },
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Parse(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}
