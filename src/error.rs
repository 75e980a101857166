use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Assessment backend error: {0}")]
    Backend(String),

    #[error("Assessment backend timed out after {0} seconds")]
    BackendTimeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::BackendTimeout(_) | Error::Network(_))
    }
}
