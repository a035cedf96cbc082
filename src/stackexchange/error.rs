use thiserror::Error;

pub type Result<T> = std::result::Result<T, StackExchangeError>;

#[derive(Debug, Error)]
pub enum StackExchangeError {
    /// Connection failure, timeout, or a body that could not be read.
    /// The request URL is stripped because it carries the API key.
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Malformed response (HTTP {status}): {source}")]
    MalformedResponse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for StackExchangeError {
    fn from(err: reqwest::Error) -> Self {
        StackExchangeError::Transport(err.without_url())
    }
}
