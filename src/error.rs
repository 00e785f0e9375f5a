use thiserror::Error;

/// Failure taxonomy shared by both upstream-backed endpoints.
///
/// The `Display` text is what ends up in the `details` field of the
/// error envelope, so keep the messages user-facing.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Upstream(String),
    #[error("HTTP request failed: {0}")]
    Network(reqwest::Error),
}

// Request URLs carry the API keys in their query string; they must never
// reach the error envelope.
impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Network(err.without_url())
    }
}

impl ProxyError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Config(_) => "config",
            ProxyError::Upstream(_) => "upstream",
            ProxyError::Network(_) => "network",
        }
    }
}
