//! Client error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Unexpected response shape from {endpoint}: {message}")]
    Schema { endpoint: String, message: String },

    #[error("{endpoint} reported failure: {message}")]
    Api { endpoint: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub(crate) fn schema(endpoint: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}
