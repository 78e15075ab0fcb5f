use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    /// A non-success status from the hosted backend. `body` is passed through verbatim.
    #[error("upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}

impl ApiError {
    /// The message to show a caller: the remote body for upstream failures,
    /// the error text otherwise.
    pub fn message(&self) -> String {
        match self {
            ApiError::Upstream { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}
