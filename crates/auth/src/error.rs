use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Failed to sign token: {0}")]
    Encoding(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    Expired,
}
