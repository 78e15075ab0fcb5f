use serde::Serialize;
use thiserror::Error;

/// A single rejected field in a request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Path of the field, e.g. `exercises[0].sets[1].rpe`.
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),
}

impl CoreError {
    /// Field-level details for reporting back to the client.
    pub fn field_errors(&self) -> Vec<FieldError> {
        match self {
            CoreError::Validation(errors) => errors.clone(),
        }
    }
}
