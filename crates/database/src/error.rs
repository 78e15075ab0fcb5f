use crate::repository::CommittedRows;
use api_client::error::ApiError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Store request failed: {0}")]
    Store(#[from] ApiError),

    #[error("An error occurred during JSON serialization/deserialization: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("The requested workout was not found.")]
    NotFound,

    /// A create stopped partway. Rows listed in `committed` are in the store;
    /// nothing after them was attempted and nothing was rolled back.
    #[error("Workout {session_id} was only partially written: {source}")]
    PartialWrite {
        session_id: Uuid,
        committed: CommittedRows,
        source: ApiError,
    },
}
