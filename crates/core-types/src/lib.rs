//! # FitTrack Core Types
//!
//! The shared vocabulary of the workspace: the workout aggregate
//! (session → exercises → sets), the request payloads accepted by the API,
//! and the validation rules applied to them before anything reaches the
//! hosted store.

pub mod enums;
pub mod error;
pub mod requests;
pub mod structs;
pub mod validation;

// Re-export the core types to provide a clean public API.
pub use enums::ActivityType;
pub use error::{CoreError, FieldError};
pub use requests::{
    AuthResponse, CreateWorkoutRequest, LoginRequest, NewExercise, NewSet, RegisterRequest,
};
pub use structs::{Exercise, User, WorkoutSession, WorkoutSet};
pub use validation::Validate;
