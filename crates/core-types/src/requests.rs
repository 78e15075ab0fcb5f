use crate::enums::ActivityType;
use crate::structs::User;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `POST /api/v1/auth/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/v1/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `POST /api/v1/workouts`: a whole aggregate submitted at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkoutRequest {
    pub workout_name: String,
    pub workout_date: DateTime<Utc>,
    #[serde(default)]
    pub duration_hours: u32,
    pub duration_minutes: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub overall_rpe: Decimal,
    #[serde(default)]
    pub estimated_calories: u32,
    pub activity_type: ActivityType,
    /// Submission order becomes each exercise's order index.
    #[serde(default)]
    pub exercises: Vec<NewExercise>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sets: Vec<NewSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSet {
    pub weight: String,
    pub reps: String,
    #[serde(
        with = "rust_decimal::serde::float_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rpe: Option<Decimal>,
}
