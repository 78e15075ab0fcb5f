use crate::enums::ActivityType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logged workout: the root of the session → exercises → sets aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: Uuid,
    /// Opaque identifier issued by the identity provider.
    pub user_id: String,
    pub workout_name: String,
    pub workout_date: DateTime<Utc>,
    pub duration_hours: u32,
    pub duration_minutes: u32,
    /// Overall rate of perceived exertion, 1 to 10.
    #[serde(with = "rust_decimal::serde::float")]
    pub overall_rpe: Decimal,
    pub estimated_calories: u32,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One exercise within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    /// Back-reference to the owning session.
    pub workout_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    /// Position in the list the exercise was submitted in. Assigned once.
    pub order: u32,
    #[serde(default)]
    pub sets: Vec<WorkoutSet>,
}

/// A single set of an exercise. Weight and reps are free text so that
/// units and ranges ("20kg each side", "8-10") survive as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub weight: String,
    pub reps: String,
    #[serde(
        with = "rust_decimal::serde::float_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rpe: Option<Decimal>,
}

/// An account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

impl WorkoutSession {
    /// Total number of sets across every exercise of the session.
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}
