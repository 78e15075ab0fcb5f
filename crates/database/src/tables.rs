//! Row types, one per table. These are the only shapes that cross the
//! store gateway; the nested domain types never do.

use chrono::{DateTime, Utc};
use core_types::{ActivityType, CreateWorkoutRequest, Exercise, WorkoutSession, WorkoutSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSIONS: &str = "workout_sessions";
pub const EXERCISES: &str = "workout_exercises";
pub const SETS: &str = "workout_sets";

/// A row of `workout_sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: String,
    pub workout_name: String,
    pub workout_date: DateTime<Utc>,
    pub duration_hours: u32,
    pub duration_minutes: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub overall_rpe: Decimal,
    pub estimated_calories: u32,
    pub activity_type: ActivityType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of `workout_exercises`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseRow {
    pub id: Uuid,
    pub workout_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub notes: String,
    pub order: u32,
}

/// A row of `workout_sets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetRow {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub weight: String,
    pub reps: String,
    #[serde(with = "rust_decimal::serde::float_option", default)]
    pub rpe: Option<Decimal>,
}

impl SessionRow {
    pub fn new(
        id: Uuid,
        user_id: &str,
        request: &CreateWorkoutRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            workout_name: request.workout_name.clone(),
            workout_date: request.workout_date,
            duration_hours: request.duration_hours,
            duration_minutes: request.duration_minutes,
            overall_rpe: request.overall_rpe,
            estimated_calories: request.estimated_calories,
            activity_type: request.activity_type,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_session(self, exercises: Vec<Exercise>) -> WorkoutSession {
        WorkoutSession {
            id: self.id,
            user_id: self.user_id,
            workout_name: self.workout_name,
            workout_date: self.workout_date,
            duration_hours: self.duration_hours,
            duration_minutes: self.duration_minutes,
            overall_rpe: self.overall_rpe,
            estimated_calories: self.estimated_calories,
            activity_type: self.activity_type,
            exercises,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ExerciseRow {
    pub fn into_exercise(self, sets: Vec<WorkoutSet>) -> Exercise {
        Exercise {
            id: self.id,
            workout_id: self.workout_id,
            name: self.name,
            notes: self.notes,
            order: self.order,
            sets,
        }
    }
}

impl From<SetRow> for WorkoutSet {
    fn from(row: SetRow) -> Self {
        WorkoutSet {
            id: row.id,
            exercise_id: row.exercise_id,
            weight: row.weight,
            reps: row.reps,
            rpe: row.rpe,
        }
    }
}
