use crate::error::{CoreError, FieldError};
use crate::requests::{CreateWorkoutRequest, LoginRequest, RegisterRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const MIN_PASSWORD_LEN: usize = 8;
const MIN_RPE: Decimal = dec!(1);
const MAX_RPE: Decimal = dec!(10);

/// Checks a request payload before it is translated into store calls.
///
/// Every failing field is reported, not just the first one.
pub trait Validate {
    fn validate(&self) -> Result<(), CoreError>;
}

/// Collects field errors while walking a payload.
#[derive(Default)]
struct Report {
    errors: Vec<FieldError>,
}

impl Report {
    fn check(&mut self, ok: bool, field: impl Into<String>, message: &str) {
        if !ok {
            self.errors.push(FieldError {
                field: field.into(),
                message: message.to_string(),
            });
        }
    }

    fn finish(self) -> Result<(), CoreError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.errors))
        }
    }
}

/// A deliberately loose shape check; the identity provider has the final say.
fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn rpe_in_range(rpe: Decimal) -> bool {
    (MIN_RPE..=MAX_RPE).contains(&rpe)
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), CoreError> {
        let mut report = Report::default();
        report.check(is_email(&self.email), "email", "must be a valid email address");
        report.check(
            self.password.chars().count() >= MIN_PASSWORD_LEN,
            "password",
            "must be at least 8 characters",
        );
        report.finish()
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), CoreError> {
        let mut report = Report::default();
        report.check(is_email(&self.email), "email", "must be a valid email address");
        report.check(!self.password.is_empty(), "password", "is required");
        report.finish()
    }
}

impl Validate for CreateWorkoutRequest {
    fn validate(&self) -> Result<(), CoreError> {
        let mut report = Report::default();
        report.check(!self.workout_name.trim().is_empty(), "workout_name", "is required");
        report.check(
            rpe_in_range(self.overall_rpe),
            "overall_rpe",
            "must be between 1 and 10",
        );

        for (i, exercise) in self.exercises.iter().enumerate() {
            report.check(
                !exercise.name.trim().is_empty(),
                format!("exercises[{i}].name"),
                "is required",
            );
            for (j, set) in exercise.sets.iter().enumerate() {
                if let Some(rpe) = set.rpe {
                    report.check(
                        rpe_in_range(rpe),
                        format!("exercises[{i}].sets[{j}].rpe"),
                        "must be between 1 and 10",
                    );
                }
            }
        }

        report.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ActivityType;
    use crate::requests::{NewExercise, NewSet};
    use chrono::Utc;

    fn workout() -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            workout_name: "Leg Day".into(),
            workout_date: Utc::now(),
            duration_hours: 1,
            duration_minutes: 0,
            overall_rpe: dec!(8),
            estimated_calories: 500,
            activity_type: ActivityType::Strength,
            exercises: vec![NewExercise {
                name: "Squat".into(),
                notes: String::new(),
                sets: vec![NewSet {
                    weight: "100kg".into(),
                    reps: "5".into(),
                    rpe: None,
                }],
            }],
        }
    }

    fn fields(err: CoreError) -> Vec<String> {
        err.field_errors().into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn accepts_well_formed_workout() {
        assert!(workout().validate().is_ok());
    }

    #[test]
    fn reports_every_bad_field_with_its_path() {
        let mut req = workout();
        req.workout_name = "   ".into();
        req.overall_rpe = dec!(11);
        req.exercises[0].name = String::new();
        req.exercises[0].sets[0].rpe = Some(dec!(0.5));

        let err = req.validate().unwrap_err();
        assert_eq!(
            fields(err),
            vec![
                "workout_name",
                "overall_rpe",
                "exercises[0].name",
                "exercises[0].sets[0].rpe"
            ]
        );
    }

    #[test]
    fn rpe_bounds_are_inclusive() {
        let mut req = workout();
        req.overall_rpe = dec!(1);
        assert!(req.validate().is_ok());
        req.overall_rpe = dec!(10);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn register_requires_email_and_long_password() {
        let req = RegisterRequest {
            email: "not-an-email".into(),
            password: "short".into(),
        };
        assert_eq!(fields(req.validate().unwrap_err()), vec!["email", "password"]);

        let ok = RegisterRequest {
            email: "lifter@example.com".into(),
            password: "correct horse".into(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn login_only_requires_a_password() {
        let req = LoginRequest {
            email: "lifter@example.com".into(),
            password: "x".into(),
        };
        assert!(req.validate().is_ok());

        let empty = LoginRequest {
            email: "lifter@example.com".into(),
            password: String::new(),
        };
        assert_eq!(fields(empty.validate().unwrap_err()), vec!["password"]);
    }

    #[test]
    fn email_shape() {
        assert!(is_email("a@b.co"));
        assert!(!is_email("a@b"));
        assert!(!is_email("@b.co"));
        assert!(!is_email("a b@c.co"));
        assert!(!is_email("a@b@c.co"));
    }
}
