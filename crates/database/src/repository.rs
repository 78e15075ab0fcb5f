use crate::DbError;
use crate::tables::{EXERCISES, ExerciseRow, SESSIONS, SETS, SessionRow, SetRow};
use api_client::error::ApiError;
use api_client::{Filters, RecordStore};
use chrono::Utc;
use core_types::{CreateWorkoutRequest, Exercise, WorkoutSession, WorkoutSet};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

/// Rows a create managed to write before it stopped, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommittedRows {
    pub session: bool,
    pub exercises: Vec<Uuid>,
    pub sets: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeStep {
    /// Listing the children of `record_id` failed; they were left in place.
    Lookup,
    /// Deleting `record_id` itself failed.
    Delete,
}

/// A child row the cascade could not deal with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeFailure {
    pub table: String,
    pub step: CascadeStep,
    pub record_id: Uuid,
    pub message: String,
}

/// The outcome of a best-effort cascading delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub exercises_deleted: usize,
    pub sets_deleted: usize,
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    /// True when every child row was found and deleted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, table: &str, step: CascadeStep, record_id: Uuid, error: &ApiError) {
        tracing::warn!(table, ?step, %record_id, error = %error, "cascade step failed, continuing");
        self.failures.push(CascadeFailure {
            table: table.to_string(),
            step,
            record_id,
            message: error.message(),
        });
    }
}

/// Reads and writes whole workout aggregates against the flat tables.
#[derive(Clone)]
pub struct WorkoutRepository {
    store: Arc<dyn RecordStore>,
}

impl WorkoutRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Writes a new aggregate: the session, then each exercise in submission
    /// order (stamped with its index), each followed by its sets.
    ///
    /// Writes are sequential because children reference their parent's id.
    /// The first failure stops the create; rows already written stay, and the
    /// error lists them.
    pub async fn create_workout(
        &self,
        user_id: &str,
        request: &CreateWorkoutRequest,
    ) -> Result<Uuid, DbError> {
        let session_id = Uuid::new_v4();
        let mut committed = CommittedRows::default();

        let partial = |committed: &CommittedRows, source: ApiError| DbError::PartialWrite {
            session_id,
            committed: committed.clone(),
            source,
        };

        let session = SessionRow::new(session_id, user_id, request, Utc::now());
        self.write(SESSIONS, &session)
            .await
            .map_err(|e| partial(&committed, e))?;
        committed.session = true;

        for (index, exercise) in request.exercises.iter().enumerate() {
            let exercise_id = Uuid::new_v4();
            let row = ExerciseRow {
                id: exercise_id,
                workout_id: session_id,
                name: exercise.name.clone(),
                notes: exercise.notes.clone(),
                order: index as u32,
            };
            self.write(EXERCISES, &row)
                .await
                .map_err(|e| partial(&committed, e))?;
            committed.exercises.push(exercise_id);

            for set in &exercise.sets {
                let set_id = Uuid::new_v4();
                let row = SetRow {
                    id: set_id,
                    exercise_id,
                    weight: set.weight.clone(),
                    reps: set.reps.clone(),
                    rpe: set.rpe,
                };
                self.write(SETS, &row)
                    .await
                    .map_err(|e| partial(&committed, e))?;
                committed.sets.push(set_id);
            }
        }

        tracing::info!(
            %session_id,
            user_id,
            exercises = committed.exercises.len(),
            sets = committed.sets.len(),
            "workout created"
        );
        Ok(session_id)
    }

    /// Every session owned by `user_id`, each with its exercises and sets.
    pub async fn list_workouts(&self, user_id: &str) -> Result<Vec<WorkoutSession>, DbError> {
        let rows: Vec<SessionRow> = self
            .fetch(SESSIONS, Filters::from([("user_id", user_id.to_string())]))
            .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in rows {
            let exercises = self.load_exercises(row.id).await;
            sessions.push(row.into_session(exercises));
        }
        Ok(sessions)
    }

    /// One session with its children. Sessions owned by someone else are
    /// reported as not found.
    pub async fn get_workout(
        &self,
        user_id: &str,
        workout_id: Uuid,
    ) -> Result<WorkoutSession, DbError> {
        let row = self
            .find_session(user_id, workout_id)
            .await?
            .ok_or(DbError::NotFound)?;
        let exercises = self.load_exercises(row.id).await;
        Ok(row.into_session(exercises))
    }

    /// Deletes a session and, one row at a time, its exercises and sets.
    ///
    /// Ownership is checked first; nothing is written for a missing or foreign
    /// session. Child failures are collected in the report and do not stop
    /// the cascade. Only a failure to delete the session row is an error.
    pub async fn delete_workout(
        &self,
        user_id: &str,
        workout_id: Uuid,
    ) -> Result<CascadeReport, DbError> {
        if self.find_session(user_id, workout_id).await?.is_none() {
            return Err(DbError::NotFound);
        }

        let mut report = CascadeReport::default();
        let exercises: Vec<ExerciseRow> = match self
            .fetch(EXERCISES, Filters::from([("workout_id", workout_id.to_string())]))
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                report.record(EXERCISES, CascadeStep::Lookup, workout_id, &lookup_error(e));
                Vec::new()
            }
        };

        for exercise in exercises {
            match self
                .fetch::<SetRow>(SETS, Filters::from([("exercise_id", exercise.id.to_string())]))
                .await
            {
                Ok(sets) => {
                    for set in sets {
                        match self.store.delete(SETS, &set.id.to_string()).await {
                            Ok(()) => report.sets_deleted += 1,
                            Err(e) => report.record(SETS, CascadeStep::Delete, set.id, &e),
                        }
                    }
                }
                Err(e) => report.record(SETS, CascadeStep::Lookup, exercise.id, &lookup_error(e)),
            }

            match self.store.delete(EXERCISES, &exercise.id.to_string()).await {
                Ok(()) => report.exercises_deleted += 1,
                Err(e) => report.record(EXERCISES, CascadeStep::Delete, exercise.id, &e),
            }
        }

        self.store.delete(SESSIONS, &workout_id.to_string()).await?;

        tracing::info!(
            %workout_id,
            user_id,
            exercises = report.exercises_deleted,
            sets = report.sets_deleted,
            failures = report.failures.len(),
            "workout deleted"
        );
        Ok(report)
    }

    async fn write<T: Serialize>(&self, table: &str, row: &T) -> Result<(), ApiError> {
        let value = serde_json::to_value(row).map_err(|e| ApiError::InvalidData(e.to_string()))?;
        self.store.insert(table, &value).await?;
        Ok(())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: Filters,
    ) -> Result<Vec<T>, DbError> {
        let values = self.store.query(table, &filters).await?;
        let rows = values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(rows)
    }

    async fn find_session(
        &self,
        user_id: &str,
        workout_id: Uuid,
    ) -> Result<Option<SessionRow>, DbError> {
        let filters = Filters::from([
            ("id", workout_id.to_string()),
            ("user_id", user_id.to_string()),
        ]);
        let rows: Vec<SessionRow> = self.fetch(SESSIONS, filters).await?;
        Ok(rows.into_iter().next())
    }

    /// Lenient: a failed or undecodable fetch yields no exercises.
    /// Exercises come back sorted by their order index; equal indices keep the
    /// store's order.
    async fn load_exercises(&self, workout_id: Uuid) -> Vec<Exercise> {
        let rows: Vec<ExerciseRow> = match self
            .fetch(EXERCISES, Filters::from([("workout_id", workout_id.to_string())]))
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(%workout_id, error = %e, "exercise fetch failed, returning session without exercises");
                return Vec::new();
            }
        };

        let mut exercises = Vec::with_capacity(rows.len());
        for row in rows {
            let sets = self.load_sets(row.id).await;
            exercises.push(row.into_exercise(sets));
        }
        exercises.sort_by_key(|e| e.order);
        exercises
    }

    /// Lenient: a failed or undecodable fetch yields no sets.
    async fn load_sets(&self, exercise_id: Uuid) -> Vec<WorkoutSet> {
        match self
            .fetch::<SetRow>(SETS, Filters::from([("exercise_id", exercise_id.to_string())]))
            .await
        {
            Ok(rows) => rows.into_iter().map(WorkoutSet::from).collect(),
            Err(e) => {
                tracing::warn!(%exercise_id, error = %e, "set fetch failed, returning exercise without sets");
                Vec::new()
            }
        }
    }
}

/// Cascade failures are reported as gateway errors; decode problems on a
/// lookup are folded in as invalid data.
fn lookup_error(error: DbError) -> ApiError {
    match error {
        DbError::Store(e) => e,
        other => ApiError::InvalidData(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_client::{InMemoryStore, Operation};
    use chrono::TimeZone;
    use core_types::{ActivityType, NewExercise, NewSet};
    use rust_decimal_macros::dec;
    use serde_json::json;

    const OWNER: &str = "user-1";

    fn set(weight: &str, reps: &str) -> NewSet {
        NewSet {
            weight: weight.into(),
            reps: reps.into(),
            rpe: None,
        }
    }

    fn exercise(name: &str, sets: Vec<NewSet>) -> NewExercise {
        NewExercise {
            name: name.into(),
            notes: String::new(),
            sets,
        }
    }

    fn request(exercises: Vec<NewExercise>) -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            workout_name: "Leg Day".into(),
            workout_date: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
            duration_hours: 1,
            duration_minutes: 10,
            overall_rpe: dec!(8),
            estimated_calories: 450,
            activity_type: ActivityType::Strength,
            exercises,
        }
    }

    fn setup() -> (InMemoryStore, WorkoutRepository) {
        let store = InMemoryStore::new();
        let repo = WorkoutRepository::new(Arc::new(store.clone()));
        (store, repo)
    }

    #[tokio::test]
    async fn create_then_read_preserves_shape_and_order() {
        let (_store, repo) = setup();
        let shape = [3usize, 0, 1, 2];
        let exercises = shape
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                exercise(
                    &format!("exercise {i}"),
                    (0..n).map(|j| set(&format!("{j}0kg"), "5")).collect(),
                )
            })
            .collect();

        let id = repo.create_workout(OWNER, &request(exercises)).await.unwrap();
        let session = repo.get_workout(OWNER, id).await.unwrap();

        assert_eq!(session.id, id);
        assert_eq!(session.user_id, OWNER);
        assert_eq!(session.exercises.len(), shape.len());
        for (i, (got, &n)) in session.exercises.iter().zip(shape.iter()).enumerate() {
            assert_eq!(got.order, i as u32);
            assert_eq!(got.name, format!("exercise {i}"));
            assert_eq!(got.workout_id, id);
            assert_eq!(got.sets.len(), n);
            for set in &got.sets {
                assert_eq!(set.exercise_id, got.id);
            }
        }
        assert_eq!(session.total_sets(), 6);
    }

    #[tokio::test]
    async fn leg_day_round_trip() {
        let (_store, repo) = setup();
        let req = request(vec![exercise("Squat", vec![set("100kg", "5"), set("100kg", "5")])]);

        let id = repo.create_workout(OWNER, &req).await.unwrap();
        let session = repo.get_workout(OWNER, id).await.unwrap();

        assert_eq!(session.workout_name, "Leg Day");
        assert_eq!(session.activity_type, ActivityType::Strength);
        assert_eq!(session.exercises.len(), 1);
        let squat = &session.exercises[0];
        assert_eq!(squat.name, "Squat");
        assert_eq!(squat.sets.len(), 2);
        assert!(squat.sets.iter().all(|s| s.weight == "100kg" && s.reps == "5"));
    }

    #[tokio::test]
    async fn reads_sort_exercises_by_stored_order() {
        let (store, repo) = setup();
        let id = repo.create_workout(OWNER, &request(vec![])).await.unwrap();
        // Written out of order on purpose.
        for (order, name) in [(2, "c"), (0, "a"), (1, "b")] {
            store
                .seed(
                    EXERCISES,
                    json!({ "id": Uuid::new_v4(), "workout_id": id, "name": name, "notes": "", "order": order }),
                )
                .await;
        }

        let session = repo.get_workout(OWNER, id).await.unwrap();
        let names: Vec<_> = session.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn list_only_returns_the_callers_sessions() {
        let (_store, repo) = setup();
        repo.create_workout(OWNER, &request(vec![exercise("Squat", vec![set("1", "1")])]))
            .await
            .unwrap();
        repo.create_workout(OWNER, &request(vec![])).await.unwrap();
        repo.create_workout("someone-else", &request(vec![])).await.unwrap();

        let sessions = repo.list_workouts(OWNER).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s.user_id == OWNER));
        assert_eq!(sessions.iter().map(|s| s.total_sets()).sum::<usize>(), 1);
    }

    #[tokio::test]
    async fn exercise_fetch_failure_still_returns_the_session() {
        let (store, repo) = setup();
        let id = repo
            .create_workout(OWNER, &request(vec![exercise("Squat", vec![set("1", "1")])]))
            .await
            .unwrap();

        store.fail(EXERCISES, Operation::Query).await;
        let session = repo.get_workout(OWNER, id).await.unwrap();
        assert_eq!(session.id, id);
        assert!(session.exercises.is_empty());

        let listed = repo.list_workouts(OWNER).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].exercises.is_empty());
    }

    #[tokio::test]
    async fn set_fetch_failure_keeps_the_exercises() {
        let (store, repo) = setup();
        let id = repo
            .create_workout(
                OWNER,
                &request(vec![
                    exercise("Squat", vec![set("1", "1")]),
                    exercise("Lunge", vec![set("2", "2")]),
                ]),
            )
            .await
            .unwrap();

        // The first exercise's sets load, the second's fail.
        store.fail_after(SETS, Operation::Query, 1).await;
        let session = repo.get_workout(OWNER, id).await.unwrap();
        assert_eq!(session.exercises.len(), 2);
        assert_eq!(session.exercises[0].sets.len(), 1);
        assert!(session.exercises[1].sets.is_empty());
    }

    #[tokio::test]
    async fn session_fetch_failure_is_an_error() {
        let (store, repo) = setup();
        store.fail(SESSIONS, Operation::Query).await;
        let err = repo.list_workouts(OWNER).await.unwrap_err();
        assert!(matches!(err, DbError::Store(ApiError::Upstream { .. })));
    }

    #[tokio::test]
    async fn foreign_session_is_not_found() {
        let (_store, repo) = setup();
        let id = repo.create_workout(OWNER, &request(vec![])).await.unwrap();
        assert!(matches!(repo.get_workout("intruder", id).await, Err(DbError::NotFound)));
        assert!(matches!(
            repo.get_workout(OWNER, Uuid::new_v4()).await,
            Err(DbError::NotFound)
        ));
    }

    #[tokio::test]
    async fn failed_set_write_reports_what_was_committed() {
        let (store, repo) = setup();
        // Two sets go in, the third write fails.
        store.fail_after(SETS, Operation::Insert, 2).await;
        let req = request(vec![
            exercise("Squat", vec![set("1", "1"), set("2", "2")]),
            exercise("Lunge", vec![set("3", "3"), set("4", "4")]),
        ]);

        let (session_id, committed, source) = match repo.create_workout(OWNER, &req).await {
            Err(DbError::PartialWrite {
                session_id,
                committed,
                source,
            }) => (session_id, committed, source),
            other => panic!("expected a partial write, got {other:?}"),
        };

        assert!(committed.session);
        assert_eq!(committed.exercises.len(), 2);
        assert_eq!(committed.sets.len(), 2);
        assert!(matches!(source, ApiError::Upstream { .. }));

        // No compensation: the committed rows are still there.
        assert_eq!(store.rows(SESSIONS).await.len(), 1);
        assert_eq!(store.rows(EXERCISES).await.len(), 2);
        assert_eq!(store.rows(SETS).await.len(), 2);

        // And the caller can re-query what persisted.
        store.clear_failures().await;
        let session = repo.get_workout(OWNER, session_id).await.unwrap();
        assert_eq!(session.total_sets(), 2);
    }

    #[tokio::test]
    async fn failed_session_write_commits_nothing() {
        let (store, repo) = setup();
        store.fail(SESSIONS, Operation::Insert).await;
        let err = repo
            .create_workout(OWNER, &request(vec![exercise("Squat", vec![])]))
            .await
            .unwrap_err();
        match err {
            DbError::PartialWrite { committed, .. } => assert_eq!(committed, CommittedRows::default()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.rows(EXERCISES).await.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_the_whole_aggregate() {
        let (store, repo) = setup();
        let id = repo
            .create_workout(
                OWNER,
                &request(vec![
                    exercise("Squat", vec![set("1", "1"), set("2", "2")]),
                    exercise("Lunge", vec![set("3", "3")]),
                ]),
            )
            .await
            .unwrap();
        let before = repo.get_workout(OWNER, id).await.unwrap();

        let report = repo.delete_workout(OWNER, id).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.exercises_deleted, 2);
        assert_eq!(report.sets_deleted, 3);

        assert!(matches!(repo.get_workout(OWNER, id).await, Err(DbError::NotFound)));
        for exercise in &before.exercises {
            let orphans = store
                .query(SETS, &Filters::from([("exercise_id", exercise.id.to_string())]))
                .await
                .unwrap();
            assert!(orphans.is_empty());
            let gone = store
                .query(EXERCISES, &Filters::from([("id", exercise.id.to_string())]))
                .await
                .unwrap();
            assert!(gone.is_empty());
        }
    }

    #[tokio::test]
    async fn deleting_someone_elses_session_changes_nothing() {
        let (store, repo) = setup();
        let id = repo
            .create_workout(OWNER, &request(vec![exercise("Squat", vec![set("1", "1")])]))
            .await
            .unwrap();

        let err = repo.delete_workout("intruder", id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
        assert_eq!(store.rows(SESSIONS).await.len(), 1);
        assert_eq!(store.rows(EXERCISES).await.len(), 1);
        assert_eq!(store.rows(SETS).await.len(), 1);
    }

    #[tokio::test]
    async fn child_delete_failures_are_reported_not_fatal() {
        let (store, repo) = setup();
        let id = repo
            .create_workout(OWNER, &request(vec![exercise("Squat", vec![set("1", "1"), set("2", "2")])]))
            .await
            .unwrap();

        store.fail_after(SETS, Operation::Delete, 1).await;
        let report = repo.delete_workout(OWNER, id).await.unwrap();

        assert!(!report.is_complete());
        assert_eq!(report.sets_deleted, 1);
        assert_eq!(report.exercises_deleted, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].table, SETS);
        assert_eq!(report.failures[0].step, CascadeStep::Delete);

        // The session is gone; the set that failed is left orphaned.
        assert!(store.rows(SESSIONS).await.is_empty());
        assert_eq!(store.rows(SETS).await.len(), 1);
    }

    #[tokio::test]
    async fn exercise_lookup_failure_still_deletes_the_session() {
        let (store, repo) = setup();
        let id = repo
            .create_workout(OWNER, &request(vec![exercise("Squat", vec![])]))
            .await
            .unwrap();

        store.fail(EXERCISES, Operation::Query).await;
        let report = repo.delete_workout(OWNER, id).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step, CascadeStep::Lookup);
        assert_eq!(report.failures[0].record_id, id);
        assert!(store.rows(SESSIONS).await.is_empty());
        assert_eq!(store.rows(EXERCISES).await.len(), 1);
    }

    #[tokio::test]
    async fn failing_to_delete_the_session_is_an_error() {
        let (store, repo) = setup();
        let id = repo.create_workout(OWNER, &request(vec![])).await.unwrap();
        store.fail(SESSIONS, Operation::Delete).await;
        assert!(matches!(
            repo.delete_workout(OWNER, id).await,
            Err(DbError::Store(_))
        ));
    }
}
