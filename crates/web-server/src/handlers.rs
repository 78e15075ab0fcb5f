use crate::{AppState, error::AppError, middleware::AuthUser};
use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use core_types::{
    AuthResponse, CreateWorkoutRequest, LoginRequest, RegisterRequest, Validate, WorkoutSession,
};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Unwraps a JSON body and runs its validation rules.
fn checked<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(body) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    body.validate()?;
    Ok(body)
}

/// Unwraps a workout id from the path.
fn workout_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, AppError> {
    let Path(id) = path.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    Ok(id)
}

/// # GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "fittrack-api" }))
}

/// # POST /api/v1/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = checked(payload)?;
    let user = state
        .identity
        .sign_up(&req.email, &req.password)
        .await
        .map_err(AppError::SignUp)?;
    let token = state
        .tokens
        .issue(&user.id, &user.email)
        .map_err(AppError::Token)?;

    tracing::info!(user_id = %user.id, "account created");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// # POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let req = checked(payload)?;
    let user = state
        .identity
        .sign_in(&req.email, &req.password)
        .await
        .map_err(AppError::SignIn)?;
    let token = state
        .tokens
        .issue(&user.id, &user.email)
        .map_err(AppError::Token)?;
    Ok(Json(AuthResponse { token, user }))
}

/// # POST /api/v1/workouts
pub async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateWorkoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let req = checked(payload)?;
    let id = state.repo.create_workout(&user.user_id, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Workout created successfully" })),
    ))
}

/// # GET /api/v1/workouts
pub async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WorkoutSession>>, AppError> {
    let workouts = state.repo.list_workouts(&user.user_id).await?;
    Ok(Json(workouts))
}

/// # GET /api/v1/workouts/:id
pub async fn get_workout(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<WorkoutSession>, AppError> {
    let id = workout_id(path)?;
    let workout = state.repo.get_workout(&user.user_id, id).await?;
    Ok(Json(workout))
}

/// # DELETE /api/v1/workouts/:id
/// Child rows that could not be removed are listed under `cascade.failures`.
pub async fn delete_workout(
    path: Result<Path<Uuid>, PathRejection>,
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let id = workout_id(path)?;
    let report = state.repo.delete_workout(&user.user_id, id).await?;
    Ok(Json(json!({
        "message": "Workout deleted successfully",
        "cascade": report,
    })))
}

pub async fn parse_food_text() -> Json<Value> {
    Json(json!({ "message": "Food text parsing - Coming in Phase 2" }))
}

pub async fn parse_food_image() -> Json<Value> {
    Json(json!({ "message": "Food image parsing - Coming in Phase 2" }))
}

pub async fn food_logs() -> Json<Value> {
    Json(json!({ "message": "Food logs - Coming in Phase 2" }))
}

pub async fn dashboard() -> Json<Value> {
    Json(json!({ "message": "Dashboard insights - Coming in Phase 3" }))
}
