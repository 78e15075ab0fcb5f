use crate::{AppState, error::AppError};
use auth::AuthError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use std::sync::Arc;

/// The caller behind a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

/// Rejects the request with 401 unless it carries a valid bearer token, then
/// makes the caller available to handlers as an `AuthUser` extension.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|rejection| {
        if rejection.is_missing() {
            AppError::Unauthorized("Authorization header required".to_string())
        } else {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        }
    })?;

    let claims = state.tokens.verify(bearer.token()).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected.");
        match e {
            AuthError::Expired => AppError::Unauthorized("Token has expired".to_string()),
            _ => AppError::Unauthorized("Invalid or expired token".to_string()),
        }
    })?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    });
    Ok(next.run(req).await)
}
