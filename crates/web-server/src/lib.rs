use api_client::{IdentityProvider, RecordStore, SupabaseClient};
use auth::TokenCodec;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    },
    middleware::from_fn_with_state,
    routing::{get, post},
};
use configuration::Settings;
use database::WorkoutRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;
pub mod middleware;

pub use middleware::AuthUser;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub repo: WorkoutRepository,
    pub identity: Arc<dyn IdentityProvider>,
    pub tokens: TokenCodec,
}

impl AppState {
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            repo: WorkoutRepository::new(store),
            identity,
            tokens,
        }
    }

    /// Wires the hosted backend and the token codec from settings.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = Arc::new(SupabaseClient::new(&settings.store)?);
        let tokens = TokenCodec::new(
            &settings.auth.jwt_secret,
            chrono::Duration::hours(settings.auth.token_ttl_hours),
        );
        Ok(Self::new(client.clone(), client, tokens))
    }
}

/// Builds the full route table.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([ORIGIN, CONTENT_TYPE, AUTHORIZATION]);

    // route_layer keeps unknown paths at 404 instead of 401.
    let protected = Router::new()
        .route(
            "/workouts",
            post(handlers::create_workout).get(handlers::list_workouts),
        )
        .route(
            "/workouts/:id",
            get(handlers::get_workout).delete(handlers::delete_workout),
        )
        .route("/food/parse-text", post(handlers::parse_food_text))
        .route("/food/parse-image", post(handlers::parse_food_image))
        .route("/food/logs", get(handlers::food_logs))
        .route("/dashboard", get(handlers::dashboard))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_bearer));

    let api = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .merge(protected);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        // Logs every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(settings: &Settings) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_settings(settings)?);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        environment = %settings.server.environment,
        "Web server listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}
