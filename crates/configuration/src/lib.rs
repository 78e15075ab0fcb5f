use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{AuthSettings, Overrides, ServerSettings, Settings, StoreSettings};

/// Loads the application settings.
///
/// A `.env` file in the working directory is read first when present, then the
/// process environment is deserialized into our strongly-typed `Settings`.
/// Missing required variables are reported together as a single error.
pub fn load_settings() -> Result<Settings, ConfigError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(ConfigError::ValidationError(format!(
                "failed to read .env file: {e}"
            )));
        }
    }
    Settings::from_env()
}
