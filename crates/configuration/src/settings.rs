use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_ENVIRONMENT: &str = "development";

/// The root configuration structure for the entire application.
///
/// Built once at startup and handed by reference to every collaborator.
#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    pub auth: AuthSettings,
    pub server: ServerSettings,
}

/// Connection details for the hosted backend (record store + identity API).
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public key, used for identity calls and as the data key fallback.
    pub anon_key: String,
    /// Service-role key. When present it is used for table access.
    pub service_key: Option<String>,
}

/// Parameters for the locally signed claims token.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    /// `development`, `production`, ...
    pub environment: String,
}

impl ServerSettings {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Command-line overrides applied on top of the environment.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct Overrides {
    /// Port to listen on (overrides `PORT`).
    #[cfg_attr(feature = "clap", arg(long))]
    pub port: Option<u16>,

    /// Deployment environment (overrides `ENVIRONMENT`).
    #[cfg_attr(feature = "clap", arg(long))]
    pub environment: Option<String>,
}

/// The flat shape of the environment, one field per variable
/// (`SUPABASE_URL` → `supabase_url`).
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    supabase_url: String,
    #[serde(default)]
    supabase_anon_key: String,
    #[serde(default)]
    supabase_service_key: Option<String>,
    #[serde(default)]
    jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    jwt_expiry_hours: i64,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_environment")]
    environment: String,
}

fn default_token_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_HOURS
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::build(config::Environment::default())
    }

    /// Reads the settings from an explicit set of variables instead of the
    /// process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::build(
            config::Environment::default().source(Some(vars.into_iter().collect())),
        )
    }

    fn build(source: config::Environment) -> Result<Self, ConfigError> {
        let raw = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize::<RawSettings>()?;

        let mut missing = Vec::new();
        if raw.supabase_url.trim().is_empty() {
            missing.push("SUPABASE_URL");
        }
        if raw.supabase_anon_key.trim().is_empty() {
            missing.push("SUPABASE_ANON_KEY");
        }
        if raw.jwt_secret.is_empty() {
            missing.push("JWT_SECRET");
        }
        if !missing.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "missing required environment variable(s): {}",
                missing.join(", ")
            )));
        }
        if raw.jwt_expiry_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "JWT_EXPIRY_HOURS must be a positive number of hours".to_string(),
            ));
        }

        Ok(Self {
            store: StoreSettings {
                url: raw.supabase_url.trim_end_matches('/').to_string(),
                anon_key: raw.supabase_anon_key,
                service_key: raw.supabase_service_key.filter(|k| !k.trim().is_empty()),
            },
            auth: AuthSettings {
                jwt_secret: raw.jwt_secret,
                token_ttl_hours: raw.jwt_expiry_hours,
            },
            server: ServerSettings {
                port: raw.port,
                environment: raw.environment,
            },
        })
    }

    /// Applies command-line overrides.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(environment) = &overrides.environment {
            self.server.environment = environment.clone();
        }
        self
    }
}
