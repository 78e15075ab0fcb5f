use crate::error::ApiError;
use async_trait::async_trait;
use configuration::StoreSettings;
use core_types::User;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub mod error;
pub mod memory;
pub mod responses;
// --- Public API ---
pub use memory::{InMemoryIdentity, InMemoryStore, Operation};
pub use responses::{IdentityEnvelope, IdentityUser};

/// Equality filters for a point query, field name → value.
/// Each entry is sent as `field=eq.value`.
pub type Filters = BTreeMap<&'static str, String>;

/// The generic, abstract interface for a table-based record store.
///
/// Every call is a single request/response against one named table. There
/// is no transaction spanning calls: each successful write is committed on
/// its own. Implementations make exactly one attempt per call.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns every row of `table` matching all `filters`, in the store's order.
    async fn query(&self, table: &str, filters: &Filters) -> Result<Vec<Value>, ApiError>;

    /// Inserts one row and returns the stored representation.
    async fn insert(&self, table: &str, record: &Value) -> Result<Value, ApiError>;

    /// Applies `patch` to the row with the given id and returns the updated rows.
    async fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Vec<Value>, ApiError>;

    /// Deletes the row with the given id.
    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError>;
}

/// The external identity service that owns accounts and passwords.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates an account.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, ApiError>;

    /// Verifies a password and returns the account it belongs to.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError>;
}

/// A concrete implementation of both interfaces for a Supabase project:
/// PostgREST tables under `/rest/v1` and GoTrue under `/auth/v1`.
#[derive(Clone)]
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    /// Key used for table access: the service key when configured.
    data_key: String,
    /// Public key, always used for identity calls.
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(settings: &StoreSettings) -> Result<Self, ApiError> {
        let data_key = settings
            .service_key
            .clone()
            .unwrap_or_else(|| settings.anon_key.clone());

        // Fail at startup rather than on the first request.
        for key in [&data_key, &settings.anon_key] {
            HeaderValue::from_str(key)
                .map_err(|_| ApiError::InvalidData("API key is not a valid header value".into()))?;
        }

        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        Ok(Self {
            client: reqwest::Client::builder().default_headers(headers).build()?,
            base_url: settings.url.trim_end_matches('/').to_string(),
            data_key,
            anon_key: settings.anon_key.clone(),
        })
    }

    /// Builds `/rest/v1/<table>?field=eq.value&...`.
    fn table_url(&self, table: &str, filters: &Filters) -> Result<String, ApiError> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        if filters.is_empty() {
            return Ok(url);
        }
        let eq: BTreeMap<&str, String> = filters
            .iter()
            .map(|(field, value)| (*field, format!("eq.{value}")))
            .collect();
        let query_string =
            serde_qs::to_string(&eq).map_err(|e| ApiError::InvalidData(e.to_string()))?;
        Ok(format!("{url}?{query_string}"))
    }

    fn id_filter(id: &str) -> Filters {
        Filters::from([("id", id.to_string())])
    }

    fn with_key(request: RequestBuilder, key: &str) -> RequestBuilder {
        request
            .header("apikey", key)
            .header(AUTHORIZATION, format!("Bearer {key}"))
    }

    /// Reads the body of a response, turning any non-success status into
    /// `ApiError::Upstream` with the body untouched.
    async fn read_body(response: Response) -> Result<String, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::Upstream {
                status: status.as_u16(),
                body: text,
            })
        }
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let text = Self::read_body(response).await?;
        serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    async fn identity_call(
        &self,
        request: RequestBuilder,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let response = Self::with_key(request, &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let text = Self::read_body(response).await?;

        let envelope: IdentityEnvelope = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidData(format!("unexpected identity response: {e}")))?;
        envelope
            .user
            .map(User::from)
            .ok_or_else(|| ApiError::InvalidData("identity response has no user".into()))
    }
}

#[async_trait]
impl RecordStore for SupabaseClient {
    async fn query(&self, table: &str, filters: &Filters) -> Result<Vec<Value>, ApiError> {
        let url = self.table_url(table, filters)?;
        tracing::debug!(table, ?filters, "store query");
        let response = Self::with_key(self.client.get(&url), &self.data_key)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn insert(&self, table: &str, record: &Value) -> Result<Value, ApiError> {
        let url = self.table_url(table, &Filters::new())?;
        tracing::debug!(table, "store insert");
        let response = Self::with_key(self.client.post(&url), &self.data_key)
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;
        let mut rows: Vec<Value> = Self::read_json(response).await?;
        if rows.is_empty() {
            return Err(ApiError::InvalidData(format!(
                "insert into {table} returned no representation"
            )));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Vec<Value>, ApiError> {
        let url = self.table_url(table, &Self::id_filter(id))?;
        tracing::debug!(table, id, "store update");
        let response = Self::with_key(self.client.patch(&url), &self.data_key)
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError> {
        let url = self.table_url(table, &Self::id_filter(id))?;
        tracing::debug!(table, id, "store delete");
        let response = Self::with_key(self.client.delete(&url), &self.data_key)
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        self.identity_call(self.client.post(&url), email, password)
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let request = self.client.post(&url).query(&[("grant_type", "password")]);
        self.identity_call(request, email, password).await
    }
}
