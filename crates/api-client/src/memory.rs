//! In-process stand-ins for the hosted backend.
//!
//! `InMemoryStore` keeps rows as JSON per table and honours the same
//! contract as the REST store: equality filters, insert returning the stored
//! row, no cascades, no transactions. Failures can be injected per table and
//! operation to exercise partial-write and lenient-read paths.

use crate::error::ApiError;
use crate::{Filters, IdentityProvider, RecordStore};
use async_trait::async_trait;
use core_types::User;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A store call, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Query,
    Insert,
    Update,
    Delete,
}

/// Lets `successes` calls through, then fails every call after that.
#[derive(Debug, Clone, Copy)]
struct FailurePlan {
    successes: usize,
    seen: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    tables: HashMap<String, Vec<Value>>,
    failures: HashMap<(String, Operation), FailurePlan>,
}

impl StoreState {
    fn should_fail(&mut self, table: &str, op: Operation) -> Result<(), ApiError> {
        if let Some(plan) = self.failures.get_mut(&(table.to_string(), op)) {
            if plan.seen >= plan.successes {
                return Err(ApiError::Upstream {
                    status: 503,
                    body: format!("injected {op:?} failure on {table}"),
                });
            }
            plan.seen += 1;
        }
        Ok(())
    }
}

/// Renders a stored field the way it would appear in an `eq.` filter.
fn filter_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, filters: &Filters) -> bool {
    filters.iter().all(|(field, expected)| {
        row.get(*field)
            .map(|actual| filter_text(actual) == *expected)
            .unwrap_or(false)
    })
}

fn has_id(row: &Value, id: &str) -> bool {
    row.get("id").map(|v| filter_text(v) == id).unwrap_or(false)
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `op` on `table` fail from now on.
    pub async fn fail(&self, table: &str, op: Operation) {
        self.fail_after(table, op, 0).await;
    }

    /// Lets `successes` more `op` calls on `table` through, then fails the rest.
    pub async fn fail_after(&self, table: &str, op: Operation, successes: usize) {
        let mut state = self.state.lock().await;
        state
            .failures
            .insert((table.to_string(), op), FailurePlan { successes, seen: 0 });
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failures.clear();
    }

    /// Every row currently in `table`, in insertion order.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .tables
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Writes a row directly, bypassing failure injection.
    pub async fn seed(&self, table: &str, row: Value) {
        self.state
            .lock()
            .await
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn query(&self, table: &str, filters: &Filters) -> Result<Vec<Value>, ApiError> {
        let mut state = self.state.lock().await;
        state.should_fail(table, Operation::Query)?;
        Ok(state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| matches(r, filters)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert(&self, table: &str, record: &Value) -> Result<Value, ApiError> {
        let mut state = self.state.lock().await;
        state.should_fail(table, Operation::Insert)?;
        if !record.is_object() {
            return Err(ApiError::Upstream {
                status: 400,
                body: "row must be a JSON object".to_string(),
            });
        }
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Vec<Value>, ApiError> {
        let mut state = self.state.lock().await;
        state.should_fail(table, Operation::Update)?;
        let Some(fields) = patch.as_object() else {
            return Err(ApiError::Upstream {
                status: 400,
                body: "patch must be a JSON object".to_string(),
            });
        };

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| has_id(r, id)) {
                if let Some(object) = row.as_object_mut() {
                    for (key, value) in fields {
                        object.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.should_fail(table, Operation::Delete)?;
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|r| !has_id(r, id));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Account {
    id: String,
    password: String,
}

/// An identity provider that keeps accounts in memory.
///
/// Sign-up rejects an email that is already registered; sign-in checks the
/// stored password. Rejections carry GoTrue-style messages.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentity {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(ApiError::Upstream {
                status: 422,
                body: "User already registered".to_string(),
            });
        }
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            password: password.to_string(),
        };
        let user = User {
            id: account.id.clone(),
            email: email.to_string(),
        };
        accounts.insert(email.to_string(), account);
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let accounts = self.accounts.lock().await;
        match accounts.get(email) {
            Some(account) if account.password == password => Ok(User {
                id: account.id.clone(),
                email: email.to_string(),
            }),
            _ => Err(ApiError::Upstream {
                status: 400,
                body: "Invalid login credentials".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn query_matches_every_filter() {
        let store = InMemoryStore::new();
        store.seed("t", json!({ "id": "1", "owner": "a", "order": 0 })).await;
        store.seed("t", json!({ "id": "2", "owner": "b", "order": 0 })).await;
        store.seed("t", json!({ "id": "3", "owner": "a", "order": 1 })).await;

        let filters = Filters::from([("owner", "a".to_string()), ("order", "1".to_string())]);
        let rows = store.query("t", &filters).await.unwrap();
        assert_eq!(rows, vec![json!({ "id": "3", "owner": "a", "order": 1 })]);
    }

    #[tokio::test]
    async fn injected_failures_start_after_the_allowed_successes() {
        let store = InMemoryStore::new();
        store.fail_after("t", Operation::Insert, 1).await;

        store.insert("t", &json!({ "id": "1" })).await.unwrap();
        let err = store.insert("t", &json!({ "id": "2" })).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream { status: 503, .. }));
        assert_eq!(store.rows("t").await.len(), 1);

        store.clear_failures().await;
        store.insert("t", &json!({ "id": "2" })).await.unwrap();
        assert_eq!(store.rows("t").await.len(), 2);
    }

    #[tokio::test]
    async fn update_merges_and_delete_removes() {
        let store = InMemoryStore::new();
        store.seed("t", json!({ "id": "1", "name": "old", "keep": true })).await;

        let updated = store.update("t", "1", &json!({ "name": "new" })).await.unwrap();
        assert_eq!(updated, vec![json!({ "id": "1", "name": "new", "keep": true })]);

        assert!(store.update("t", "missing", &json!({ "name": "x" })).await.unwrap().is_empty());

        store.delete("t", "1").await.unwrap();
        assert!(store.rows("t").await.is_empty());
    }

    #[tokio::test]
    async fn identity_round_trip() {
        let identity = InMemoryIdentity::new();
        let created = identity.sign_up("a@b.co", "password1").await.unwrap();
        let signed_in = identity.sign_in("a@b.co", "password1").await.unwrap();
        assert_eq!(created, signed_in);

        assert!(identity.sign_up("a@b.co", "password1").await.is_err());
        assert!(identity.sign_in("a@b.co", "wrong").await.is_err());
    }
}
