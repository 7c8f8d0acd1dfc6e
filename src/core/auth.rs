//! Auth subsystem seam and the anonymous session token
//!
//! The engine only ever asks "who is the current principal?"; sign-in
//! flows live outside this crate. With remote disabled a demo principal
//! can be stored locally so sign-in UIs keep working, but it never
//! affects data partitioning.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::keys::{DEMO_AUTH_USER_KEY, SESSION_TOKEN_KEY};
use super::local::LocalStore;

/// An authenticated principal as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
}

/// Errors from the auth provider
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("auth provider error: {0}")]
    Provider(String),
}

/// Read-only view of the auth subsystem
pub trait AuthProvider {
    /// The currently signed-in principal, or `None` when anonymous
    fn current_principal(&self) -> Result<Option<Principal>, AuthError>;
}

/// Provider for contexts with no auth integration (always anonymous)
pub struct NoAuth;

impl AuthProvider for NoAuth {
    fn current_principal(&self) -> Result<Option<Principal>, AuthError> {
        Ok(None)
    }
}

/// Provider with a fixed principal; used by tests and the CLI after a
/// credential check has already happened elsewhere
pub struct StaticAuth {
    principal: Option<Principal>,
}

impl StaticAuth {
    pub fn signed_in(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            principal: Some(Principal {
                id: id.into(),
                email: email.into(),
            }),
        }
    }

    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

impl AuthProvider for StaticAuth {
    fn current_principal(&self) -> Result<Option<Principal>, AuthError> {
        Ok(self.principal.clone())
    }
}

/// Get the stable anonymous session token, generating and persisting it
/// on first use. The token survives restarts so an anonymous client keeps
/// a consistent owner identity until sign-in promotes it.
pub fn session_token(store: &LocalStore) -> String {
    let existing: Option<String> = store.load(SESSION_TOKEN_KEY, None);
    match existing {
        Some(token) if !token.is_empty() => token,
        _ => {
            let token = format!("session_{}", Uuid::new_v4());
            store.save(SESSION_TOKEN_KEY, &token);
            token
        }
    }
}

/// Store a demo principal locally (remote-disabled deployments only)
pub fn demo_sign_in(store: &LocalStore, email: &str) -> Principal {
    let user = Principal {
        id: "demo-user".to_string(),
        email: email.to_string(),
    };
    store.save(DEMO_AUTH_USER_KEY, &user);
    user
}

/// Clear the stored demo principal
pub fn demo_sign_out(store: &LocalStore) {
    store.remove(DEMO_AUTH_USER_KEY);
}

/// The stored demo principal, if any
pub fn demo_current_user(store: &LocalStore) -> Option<Principal> {
    store.load(DEMO_AUTH_USER_KEY, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_is_stable_across_calls() {
        let store = LocalStore::in_memory();
        let first = session_token(&store);
        let second = session_token(&store);
        assert_eq!(first, second);
        assert!(first.starts_with("session_"));
    }

    #[test]
    fn demo_sign_in_round_trips() {
        let store = LocalStore::in_memory();
        assert!(demo_current_user(&store).is_none());
        demo_sign_in(&store, "qa@example.com");
        assert_eq!(
            demo_current_user(&store).unwrap().email,
            "qa@example.com"
        );
        demo_sign_out(&store);
        assert!(demo_current_user(&store).is_none());
    }
}
