//! Owner identity resolution
//!
//! Produces the durable owner id used as the partition key for all sync
//! records. Authenticated principals win over the anonymous session
//! token; the first authenticated resolution after anonymous use migrates
//! the session's records to the authenticated id (the promotion path).
//!
//! Resolution never raises: any failure returns `None`, which callers
//! treat as "operate locally for this call".

use super::auth::{session_token, AuthProvider};
use super::local::LocalStore;
use super::remote::{RemoteError, RemoteStore};

/// Resolve the current owner id, or `None` when the remote is disabled
/// or resolution fails.
pub fn resolve_owner(
    remote: Option<&dyn RemoteStore>,
    auth: &dyn AuthProvider,
    local: &LocalStore,
) -> Option<String> {
    let remote = remote?;

    match try_resolve(remote, auth, local) {
        Ok(owner) => Some(owner),
        Err(e) => {
            eprintln!("Warning: owner resolution failed, using local-only mode: {}", e);
            None
        }
    }
}

fn try_resolve(
    remote: &dyn RemoteStore,
    auth: &dyn AuthProvider,
    local: &LocalStore,
) -> Result<String, String> {
    let principal = auth.current_principal().map_err(|e| e.to_string())?;

    if let Some(principal) = principal {
        // Known authenticated owner: touch and return
        if let Some(user) = remote
            .find_user(&principal.id)
            .map_err(|e| e.to_string())?
        {
            let _ = remote.touch_user(&user.id);
            return Ok(user.id);
        }

        // First authenticated visit. If this client accrued data under its
        // anonymous session, migrate it before the session row disappears:
        // records must be re-pointed first or they become unreachable.
        let session = session_token(local);
        if let Some(session_user) = remote
            .find_user_by_session(&session)
            .map_err(|e| e.to_string())?
        {
            remote
                .repoint_records(&session_user.id, &principal.id)
                .map_err(|e| e.to_string())?;
            remote
                .delete_user(&session_user.id)
                .map_err(|e| e.to_string())?;
        }

        // Ensure the authenticated row exists. A constraint violation here
        // means a concurrent resolver won the race; the id is still valid.
        match remote.upsert_user(&principal.id, &format!("auth_{}", principal.id)) {
            Ok(()) | Err(RemoteError::Constraint(_)) => {}
            Err(e) => {
                eprintln!("Warning: could not create owner record: {}", e);
            }
        }

        return Ok(principal.id);
    }

    // Anonymous: the persisted session token is the stable pseudo-identity
    let session = session_token(local);
    if let Some(user) = remote
        .find_user_by_session(&session)
        .map_err(|e| e.to_string())?
    {
        let _ = remote.touch_user(&user.id);
        return Ok(user.id);
    }

    let user = remote.insert_user(&session).map_err(|e| e.to_string())?;
    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{AuthError, NoAuth, Principal, StaticAuth};
    use crate::core::remote::{SqliteRemote, SyncRecordInput};
    use chrono::Utc;

    #[test]
    fn disabled_remote_resolves_to_none() {
        let local = LocalStore::in_memory();
        assert_eq!(resolve_owner(None, &NoAuth, &local), None);
    }

    #[test]
    fn anonymous_owner_is_created_once() {
        let local = LocalStore::in_memory();
        let remote = SqliteRemote::in_memory().unwrap();

        let first = resolve_owner(Some(&remote), &NoAuth, &local).unwrap();
        let second = resolve_owner(Some(&remote), &NoAuth, &local).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn promotion_repoints_session_records() {
        let local = LocalStore::in_memory();
        let remote = SqliteRemote::in_memory().unwrap();

        // Accrue data as the anonymous session owner
        let session_owner = resolve_owner(Some(&remote), &NoAuth, &local).unwrap();
        remote
            .insert_record(&SyncRecordInput {
                user_id: session_owner.clone(),
                data_type: "k".into(),
                data: serde_json::json!(["x"]),
                project_id: None,
                updated_at: Utc::now(),
            })
            .unwrap();

        // Sign in: records must follow the authenticated id
        let auth = StaticAuth::signed_in("auth-1", "qa@example.com");
        let owner = resolve_owner(Some(&remote), &auth, &local).unwrap();
        assert_eq!(owner, "auth-1");
        assert_eq!(remote.list_records("auth-1").unwrap().len(), 1);
        assert_eq!(remote.list_records(&session_owner).unwrap().len(), 0);
        assert!(remote.find_user(&session_owner).unwrap().is_none());
    }

    #[test]
    fn promotion_is_idempotent() {
        let local = LocalStore::in_memory();
        let remote = SqliteRemote::in_memory().unwrap();

        let session_owner = resolve_owner(Some(&remote), &NoAuth, &local).unwrap();
        remote
            .insert_record(&SyncRecordInput {
                user_id: session_owner,
                data_type: "k".into(),
                data: serde_json::json!(["x"]),
                project_id: None,
                updated_at: Utc::now(),
            })
            .unwrap();

        let auth = StaticAuth::signed_in("auth-1", "qa@example.com");
        resolve_owner(Some(&remote), &auth, &local).unwrap();
        let owner = resolve_owner(Some(&remote), &auth, &local).unwrap();

        assert_eq!(owner, "auth-1");
        assert_eq!(remote.list_records("auth-1").unwrap().len(), 1);
    }

    #[test]
    fn auth_failure_degrades_to_none() {
        struct FailingAuth;
        impl AuthProvider for FailingAuth {
            fn current_principal(&self) -> Result<Option<Principal>, AuthError> {
                Err(AuthError::Provider("token expired".into()))
            }
        }

        let local = LocalStore::in_memory();
        let remote = SqliteRemote::in_memory().unwrap();
        assert_eq!(resolve_owner(Some(&remote), &FailingAuth, &local), None);
    }
}
