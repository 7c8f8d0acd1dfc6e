//! Shared command helpers

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Config, LocalStore, NoAuth, SqliteRemote, StaticAuth, SyncEngine};

/// Build the engine from config overlaid with command-line options.
///
/// A remote that fails to open degrades to offline mode rather than
/// failing the command; the local tier must stay usable regardless.
pub fn build_engine(global: &GlobalOpts) -> Result<SyncEngine> {
    let config = Config::load();

    let data_dir = global
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data_dir());
    let local = LocalStore::open(&data_dir);

    let remote_path = global.remote_db.clone().or_else(|| config.remote_db.clone());
    let remote: Option<Box<dyn crate::core::RemoteStore>> = match remote_path {
        Some(path) => match SqliteRemote::open(&path) {
            Ok(remote) => Some(Box::new(remote)),
            Err(e) => {
                eprintln!("Warning: remote store unavailable ({}), running offline", e);
                None
            }
        },
        None => None,
    };

    let auth_user = global.auth_user.clone().or_else(|| config.auth_user.clone());
    let auth: Box<dyn crate::core::AuthProvider> = match auth_user {
        Some(user) => {
            let email = global
                .auth_email
                .clone()
                .or_else(|| config.auth_email.clone())
                .unwrap_or_default();
            Box::new(StaticAuth::signed_in(user, email))
        }
        None => Box::new(NoAuth),
    };

    Ok(SyncEngine::new(local, remote, auth))
}
