//! Core module - persistence tiers, identity, and the sync engine

pub mod auth;
pub mod config;
pub mod keys;
pub mod local;
pub mod migration;
pub mod owner;
pub mod projects;
pub mod remote;
pub mod stats;
pub mod status;
pub mod sync;

pub use auth::{AuthError, AuthProvider, NoAuth, Principal, StaticAuth};
pub use config::Config;
pub use keys::{DataKind, LAST_UPDATED_KEY, PROJECTS_KEY, SESSION_TOKEN_KEY};
pub use local::LocalStore;
pub use migration::{MigratedProject, MigrationOutcome};
pub use owner::resolve_owner;
pub use projects::{default_projects, ProjectError, DEFAULT_PROJECT_IDS};
pub use remote::{RemoteError, RemoteStore, SqliteRemote, SyncRecord, SyncRecordInput, UserRow};
pub use status::{SyncState, SyncStatusCell};
pub use sync::{ExportBundle, SyncEngine};
