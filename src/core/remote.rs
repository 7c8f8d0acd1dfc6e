//! Remote store client
//!
//! A thin seam over the authoritative relational backend. The schema is
//! small and fixed: `users` (owner identities), `projects` (relational
//! project rows), and `test_data` (one JSON blob per owner/data-kind
//! pair). Everything speaks `Result<_, RemoteError>`; callers treat any
//! error as "remote unavailable" and fall back to the local tier.
//!
//! The remote is optional infrastructure. When no backend is configured
//! the engine runs purely against the local cache (offline/demo mode),
//! so nothing in this module is on the critical path.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{Project, ProjectPhase, ProjectStatus};

/// Errors from the remote backend
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote backend error: {0}")]
    Backend(String),

    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<rusqlite::Error> for RemoteError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(ref inner, _)
                if inner.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                RemoteError::Constraint(e.to_string())
            }
            _ => RemoteError::Backend(e.to_string()),
        }
    }
}

/// A row in the `users` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: String,
    pub session_id: String,
    pub last_active: DateTime<Utc>,
}

/// A row in the `test_data` table: one serialized collection per
/// (owner, data-kind[, project]) combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRecord {
    pub id: String,
    pub user_id: String,
    /// Composite storage key acting as the discriminator
    pub data_type: String,
    pub data: serde_json::Value,
    pub project_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting or updating a sync record
#[derive(Debug, Clone)]
pub struct SyncRecordInput {
    pub user_id: String,
    pub data_type: String,
    pub data: serde_json::Value,
    pub project_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Operations against the remote relational backend.
///
/// Implementations must be safe to call repeatedly; the engine retries
/// opportunistically and never assumes a previous call succeeded.
pub trait RemoteStore {
    // --- users ---

    fn find_user(&self, id: &str) -> Result<Option<UserRow>, RemoteError>;
    fn find_user_by_session(&self, session_id: &str) -> Result<Option<UserRow>, RemoteError>;
    /// Insert a user keyed by session token; the backend issues the row id
    fn insert_user(&self, session_id: &str) -> Result<UserRow, RemoteError>;
    /// Insert-or-replace a user with a caller-supplied id (auth principals
    /// keep their provider-issued id)
    fn upsert_user(&self, id: &str, session_id: &str) -> Result<(), RemoteError>;
    fn touch_user(&self, id: &str) -> Result<(), RemoteError>;
    fn delete_user(&self, id: &str) -> Result<(), RemoteError>;

    // --- test_data ---

    fn find_record(
        &self,
        user_id: &str,
        data_type: &str,
    ) -> Result<Option<SyncRecord>, RemoteError>;
    /// The single most-recently-updated record for `data_type` across all
    /// owners; this is the freshness query behind cross-device loads
    fn latest_record(&self, data_type: &str) -> Result<Option<SyncRecord>, RemoteError>;
    fn insert_record(&self, input: &SyncRecordInput) -> Result<(), RemoteError>;
    fn update_record(&self, id: &str, input: &SyncRecordInput) -> Result<(), RemoteError>;
    fn list_records(&self, user_id: &str) -> Result<Vec<SyncRecord>, RemoteError>;
    /// Re-point every record from one owner to another (promotion path)
    fn repoint_records(&self, from_user: &str, to_user: &str) -> Result<(), RemoteError>;
    /// Delete every record scoped to `project_id`, matching both the
    /// relational reference and the composite-key prefix
    fn delete_records_for_project(&self, project_id: &str) -> Result<(), RemoteError>;

    // --- projects ---

    fn list_projects(&self) -> Result<Vec<Project>, RemoteError>;
    /// Insert a project; the backend issues the row id, returned in the copy
    fn insert_project(&self, user_id: &str, project: &Project) -> Result<Project, RemoteError>;
    fn update_project(&self, id: &str, project: &Project) -> Result<(), RemoteError>;
    fn delete_project(&self, id: &str) -> Result<(), RemoteError>;
}

/// SQLite-backed remote store.
///
/// Serves self-hosted single-node deployments and the test suites; the
/// hosted deployment implements [`RemoteStore`] over its own backend.
pub struct SqliteRemote {
    conn: Connection,
}

impl SqliteRemote {
    /// Open or create the backing database file
    pub fn open(path: &Path) -> Result<Self, RemoteError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let remote = Self { conn };
        remote.init_schema()?;
        Ok(remote)
    }

    /// An in-memory instance for tests
    pub fn in_memory() -> Result<Self, RemoteError> {
        let conn = Connection::open_in_memory()?;
        let remote = Self { conn };
        remote.init_schema()?;
        Ok(remote)
    }

    fn init_schema(&self) -> Result<(), RemoteError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
              id          TEXT PRIMARY KEY,
              session_id  TEXT NOT NULL UNIQUE,
              last_active TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS projects (
              id               TEXT PRIMARY KEY,
              user_id          TEXT NOT NULL,
              name             TEXT NOT NULL,
              short_code       TEXT NOT NULL,
              description      TEXT NOT NULL DEFAULT '',
              tech_stack       TEXT NOT NULL DEFAULT '[]',
              target_users     TEXT NOT NULL DEFAULT '[]',
              document_version TEXT NOT NULL DEFAULT '1.0',
              status           TEXT NOT NULL DEFAULT 'active',
              phase            TEXT NOT NULL DEFAULT 'planning',
              color            TEXT NOT NULL DEFAULT '#6366F1',
              icon             TEXT,
              created_at       TEXT NOT NULL,
              updated_at       TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS test_data (
              id         TEXT PRIMARY KEY,
              user_id    TEXT NOT NULL,
              data_type  TEXT NOT NULL,
              data       TEXT NOT NULL,
              project_id TEXT,
              updated_at TEXT NOT NULL,
              UNIQUE (user_id, data_type)
            );
            CREATE INDEX IF NOT EXISTS idx_test_data_type
              ON test_data (data_type, updated_at);
            "#,
        )?;
        Ok(())
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
        Ok(UserRow {
            id: row.get(0)?,
            session_id: row.get(1)?,
            last_active: parse_timestamp(row.get::<_, String>(2)?),
        })
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SyncRecord> {
        let data: String = row.get(3)?;
        Ok(SyncRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            data_type: row.get(2)?,
            data: serde_json::from_str(&data).unwrap_or(serde_json::Value::Null),
            project_id: row.get(4)?,
            updated_at: parse_timestamp(row.get::<_, String>(5)?),
        })
    }

    fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
        let tech_stack: String = row.get(4)?;
        let target_users: String = row.get(5)?;
        let status: String = row.get(7)?;
        let phase: String = row.get(8)?;
        Ok(Project {
            id: row.get(0)?,
            name: row.get(2)?,
            short_code: row.get(3)?,
            description: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
            tech_stack: serde_json::from_str(&tech_stack).unwrap_or_default(),
            target_users: serde_json::from_str(&target_users).unwrap_or_default(),
            document_version: row.get(6)?,
            status: status.parse().unwrap_or(ProjectStatus::Active),
            phase: phase.parse().unwrap_or(ProjectPhase::Planning),
            color: row.get(9)?,
            icon: row.get(10)?,
            created_at: parse_timestamp(row.get::<_, String>(12)?),
            updated_at: parse_timestamp(row.get::<_, String>(13)?),
        })
    }
}

const PROJECT_COLUMNS: &str = "id, user_id, name, short_code, tech_stack, target_users, \
                               document_version, status, phase, color, icon, description, \
                               created_at, updated_at";

impl RemoteStore for SqliteRemote {
    fn find_user(&self, id: &str) -> Result<Option<UserRow>, RemoteError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, session_id, last_active FROM users WHERE id = ?1",
                params![id],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn find_user_by_session(&self, session_id: &str) -> Result<Option<UserRow>, RemoteError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, session_id, last_active FROM users WHERE session_id = ?1",
                params![session_id],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn insert_user(&self, session_id: &str) -> Result<UserRow, RemoteError> {
        let user = UserRow {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            last_active: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO users (id, session_id, last_active) VALUES (?1, ?2, ?3)",
            params![user.id, user.session_id, user.last_active.to_rfc3339()],
        )?;
        Ok(user)
    }

    fn upsert_user(&self, id: &str, session_id: &str) -> Result<(), RemoteError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO users (id, session_id, last_active) VALUES (?1, ?2, ?3)",
            params![id, session_id, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn touch_user(&self, id: &str) -> Result<(), RemoteError> {
        self.conn.execute(
            "UPDATE users SET last_active = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<(), RemoteError> {
        self.conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn find_record(
        &self,
        user_id: &str,
        data_type: &str,
    ) -> Result<Option<SyncRecord>, RemoteError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, user_id, data_type, data, project_id, updated_at
                 FROM test_data WHERE user_id = ?1 AND data_type = ?2",
                params![user_id, data_type],
                Self::row_to_record,
            )
            .optional()?)
    }

    fn latest_record(&self, data_type: &str) -> Result<Option<SyncRecord>, RemoteError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, user_id, data_type, data, project_id, updated_at
                 FROM test_data WHERE data_type = ?1
                 ORDER BY updated_at DESC LIMIT 1",
                params![data_type],
                Self::row_to_record,
            )
            .optional()?)
    }

    fn insert_record(&self, input: &SyncRecordInput) -> Result<(), RemoteError> {
        self.conn.execute(
            "INSERT INTO test_data (id, user_id, data_type, data, project_id, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                input.user_id,
                input.data_type,
                input.data.to_string(),
                input.project_id,
                input.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn update_record(&self, id: &str, input: &SyncRecordInput) -> Result<(), RemoteError> {
        self.conn.execute(
            "UPDATE test_data
             SET user_id = ?1, data_type = ?2, data = ?3, project_id = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                input.user_id,
                input.data_type,
                input.data.to_string(),
                input.project_id,
                input.updated_at.to_rfc3339(),
                id,
            ],
        )?;
        Ok(())
    }

    fn list_records(&self, user_id: &str) -> Result<Vec<SyncRecord>, RemoteError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, data_type, data, project_id, updated_at
             FROM test_data WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map(params![user_id], Self::row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn repoint_records(&self, from_user: &str, to_user: &str) -> Result<(), RemoteError> {
        self.conn.execute(
            "UPDATE test_data SET user_id = ?1 WHERE user_id = ?2",
            params![to_user, from_user],
        )?;
        Ok(())
    }

    fn delete_records_for_project(&self, project_id: &str) -> Result<(), RemoteError> {
        self.conn.execute(
            "DELETE FROM test_data WHERE project_id = ?1 OR data_type LIKE ?2 ESCAPE '\\'",
            params![project_id, format!("{}\\_%", project_id)],
        )?;
        Ok(())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RemoteError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM projects", PROJECT_COLUMNS))?;
        let rows = stmt.query_map([], Self::row_to_project)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn insert_project(&self, user_id: &str, project: &Project) -> Result<Project, RemoteError> {
        let mut saved = project.clone();
        saved.id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO projects (id, user_id, name, short_code, description, tech_stack,
                                   target_users, document_version, status, phase, color, icon,
                                   created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                saved.id,
                user_id,
                saved.name,
                saved.short_code,
                saved.description,
                serde_json::to_string(&saved.tech_stack).unwrap_or_else(|_| "[]".into()),
                serde_json::to_string(&saved.target_users).unwrap_or_else(|_| "[]".into()),
                saved.document_version,
                saved.status.to_string(),
                saved.phase.to_string(),
                saved.color,
                saved.icon,
                saved.created_at.to_rfc3339(),
                saved.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(saved)
    }

    fn update_project(&self, id: &str, project: &Project) -> Result<(), RemoteError> {
        self.conn.execute(
            "UPDATE projects
             SET name = ?1, short_code = ?2, description = ?3, tech_stack = ?4,
                 target_users = ?5, document_version = ?6, status = ?7, phase = ?8,
                 color = ?9, icon = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                project.name,
                project.short_code,
                project.description,
                serde_json::to_string(&project.tech_stack).unwrap_or_else(|_| "[]".into()),
                serde_json::to_string(&project.target_users).unwrap_or_else(|_| "[]".into()),
                project.document_version,
                project.status.to_string(),
                project.phase.to_string(),
                project.color,
                project.icon,
                project.updated_at.to_rfc3339(),
                id,
            ],
        )?;
        Ok(())
    }

    fn delete_project(&self, id: &str) -> Result<(), RemoteError> {
        self.conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(())
    }
}

/// Parse a stored RFC3339 timestamp, defaulting to the epoch on corruption
fn parse_timestamp(s: String) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| chrono::DateTime::<Utc>::UNIX_EPOCH)
}
