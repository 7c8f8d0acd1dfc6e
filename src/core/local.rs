//! Local cache store
//!
//! A synchronous key-value tier backed by a SQLite file, scoped to the
//! current client. This is the guaranteed-available fallback: every
//! higher-level operation must be able to complete (possibly degraded)
//! against this store alone, with no network.
//!
//! Failures here are never surfaced as errors. `save` degrades to a no-op,
//! `load` to the caller's default; both log a warning. If the backing file
//! cannot be opened at all, the store falls back to an in-memory database
//! so the process keeps working for its lifetime.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use super::keys::LAST_UPDATED_KEY;

/// Cache file name within the data directory
const LOCAL_DB_FILE: &str = "local_cache.db";

pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open or create the local cache under `data_dir`.
    ///
    /// Never fails: when the file store is unavailable (permissions, full
    /// disk) an in-memory database takes its place for this process.
    pub fn open(data_dir: &Path) -> Self {
        match Self::open_file(data_dir) {
            Ok(conn) => Self { conn },
            Err(e) => {
                eprintln!(
                    "Warning: local cache unavailable ({}), using in-memory store",
                    e
                );
                Self::in_memory()
            }
        }
    }

    /// An in-memory store; used as the open fallback and in tests
    pub fn in_memory() -> Self {
        // In-memory open only fails on allocation failure, which already aborts
        let conn = Connection::open_in_memory().expect("in-memory sqlite");
        let store = Self { conn };
        store.init_schema();
        store
    }

    fn open_file(data_dir: &Path) -> Result<Connection, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(data_dir)?;
        let conn = Connection::open(data_dir.join(LOCAL_DB_FILE))?;
        // WAL mode for concurrent readers (a dashboard process may read
        // while the CLI writes)
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
               key   TEXT PRIMARY KEY,
               value TEXT NOT NULL
             );",
        )?;
        Ok(conn)
    }

    fn init_schema(&self) {
        if let Err(e) = self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
               key   TEXT PRIMARY KEY,
               value TEXT NOT NULL
             );",
        ) {
            eprintln!("Warning: failed to initialize local cache schema: {}", e);
        }
    }

    /// Persist a JSON-serializable value under `key` and stamp the
    /// last-updated marker. A no-op on any failure.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Warning: failed to serialize value for '{}': {}", key, e);
                return;
            }
        };
        self.put_raw(key, &json);
        self.put_raw(
            LAST_UPDATED_KEY,
            &format!("\"{}\"", Utc::now().to_rfc3339()),
        );
    }

    /// Load and deserialize the value under `key`, or `default` when the
    /// key is absent, unreadable, or holds corrupt JSON.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get_raw(key) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    eprintln!("Warning: corrupt cached value for '{}': {}", key, e);
                    default
                }
            },
            None => default,
        }
    }

    /// Load the raw JSON value under `key`, if present and parseable
    pub fn load_value(&self, key: &str) -> Option<serde_json::Value> {
        let json = self.get_raw(key)?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                eprintln!("Warning: corrupt cached value for '{}': {}", key, e);
                None
            }
        }
    }

    /// Check whether `key` holds a value
    pub fn contains(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }

    /// Remove the value under `key`, if any
    pub fn remove(&self, key: &str) {
        if let Err(e) = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])
        {
            eprintln!("Warning: failed to remove '{}' from local cache: {}", key, e);
        }
    }

    /// Timestamp of the most recent local save, if any
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        let json = self.get_raw(LAST_UPDATED_KEY)?;
        let s: String = serde_json::from_str(&json).ok()?;
        chrono::DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn put_raw(&self, key: &str, json: &str) {
        if let Err(e) = self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, json],
        ) {
            eprintln!("Warning: failed to save '{}' to local cache: {}", key, e);
        }
    }

    fn get_raw(&self, key: &str) -> Option<String> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .unwrap_or_else(|e| {
                eprintln!("Warning: failed to read '{}' from local cache: {}", key, e);
                None
            })
    }
}
