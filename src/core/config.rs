//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

/// qatrack configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the local cache database
    pub data_dir: Option<PathBuf>,

    /// Path to the remote store database; unset means offline mode
    pub remote_db: Option<PathBuf>,

    /// Authenticated principal id to resolve ownership under
    pub auth_user: Option<String>,

    /// Email reported for the authenticated principal
    pub auth_email: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/qatrack/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(dir) = std::env::var("QATRACK_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Ok(db) = std::env::var("QATRACK_REMOTE_DB") {
            config.remote_db = Some(PathBuf::from(db));
        }
        if let Ok(user) = std::env::var("QATRACK_AUTH_USER") {
            config.auth_user = Some(user);
        }
        if let Ok(email) = std::env::var("QATRACK_AUTH_EMAIL") {
            config.auth_email = Some(email);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "qatrack")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.remote_db.is_some() {
            self.remote_db = other.remote_db;
        }
        if other.auth_user.is_some() {
            self.auth_user = other.auth_user;
        }
        if other.auth_email.is_some() {
            self.auth_email = other.auth_email;
        }
    }

    /// The directory holding the local cache, created on first use
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "qatrack")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".qatrack"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_the_overlay() {
        let mut base = Config {
            data_dir: Some(PathBuf::from("/a")),
            remote_db: None,
            auth_user: Some("u1".into()),
            auth_email: None,
        };
        base.merge(Config {
            data_dir: None,
            remote_db: Some(PathBuf::from("/r.db")),
            auth_user: Some("u2".into()),
            auth_email: None,
        });
        assert_eq!(base.data_dir, Some(PathBuf::from("/a")));
        assert_eq!(base.remote_db, Some(PathBuf::from("/r.db")));
        assert_eq!(base.auth_user, Some("u2".into()));
    }

    #[test]
    fn yaml_config_parses() {
        let config: Config =
            serde_yml::from_str("data_dir: /tmp/qa\nremote_db: /tmp/remote.db\n").unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/qa")));
        assert_eq!(config.remote_db, Some(PathBuf::from("/tmp/remote.db")));
    }
}
