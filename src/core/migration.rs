//! Project identity migration
//!
//! Projects created offline carry a locally generated slug id. Once the
//! remote catalog is reachable those projects get a server-issued UUID,
//! and every child collection keyed under the old id must be re-keyed
//! and have its `projectId` references rewritten, or the data becomes
//! orphaned under a key nothing reads anymore.
//!
//! The pass is guarded against re-entry: sync callbacks can fire while a
//! migration is mid-flight, and a second overlapping pass would re-key
//! half-moved collections.

use std::sync::atomic::Ordering;

use uuid::Uuid;

use super::keys::{DataKind, PROJECTS_KEY};
use super::projects::DEFAULT_PROJECT_IDS;
use super::sync::SyncEngine;
use crate::entities::Project;

/// One migrated project id pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedProject {
    pub old_id: String,
    pub new_id: String,
}

/// Result of a migration pass
#[derive(Debug, Clone, Default)]
pub struct MigrationOutcome {
    pub migrated: Vec<MigratedProject>,
    /// True when another pass held the guard and this one did nothing
    pub skipped: bool,
}

impl SyncEngine {
    /// Re-key locally created projects onto their server identities.
    ///
    /// Matching prefers the short code (case-insensitive), then the name:
    /// short codes are the user-facing unique handle, names collide more
    /// easily. Unmatched projects are inserted remotely and adopt the id
    /// the server issues. A failure on one project skips it and leaves
    /// the rest of the pass intact.
    pub fn migrate_projects(&self) -> MigrationOutcome {
        if self
            .migration_guard
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return MigrationOutcome {
                skipped: true,
                ..Default::default()
            };
        }
        let outcome = self.run_migration();
        self.migration_guard.store(false, Ordering::SeqCst);
        outcome
    }

    fn run_migration(&self) -> MigrationOutcome {
        let Some(remote) = self.remote() else {
            return MigrationOutcome::default();
        };
        let Some(owner) = self.owner() else {
            return MigrationOutcome::default();
        };
        let remote_projects = match remote.list_projects() {
            Ok(projects) => projects,
            Err(e) => {
                eprintln!("Warning: migration aborted, project catalog unavailable: {}", e);
                return MigrationOutcome::default();
            }
        };

        let mut local_list: Vec<Project> = self.local().load(PROJECTS_KEY, Vec::new());
        let mut migrated = Vec::new();

        for project in local_list.iter_mut() {
            if !needs_migration(project) {
                continue;
            }

            let new_id = match find_server_match(&remote_projects, project) {
                Some(matched) => matched.id.clone(),
                None => match remote.insert_project(&owner, project) {
                    Ok(saved) => saved.id,
                    Err(e) => {
                        eprintln!(
                            "Warning: could not migrate project '{}': {}",
                            project.id, e
                        );
                        continue;
                    }
                },
            };

            self.rekey_children(&project.id, &new_id);
            migrated.push(MigratedProject {
                old_id: project.id.clone(),
                new_id: new_id.clone(),
            });
            project.id = new_id;
        }

        if !migrated.is_empty() {
            self.local().save(PROJECTS_KEY, &local_list);
        }
        MigrationOutcome {
            migrated,
            skipped: false,
        }
    }

    /// Move every child collection from the old composite keys to the new
    /// ones, rewriting the `projectId` reference inside each element.
    fn rekey_children(&self, old_id: &str, new_id: &str) {
        for kind in DataKind::all() {
            let old_key = kind.storage_key(Some(old_id));
            let Some(mut value) = self.local().load_value(&old_key) else {
                continue;
            };
            if let Some(items) = value.as_array_mut() {
                for item in items.iter_mut() {
                    if let Some(obj) = item.as_object_mut() {
                        obj.insert(
                            "projectId".to_string(),
                            serde_json::Value::String(new_id.to_string()),
                        );
                    }
                }
            }
            self.local().save(&kind.storage_key(Some(new_id)), &value);
            self.local().remove(&old_key);
        }
    }
}

fn needs_migration(project: &Project) -> bool {
    !DEFAULT_PROJECT_IDS.contains(&project.id.as_str())
        && Uuid::parse_str(&project.id).is_err()
}

fn find_server_match<'a>(remote: &'a [Project], local: &Project) -> Option<&'a Project> {
    remote
        .iter()
        .find(|p| p.short_code.eq_ignore_ascii_case(&local.short_code))
        .or_else(|| {
            remote
                .iter()
                .find(|p| p.name.eq_ignore_ascii_case(&local.name))
        })
}
