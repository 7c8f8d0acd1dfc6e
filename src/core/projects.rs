//! Project catalog
//!
//! Projects live in their own relational table remotely and under a
//! single cached list key locally. Two default projects ship with every
//! install: they are merged back in on every load and refuse deletion,
//! so the dashboard always has something to show.

use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

use crate::entities::{
    CreateProjectInput, Project, ProjectPhase, ProjectStatus, UpdateProjectInput,
};

use super::keys::{DataKind, PROJECTS_KEY};
use super::sync::SyncEngine;

/// Ids of the built-in projects; these refuse deletion
pub const DEFAULT_PROJECT_IDS: &[&str] = &["credit-bureau-portal", "wealth-management-app"];

const DEFAULT_COLOR: &str = "#6366F1";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("A project with short code '{0}' already exists")]
    DuplicateShortCode(String),

    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Cannot delete default projects")]
    DefaultProjectImmutable,
}

/// The built-in projects present in every deployment
pub fn default_projects() -> Vec<Project> {
    let seeded = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    vec![
        Project {
            id: "credit-bureau-portal".into(),
            name: "Credit Bureau Portal".into(),
            short_code: "CBP".into(),
            description: "Consumer credit bureau reporting and dispute portal".into(),
            tech_stack: vec!["React".into(), "Supabase".into()],
            target_users: vec!["Credit analysts".into(), "Compliance".into()],
            document_version: "1.0".into(),
            status: ProjectStatus::Active,
            phase: ProjectPhase::Testing,
            color: "#3B82F6".into(),
            icon: None,
            created_at: seeded,
            updated_at: seeded,
        },
        Project {
            id: "wealth-management-app".into(),
            name: "Wealth Management App".into(),
            short_code: "WMA".into(),
            description: "Advisory portfolio tracking application".into(),
            tech_stack: vec!["React Native".into()],
            target_users: vec!["Financial advisors".into()],
            document_version: "1.0".into(),
            status: ProjectStatus::Active,
            phase: ProjectPhase::Planning,
            color: "#10B981".into(),
            icon: None,
            created_at: seeded,
            updated_at: seeded,
        },
    ]
}

/// Merge a stored/remote project list over the defaults.
///
/// Defaults always survive; a stored copy of a default (edited metadata)
/// replaces the built-in one, matched by id.
fn merge_with_defaults(stored: Vec<Project>) -> Vec<Project> {
    let mut merged = default_projects();
    for project in stored {
        match merged.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project,
            None => merged.push(project),
        }
    }
    merged
}

impl SyncEngine {
    /// Load the project list: defaults merged with the cached list, then
    /// the remote catalog layered on top when reachable.
    ///
    /// Cached entries absent from the remote are kept: projects created
    /// offline have no server row until migration runs, and dropping them
    /// here would orphan their data.
    pub fn load_projects(&self) -> Vec<Project> {
        let mut merged = merge_with_defaults(self.local().load(PROJECTS_KEY, Vec::new()));
        if let Some(remote) = self.remote() {
            match remote.list_projects() {
                Ok(listed) => {
                    for project in listed {
                        match merged.iter_mut().find(|p| p.id == project.id) {
                            Some(slot) => *slot = project,
                            None => merged.push(project),
                        }
                    }
                    self.local().save(PROJECTS_KEY, &merged);
                }
                Err(e) => {
                    eprintln!("Warning: remote project list unavailable: {}", e);
                }
            }
        }
        merged
    }

    pub fn get_project(&self, id: &str) -> Option<Project> {
        self.load_projects().into_iter().find(|p| p.id == id)
    }

    /// Create a project. The short code must be unique (case-insensitive)
    /// among all known projects; on conflict nothing is persisted.
    ///
    /// The returned project carries the server-issued id when the remote
    /// insert succeeds, the local slug id otherwise.
    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project, ProjectError> {
        let mut projects = self.load_projects();

        let code = input.short_code.to_uppercase();
        if projects
            .iter()
            .any(|p| p.short_code.eq_ignore_ascii_case(&code))
        {
            return Err(ProjectError::DuplicateShortCode(code));
        }

        let now = Utc::now();
        let mut project = Project {
            id: Project::generate_id(&input.name),
            name: input.name,
            short_code: code,
            description: input.description,
            tech_stack: input.tech_stack,
            target_users: input.target_users,
            document_version: input.document_version.unwrap_or_else(|| "1.0".into()),
            status: ProjectStatus::Active,
            phase: ProjectPhase::Planning,
            color: input.color.unwrap_or_else(|| DEFAULT_COLOR.into()),
            icon: input.icon,
            created_at: now,
            updated_at: now,
        };

        if let Some(remote) = self.remote() {
            if let Some(owner) = self.owner() {
                match remote.insert_project(&owner, &project) {
                    Ok(saved) => project = saved,
                    Err(e) => {
                        eprintln!("Warning: remote project create failed: {}", e);
                    }
                }
            }
        }

        projects.push(project.clone());
        self.local().save(PROJECTS_KEY, &projects);
        Ok(project)
    }

    /// Apply a partial update to a project
    pub fn update_project(
        &self,
        id: &str,
        input: UpdateProjectInput,
    ) -> Result<Project, ProjectError> {
        let mut projects = self.load_projects();
        let Some(slot) = projects.iter_mut().find(|p| p.id == id) else {
            return Err(ProjectError::NotFound(id.to_string()));
        };

        if let Some(code) = &input.short_code {
            let taken = self
                .load_projects()
                .iter()
                .any(|p| p.id != id && p.short_code.eq_ignore_ascii_case(code));
            if taken {
                return Err(ProjectError::DuplicateShortCode(code.to_uppercase()));
            }
        }

        let updated = input.apply(slot);
        *slot = updated.clone();
        self.local().save(PROJECTS_KEY, &projects);

        if let Some(remote) = self.remote() {
            if let Err(e) = remote.update_project(id, &updated) {
                eprintln!("Warning: remote project update failed: {}", e);
            }
        }
        Ok(updated)
    }

    /// Delete a project and sweep its child collections.
    ///
    /// The local sweep is unconditional; the remote sweep is best-effort
    /// and logged on failure. Built-in projects refuse deletion.
    pub fn delete_project(&self, id: &str) -> Result<(), ProjectError> {
        if DEFAULT_PROJECT_IDS.contains(&id) {
            return Err(ProjectError::DefaultProjectImmutable);
        }

        let mut projects = self.load_projects();
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Err(ProjectError::NotFound(id.to_string()));
        }
        self.local().save(PROJECTS_KEY, &projects);

        for kind in DataKind::all() {
            self.local().remove(&kind.storage_key(Some(id)));
        }

        if let Some(remote) = self.remote() {
            if let Err(e) = remote.delete_records_for_project(id) {
                eprintln!("Warning: remote record sweep failed for '{}': {}", id, e);
            }
            if let Err(e) = remote.delete_project(id) {
                eprintln!("Warning: remote project delete failed for '{}': {}", id, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::NoAuth;
    use crate::core::local::LocalStore;
    use crate::core::remote::SqliteRemote;
    use uuid::Uuid;

    fn offline_engine() -> SyncEngine {
        SyncEngine::new(LocalStore::in_memory(), None, Box::new(NoAuth))
    }

    fn input(name: &str, code: &str) -> CreateProjectInput {
        CreateProjectInput {
            name: name.into(),
            short_code: code.into(),
            description: String::new(),
            tech_stack: vec![],
            target_users: vec![],
            document_version: None,
            color: None,
            icon: None,
        }
    }

    #[test]
    fn defaults_are_always_present() {
        let engine = offline_engine();
        let projects = engine.load_projects();
        assert_eq!(projects.len(), 2);
        assert!(projects.iter().any(|p| p.short_code == "CBP"));
        assert!(projects.iter().any(|p| p.short_code == "WMA"));
    }

    #[test]
    fn create_persists_and_duplicate_code_is_rejected() {
        let engine = offline_engine();
        let created = engine.create_project(input("Loan Origination", "lop")).unwrap();
        assert_eq!(created.short_code, "LOP");
        assert!(created.id.starts_with("loan-origination-"));

        let err = engine.create_project(input("Other", "LoP")).unwrap_err();
        assert!(matches!(err, ProjectError::DuplicateShortCode(_)));
        // The failed create must not have persisted anything
        assert_eq!(engine.load_projects().len(), 3);
    }

    #[test]
    fn duplicate_check_covers_default_projects() {
        let engine = offline_engine();
        let err = engine.create_project(input("Clone", "cbp")).unwrap_err();
        assert!(matches!(err, ProjectError::DuplicateShortCode(_)));
    }

    #[test]
    fn remote_create_captures_server_id() {
        let engine = SyncEngine::new(
            LocalStore::in_memory(),
            Some(Box::new(SqliteRemote::in_memory().unwrap())),
            Box::new(NoAuth),
        );
        let created = engine.create_project(input("Loan Origination", "LOP")).unwrap();
        assert!(Uuid::parse_str(&created.id).is_ok());
        assert!(engine.get_project(&created.id).is_some());
    }

    #[test]
    fn update_merges_partial_fields() {
        let engine = offline_engine();
        let created = engine.create_project(input("Loan Origination", "LOP")).unwrap();

        let updated = engine
            .update_project(
                &created.id,
                UpdateProjectInput {
                    phase: Some(ProjectPhase::Uat),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.phase, ProjectPhase::Uat);
        assert_eq!(updated.name, "Loan Origination");
        assert_eq!(
            engine.get_project(&created.id).unwrap().phase,
            ProjectPhase::Uat
        );
    }

    #[test]
    fn update_missing_project_errors() {
        let engine = offline_engine();
        let err = engine
            .update_project("nope", UpdateProjectInput::default())
            .unwrap_err();
        assert!(matches!(err, ProjectError::NotFound(_)));
    }

    #[test]
    fn default_projects_refuse_deletion() {
        let engine = offline_engine();
        let err = engine.delete_project("credit-bureau-portal").unwrap_err();
        assert!(matches!(err, ProjectError::DefaultProjectImmutable));
        assert_eq!(engine.load_projects().len(), 2);
    }

    #[test]
    fn delete_sweeps_child_collections() {
        let engine = offline_engine();
        let created = engine.create_project(input("Loan Origination", "LOP")).unwrap();

        let key = DataKind::Defects.storage_key(Some(&created.id));
        engine.local().save(&key, &serde_json::json!([{"id": "d1"}]));
        assert!(engine.local().contains(&key));

        engine.delete_project(&created.id).unwrap();
        assert!(engine.get_project(&created.id).is_none());
        assert!(!engine.local().contains(&key));
    }
}
