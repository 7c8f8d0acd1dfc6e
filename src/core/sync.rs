//! Cache-aside sync engine
//!
//! Every write lands in the local cache first and unconditionally; the
//! remote write happens after, and its failure only degrades the sync
//! status. Reads prefer the remote (freshest copy wins) and shadow what
//! they fetch into the local cache, so the next offline read still sees
//! it. With no remote configured the engine is a thin veneer over the
//! local store.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    Defect, ProjectTab, SignOff, SuccessMetric, TestCase, TestEnvironment, TestObjective,
    TestingModule, TestingModuleTemplate,
};

use super::auth::AuthProvider;
use super::keys::DataKind;
use super::local::LocalStore;
use super::owner::resolve_owner;
use super::remote::{RemoteStore, SyncRecordInput};
use super::status::SyncStatusCell;

pub struct SyncEngine {
    local: LocalStore,
    remote: Option<Box<dyn RemoteStore>>,
    auth: Box<dyn AuthProvider>,
    status: SyncStatusCell,
    /// Held while a project identity migration is running
    pub(crate) migration_guard: std::sync::atomic::AtomicBool,
}

/// Generate per-collection typed accessors over the generic save/load
macro_rules! collection_accessors {
    ($($save:ident / $load:ident => $kind:expr, $ty:ty;)*) => {
        $(
            pub fn $save(&self, items: &[$ty], project_id: Option<&str>) {
                self.save($kind, &items, project_id);
            }

            pub fn $load(&self, project_id: Option<&str>) -> Vec<$ty> {
                self.load($kind, Vec::new(), project_id)
            }
        )*
    };
}

impl SyncEngine {
    pub fn new(
        local: LocalStore,
        remote: Option<Box<dyn RemoteStore>>,
        auth: Box<dyn AuthProvider>,
    ) -> Self {
        let status = SyncStatusCell::new();
        if remote.is_none() {
            status.set_offline();
        }
        Self {
            local,
            remote,
            auth,
            status,
            migration_guard: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn status(&self) -> SyncStatusCell {
        self.status.clone()
    }

    pub(crate) fn remote(&self) -> Option<&dyn RemoteStore> {
        self.remote.as_deref()
    }

    /// Resolve the current owner id against the remote, if any
    pub(crate) fn owner(&self) -> Option<String> {
        resolve_owner(self.remote(), self.auth.as_ref(), &self.local)
    }

    /// Persist a collection: local cache first (always succeeds, possibly
    /// degraded), then the remote copy for the resolved owner.
    pub fn save<T: Serialize>(&self, kind: DataKind, value: &T, project_id: Option<&str>) {
        let key = kind.storage_key(project_id);
        self.local.save(&key, value);

        let Some(remote) = self.remote.as_deref() else {
            self.status.set_offline();
            return;
        };
        self.status.set_syncing();

        let Some(owner) = self.owner() else {
            self.status.set_error("Authentication failed");
            return;
        };

        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                self.status.set_error(e.to_string());
                return;
            }
        };
        let input = SyncRecordInput {
            user_id: owner.clone(),
            data_type: key.clone(),
            data,
            // The relational reference only holds server-issued ids; local
            // slug ids stay encoded in the composite key alone
            project_id: project_id.filter(|p| is_server_id(p)).map(str::to_string),
            updated_at: Utc::now(),
        };

        let result = match remote.find_record(&owner, &key) {
            Ok(Some(existing)) => remote.update_record(&existing.id, &input),
            Ok(None) => remote.insert_record(&input),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => self.status.set_synced(),
            Err(e) => {
                eprintln!("Warning: remote save failed for '{}': {}", key, e);
                self.status.set_error(e.to_string());
            }
        }
    }

    /// Load a collection, preferring the freshest remote copy.
    ///
    /// With a project scope the freshest record across *all* owners wins
    /// (a teammate's newer save beats this client's stale one); unscoped
    /// loads stay within the resolved owner's partition. Whatever is
    /// fetched is shadowed locally before being returned. Every failure
    /// path falls back to the local cache.
    pub fn load<T: DeserializeOwned>(
        &self,
        kind: DataKind,
        default: T,
        project_id: Option<&str>,
    ) -> T {
        let key = kind.storage_key(project_id);

        let Some(remote) = self.remote.as_deref() else {
            self.status.set_offline();
            return self.local.load(&key, default);
        };
        self.status.set_syncing();

        if project_id.is_some() {
            return match remote.latest_record(&key) {
                Ok(Some(record)) => {
                    self.local.save(&key, &record.data);
                    self.status.set_synced();
                    match serde_json::from_value(record.data) {
                        Ok(value) => value,
                        Err(e) => {
                            eprintln!("Warning: malformed remote payload for '{}': {}", key, e);
                            default
                        }
                    }
                }
                Ok(None) => {
                    self.status.set_synced();
                    self.local.load(&key, default)
                }
                Err(e) => {
                    eprintln!("Warning: remote load failed for '{}': {}", key, e);
                    self.status.set_error(e.to_string());
                    self.local.load(&key, default)
                }
            };
        }

        let Some(owner) = self.owner() else {
            self.status.set_error("Authentication failed");
            return self.local.load(&key, default);
        };
        match remote.find_record(&owner, &key) {
            Ok(Some(record)) => {
                self.local.save(&key, &record.data);
                self.status.set_synced();
                match serde_json::from_value(record.data) {
                    Ok(value) => value,
                    Err(e) => {
                        eprintln!("Warning: malformed remote payload for '{}': {}", key, e);
                        default
                    }
                }
            }
            Ok(None) => {
                self.status.set_synced();
                self.local.load(&key, default)
            }
            Err(e) => {
                eprintln!("Warning: remote load failed for '{}': {}", key, e);
                self.status.set_error(e.to_string());
                self.local.load(&key, default)
            }
        }
    }

    /// Pull every remote record for the current owner into the local
    /// cache. Returns the number of records refreshed.
    pub fn sync_all(&self) -> usize {
        let Some(remote) = self.remote.as_deref() else {
            self.status.set_offline();
            return 0;
        };
        self.status.set_syncing();

        let Some(owner) = self.owner() else {
            self.status.set_error("Authentication failed");
            return 0;
        };
        match remote.list_records(&owner) {
            Ok(records) => {
                let count = records.len();
                for record in records {
                    self.local.save(&record.data_type, &record.data);
                }
                self.status.set_synced();
                count
            }
            Err(e) => {
                eprintln!("Warning: full sync failed: {}", e);
                self.status.set_error(e.to_string());
                0
            }
        }
    }

    collection_accessors! {
        save_test_cases / load_test_cases => DataKind::TestCases, TestCase;
        save_defects / load_defects => DataKind::Defects, Defect;
        save_metrics / load_metrics => DataKind::Metrics, SuccessMetric;
        save_objectives / load_objectives => DataKind::Objectives, TestObjective;
        save_quality_gates / load_quality_gates => DataKind::QualityGates, TestObjective;
        save_environments / load_environments => DataKind::Environments, TestEnvironment;
        save_sign_offs / load_sign_offs => DataKind::SignOffs, SignOff;
        save_project_tabs / load_project_tabs => DataKind::ProjectTabs, ProjectTab;
        save_functional_modules / load_functional_modules
            => DataKind::FunctionalModules, TestingModule;
        save_functional_module_templates / load_functional_module_templates
            => DataKind::FunctionalModuleTemplates, TestingModuleTemplate;
        save_non_functional_modules / load_non_functional_modules
            => DataKind::NonFunctionalModules, TestingModule;
        save_non_functional_module_templates / load_non_functional_module_templates
            => DataKind::NonFunctionalModuleTemplates, TestingModuleTemplate;
    }

    /// Bundle every collection for a project into one exportable document
    pub fn export_all(&self, project_id: Option<&str>) -> ExportBundle {
        ExportBundle {
            export_date: Utc::now(),
            version: EXPORT_VERSION.to_string(),
            test_cases: Some(self.load_test_cases(project_id)),
            defects: Some(self.load_defects(project_id)),
            metrics: Some(self.load_metrics(project_id)),
            objectives: Some(self.load_objectives(project_id)),
            quality_gates: Some(self.load_quality_gates(project_id)),
            environments: Some(self.load_environments(project_id)),
            sign_offs: Some(self.load_sign_offs(project_id)),
            project_tabs: Some(self.load_project_tabs(project_id)),
            functional_modules: Some(self.load_functional_modules(project_id)),
            functional_module_templates: Some(self.load_functional_module_templates(project_id)),
            non_functional_modules: Some(self.load_non_functional_modules(project_id)),
            non_functional_module_templates: Some(
                self.load_non_functional_module_templates(project_id),
            ),
        }
    }

    /// Import a bundle: each collection present in the document is saved
    /// wholesale; absent collections are left untouched.
    pub fn import_all(&self, bundle: &ExportBundle, project_id: Option<&str>) {
        if let Some(items) = &bundle.test_cases {
            self.save_test_cases(items, project_id);
        }
        if let Some(items) = &bundle.defects {
            self.save_defects(items, project_id);
        }
        if let Some(items) = &bundle.metrics {
            self.save_metrics(items, project_id);
        }
        if let Some(items) = &bundle.objectives {
            self.save_objectives(items, project_id);
        }
        if let Some(items) = &bundle.quality_gates {
            self.save_quality_gates(items, project_id);
        }
        if let Some(items) = &bundle.environments {
            self.save_environments(items, project_id);
        }
        if let Some(items) = &bundle.sign_offs {
            self.save_sign_offs(items, project_id);
        }
        if let Some(items) = &bundle.project_tabs {
            self.save_project_tabs(items, project_id);
        }
        if let Some(items) = &bundle.functional_modules {
            self.save_functional_modules(items, project_id);
        }
        if let Some(items) = &bundle.functional_module_templates {
            self.save_functional_module_templates(items, project_id);
        }
        if let Some(items) = &bundle.non_functional_modules {
            self.save_non_functional_modules(items, project_id);
        }
        if let Some(items) = &bundle.non_functional_module_templates {
            self.save_non_functional_module_templates(items, project_id);
        }
    }
}

const EXPORT_VERSION: &str = "1.0";

/// Whether `id` is a server-issued id rather than a local slug id
fn is_server_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Portable dump of every collection for one project
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub export_date: DateTime<Utc>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defects: Option<Vec<Defect>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<SuccessMetric>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Vec<TestObjective>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_gates: Option<Vec<TestObjective>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<TestEnvironment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sign_offs: Option<Vec<SignOff>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_tabs: Option<Vec<ProjectTab>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functional_modules: Option<Vec<TestingModule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functional_module_templates: Option<Vec<TestingModuleTemplate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_functional_modules: Option<Vec<TestingModule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub non_functional_module_templates: Option<Vec<TestingModuleTemplate>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{AuthError, NoAuth, Principal, StaticAuth};
    use crate::core::remote::SqliteRemote;
    use crate::core::status::SyncState;
    use crate::entities::TestStatus;

    fn engine_with_remote() -> SyncEngine {
        SyncEngine::new(
            LocalStore::in_memory(),
            Some(Box::new(SqliteRemote::in_memory().unwrap())),
            Box::new(NoAuth),
        )
    }

    fn sample_case(id: &str) -> TestCase {
        TestCase {
            id: id.to_string(),
            project_id: None,
            test_case_id: format!("TC-{}", id),
            module: "Login".into(),
            scenario: "Valid credentials".into(),
            steps: None,
            expected_result: "Signed in".into(),
            actual_result: String::new(),
            status: TestStatus::Pending,
            comments: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn save_lands_locally_and_remotely() {
        let engine = engine_with_remote();
        engine.save_test_cases(&[sample_case("1")], None);

        assert_eq!(engine.status().get(), SyncState::Synced);
        let local: Vec<TestCase> = engine.local().load(DataKind::TestCases.as_str(), vec![]);
        assert_eq!(local.len(), 1);

        let owner = engine.owner().unwrap();
        let record = engine
            .remote()
            .unwrap()
            .find_record(&owner, DataKind::TestCases.as_str())
            .unwrap();
        assert!(record.is_some());
    }

    #[test]
    fn second_save_updates_instead_of_duplicating() {
        let engine = engine_with_remote();
        engine.save_test_cases(&[sample_case("1")], None);
        engine.save_test_cases(&[sample_case("1"), sample_case("2")], None);

        let owner = engine.owner().unwrap();
        let records = engine.remote().unwrap().list_records(&owner).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data.as_array().unwrap().len(), 2);
    }

    #[test]
    fn offline_save_is_local_only() {
        let engine = SyncEngine::new(LocalStore::in_memory(), None, Box::new(NoAuth));
        engine.save_test_cases(&[sample_case("1")], None);

        assert_eq!(engine.status().get(), SyncState::Offline);
        let local: Vec<TestCase> = engine.local().load(DataKind::TestCases.as_str(), vec![]);
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn owner_failure_degrades_but_local_save_sticks() {
        struct FailingAuth;
        impl AuthProvider for FailingAuth {
            fn current_principal(&self) -> Result<Option<Principal>, AuthError> {
                Err(AuthError::Provider("down".into()))
            }
        }

        let engine = SyncEngine::new(
            LocalStore::in_memory(),
            Some(Box::new(SqliteRemote::in_memory().unwrap())),
            Box::new(FailingAuth),
        );
        engine.save_test_cases(&[sample_case("1")], None);

        assert_eq!(
            engine.status().get(),
            SyncState::Error("Authentication failed".into())
        );
        let local: Vec<TestCase> = engine.local().load(DataKind::TestCases.as_str(), vec![]);
        assert_eq!(local.len(), 1);
    }

    #[test]
    fn scoped_load_prefers_global_freshest() {
        let remote = SqliteRemote::in_memory().unwrap();
        let key = DataKind::TestCases.storage_key(Some("proj-1"));
        let older = Utc::now() - chrono::Duration::minutes(10);

        remote
            .insert_record(&SyncRecordInput {
                user_id: "owner-a".into(),
                data_type: key.clone(),
                data: serde_json::to_value(vec![sample_case("stale")]).unwrap(),
                project_id: None,
                updated_at: older,
            })
            .unwrap();
        remote
            .insert_record(&SyncRecordInput {
                user_id: "owner-b".into(),
                data_type: key.clone(),
                data: serde_json::to_value(vec![sample_case("fresh")]).unwrap(),
                project_id: None,
                updated_at: Utc::now(),
            })
            .unwrap();

        let engine = SyncEngine::new(
            LocalStore::in_memory(),
            Some(Box::new(remote)),
            Box::new(StaticAuth::signed_in("owner-a", "a@example.com")),
        );
        let loaded = engine.load_test_cases(Some("proj-1"));
        assert_eq!(loaded[0].id, "fresh");

        // The fetched copy is shadowed locally
        let local: Vec<TestCase> = engine.local().load(&key, vec![]);
        assert_eq!(local[0].id, "fresh");
    }

    #[test]
    fn unscoped_load_stays_in_owner_partition() {
        let remote = SqliteRemote::in_memory().unwrap();
        remote
            .insert_record(&SyncRecordInput {
                user_id: "someone-else".into(),
                data_type: DataKind::Defects.as_str().into(),
                data: serde_json::json!([{"id": "d1", "bugId": "BUG-001",
                    "severity": "high", "module": "m", "description": "x",
                    "stepsToReproduce": "", "status": "open", "assignedTo": "",
                    "createdAt": "2026-01-01T00:00:00Z"}]),
                project_id: None,
                updated_at: Utc::now(),
            })
            .unwrap();

        let engine = SyncEngine::new(
            LocalStore::in_memory(),
            Some(Box::new(remote)),
            Box::new(NoAuth),
        );
        assert!(engine.load_defects(None).is_empty());
    }

    #[test]
    fn load_without_remote_uses_local() {
        let engine = SyncEngine::new(LocalStore::in_memory(), None, Box::new(NoAuth));
        engine
            .local()
            .save(DataKind::TestCases.as_str(), &vec![sample_case("1")]);
        assert_eq!(engine.load_test_cases(None).len(), 1);
    }

    #[test]
    fn sync_all_refreshes_local_shadows() {
        let engine = engine_with_remote();
        let owner = engine.owner().unwrap();
        for kind in [DataKind::TestCases, DataKind::Defects] {
            engine
                .remote()
                .unwrap()
                .insert_record(&SyncRecordInput {
                    user_id: owner.clone(),
                    data_type: kind.as_str().into(),
                    data: serde_json::json!([]),
                    project_id: None,
                    updated_at: Utc::now(),
                })
                .unwrap();
        }

        assert_eq!(engine.sync_all(), 2);
        assert!(engine.local().contains(DataKind::TestCases.as_str()));
        assert!(engine.local().contains(DataKind::Defects.as_str()));
    }

    #[test]
    fn export_import_round_trips() {
        let source = SyncEngine::new(LocalStore::in_memory(), None, Box::new(NoAuth));
        source.save_test_cases(&[sample_case("1")], Some("proj-1"));

        let bundle = source.export_all(Some("proj-1"));
        let json = serde_json::to_string(&bundle).unwrap();
        let parsed: ExportBundle = serde_json::from_str(&json).unwrap();

        let target = SyncEngine::new(LocalStore::in_memory(), None, Box::new(NoAuth));
        target.import_all(&parsed, Some("proj-1"));
        assert_eq!(target.load_test_cases(Some("proj-1")).len(), 1);
    }
}
