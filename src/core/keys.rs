//! Data-kind discriminators and the persisted key namespace
//!
//! The string constants here are load-bearing: earlier releases (and the
//! web dashboard this tool shares data with) already persisted records
//! under these exact keys, so they must never change. Key composition is
//! centralized here so call sites cannot produce colliding keys.

use serde::{Deserialize, Serialize};

/// Marker key stamped on every local save
pub const LAST_UPDATED_KEY: &str = "credit_bureau_last_updated";

/// Key holding the cached project list
pub const PROJECTS_KEY: &str = "testing_portal_projects";

/// Key holding the persisted anonymous session token
pub const SESSION_TOKEN_KEY: &str = "testing_portal_session_id";

/// Key holding the demo-mode signed-in user (remote disabled only)
pub const DEMO_AUTH_USER_KEY: &str = "demo_auth_user";

/// Discriminator for each persisted record collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    TestCases,
    Defects,
    Metrics,
    Objectives,
    QualityGates,
    Environments,
    SignOffs,
    ProjectTabs,
    FunctionalModules,
    FunctionalModuleTemplates,
    NonFunctionalModules,
    NonFunctionalModuleTemplates,
}

impl DataKind {
    /// Get the storage key for this kind (unscoped form)
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::TestCases => "credit_bureau_test_cases",
            DataKind::Defects => "credit_bureau_defects",
            DataKind::Metrics => "credit_bureau_metrics",
            DataKind::Objectives => "credit_bureau_objectives",
            DataKind::QualityGates => "credit_bureau_quality_gates",
            DataKind::Environments => "credit_bureau_environments",
            DataKind::SignOffs => "credit_bureau_sign_offs",
            DataKind::ProjectTabs => "credit_bureau_project_tabs",
            DataKind::FunctionalModules => "credit_bureau_functional_modules",
            DataKind::FunctionalModuleTemplates => "credit_bureau_functional_module_templates",
            DataKind::NonFunctionalModules => "credit_bureau_non_functional_modules",
            DataKind::NonFunctionalModuleTemplates => {
                "credit_bureau_non_functional_module_templates"
            }
        }
    }

    /// Get all kinds, in the order collections are exported
    pub fn all() -> &'static [DataKind] {
        &[
            DataKind::TestCases,
            DataKind::Defects,
            DataKind::Metrics,
            DataKind::Objectives,
            DataKind::QualityGates,
            DataKind::Environments,
            DataKind::SignOffs,
            DataKind::ProjectTabs,
            DataKind::FunctionalModules,
            DataKind::FunctionalModuleTemplates,
            DataKind::NonFunctionalModules,
            DataKind::NonFunctionalModuleTemplates,
        ]
    }

    /// Compose the storage key, prefixed with the project id when scoped.
    ///
    /// This is the only place composite keys are built; the `_` separator
    /// cannot collide because kind keys never start with `_` and project
    /// ids never contain one (slugs use `-`, server ids are UUIDs).
    pub fn storage_key(&self, project_id: Option<&str>) -> String {
        match project_id {
            Some(pid) => format!("{}_{}", pid, self.as_str()),
            None => self.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test-cases" | "credit_bureau_test_cases" => Ok(DataKind::TestCases),
            "defects" | "credit_bureau_defects" => Ok(DataKind::Defects),
            "metrics" | "credit_bureau_metrics" => Ok(DataKind::Metrics),
            "objectives" | "credit_bureau_objectives" => Ok(DataKind::Objectives),
            "quality-gates" | "credit_bureau_quality_gates" => Ok(DataKind::QualityGates),
            "environments" | "credit_bureau_environments" => Ok(DataKind::Environments),
            "sign-offs" | "credit_bureau_sign_offs" => Ok(DataKind::SignOffs),
            "tabs" | "credit_bureau_project_tabs" => Ok(DataKind::ProjectTabs),
            "functional-modules" | "credit_bureau_functional_modules" => {
                Ok(DataKind::FunctionalModules)
            }
            "functional-module-templates" | "credit_bureau_functional_module_templates" => {
                Ok(DataKind::FunctionalModuleTemplates)
            }
            "non-functional-modules" | "credit_bureau_non_functional_modules" => {
                Ok(DataKind::NonFunctionalModules)
            }
            "non-functional-module-templates"
            | "credit_bureau_non_functional_module_templates" => {
                Ok(DataKind::NonFunctionalModuleTemplates)
            }
            _ => Err(format!("Unknown data kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_stable() {
        // These constants interoperate with already-persisted data.
        assert_eq!(DataKind::TestCases.as_str(), "credit_bureau_test_cases");
        assert_eq!(DataKind::SignOffs.as_str(), "credit_bureau_sign_offs");
        assert_eq!(
            DataKind::NonFunctionalModuleTemplates.as_str(),
            "credit_bureau_non_functional_module_templates"
        );
        assert_eq!(LAST_UPDATED_KEY, "credit_bureau_last_updated");
        assert_eq!(PROJECTS_KEY, "testing_portal_projects");
    }

    #[test]
    fn scoped_key_prefixes_project_id() {
        assert_eq!(
            DataKind::Defects.storage_key(Some("proj-a")),
            "proj-a_credit_bureau_defects"
        );
        assert_eq!(
            DataKind::Defects.storage_key(None),
            "credit_bureau_defects"
        );
    }

    #[test]
    fn kinds_parse_from_both_forms() {
        for kind in DataKind::all() {
            let parsed: DataKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert_eq!("test-cases".parse::<DataKind>(), Ok(DataKind::TestCases));
    }
}
