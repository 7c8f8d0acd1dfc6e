//! Testing module and module template records
//!
//! Modules group test cases by area (functional or non-functional);
//! templates seed a module with default scenarios and an id prefix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleType {
    #[default]
    Functional,
    NonFunctional,
}

impl std::fmt::Display for ModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleType::Functional => write!(f, "functional"),
            ModuleType::NonFunctional => write!(f, "non-functional"),
        }
    }
}

/// A testing area within a project, e.g. "Authentication" or "Performance"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestingModule {
    pub id: String,
    pub project_id: String,
    pub module_type: ModuleType,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub order: u32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scenario pre-filled when a module template is applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultScenario {
    pub id: String,
    pub test_case_id: String,
    pub scenario: String,
    pub expected_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<String>,
    pub order: u32,
}

/// Seed data attached to a testing module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestingModuleTemplate {
    pub id: String,
    pub module_id: String,
    pub project_id: String,
    /// Prefix for generated test case ids, e.g. "AUTH", "PERF"
    pub test_case_id_prefix: String,
    pub default_scenarios: Vec<DefaultScenario>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
