//! Project tab records
//!
//! Tabs describe which dashboard sections a project exposes; they are
//! persisted like any other collection so custom layouts follow the project.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTab {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub label: String,
    /// URL-safe identifier, e.g. "functional-testing"
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub order: u32,
    #[serde(default)]
    pub is_default: bool,
}
