//! Sign-off records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stakeholder sign-off line; `date` stays null until signed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub role: String,
    pub name: String,
    pub signature: String,
    pub date: Option<DateTime<Utc>>,
}
