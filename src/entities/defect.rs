//! Defect records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a reported defect
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DefectSeverity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for DefectSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefectSeverity::Critical => write!(f, "critical"),
            DefectSeverity::High => write!(f, "high"),
            DefectSeverity::Medium => write!(f, "medium"),
            DefectSeverity::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for DefectSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(DefectSeverity::Critical),
            "high" => Ok(DefectSeverity::High),
            "medium" => Ok(DefectSeverity::Medium),
            "low" => Ok(DefectSeverity::Low),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Lifecycle status of a defect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DefectStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl DefectStatus {
    /// Open and in-progress defects count as unresolved in statistics
    pub fn is_open(&self) -> bool {
        matches!(self, DefectStatus::Open | DefectStatus::InProgress)
    }
}

impl std::fmt::Display for DefectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefectStatus::Open => write!(f, "open"),
            DefectStatus::InProgress => write!(f, "in-progress"),
            DefectStatus::Resolved => write!(f, "resolved"),
            DefectStatus::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for DefectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(DefectStatus::Open),
            "in-progress" => Ok(DefectStatus::InProgress),
            "resolved" => Ok(DefectStatus::Resolved),
            "closed" => Ok(DefectStatus::Closed),
            _ => Err(format!("Unknown defect status: {}", s)),
        }
    }
}

/// A tracked defect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Human-facing identifier, e.g. "BUG-042"
    pub bug_id: String,
    pub severity: DefectSeverity,
    pub module: String,
    pub description: String,
    pub steps_to_reproduce: String,
    pub status: DefectStatus,
    pub assigned_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defect_status_kebab_case() {
        let json = serde_json::to_string(&DefectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert!(DefectStatus::InProgress.is_open());
        assert!(!DefectStatus::Resolved.is_open());
    }
}
