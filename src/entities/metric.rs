//! Success metric records

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MetricStatus {
    Met,
    NotMet,
    #[default]
    Pending,
}

impl std::fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricStatus::Met => write!(f, "met"),
            MetricStatus::NotMet => write!(f, "not-met"),
            MetricStatus::Pending => write!(f, "pending"),
        }
    }
}

impl std::str::FromStr for MetricStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "met" => Ok(MetricStatus::Met),
            "not-met" => Ok(MetricStatus::NotMet),
            "pending" => Ok(MetricStatus::Pending),
            _ => Err(format!("Unknown metric status: {}", s)),
        }
    }
}

/// A measurable success criterion with a target and observed result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessMetric {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub metric: String,
    pub target: String,
    pub actual_result: String,
    pub status: MetricStatus,
}
