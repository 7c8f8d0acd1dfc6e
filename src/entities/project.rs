//! Project entity and its create/update inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    OnHold,
    Archived,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::OnHold => write!(f, "on-hold"),
            ProjectStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "on-hold" => Ok(ProjectStatus::OnHold),
            "archived" => Ok(ProjectStatus::Archived),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectPhase {
    #[default]
    Planning,
    Development,
    Testing,
    Uat,
    Completed,
}

impl std::fmt::Display for ProjectPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectPhase::Planning => write!(f, "planning"),
            ProjectPhase::Development => write!(f, "development"),
            ProjectPhase::Testing => write!(f, "testing"),
            ProjectPhase::Uat => write!(f, "uat"),
            ProjectPhase::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for ProjectPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(ProjectPhase::Planning),
            "development" => Ok(ProjectPhase::Development),
            "testing" => Ok(ProjectPhase::Testing),
            "uat" => Ok(ProjectPhase::Uat),
            "completed" => Ok(ProjectPhase::Completed),
            _ => Err(format!("Unknown project phase: {}", s)),
        }
    }
}

/// A tracked project
///
/// `id` starts as a locally generated slug and is superseded by the
/// server-issued UUID after the first successful remote sync; the
/// migration pass rewrites child references when that happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Unique among all projects known to the owner, case-insensitive
    pub short_code: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub target_users: Vec<String>,
    pub document_version: String,
    pub status: ProjectStatus,
    pub phase: ProjectPhase,
    /// Theme color (hex)
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Generate a local project id: name slug plus a base36 timestamp
    pub fn generate_id(name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        let slug = slug.trim_matches('-').to_string();
        let slug = {
            // Collapse runs of '-' left by consecutive separators
            let mut out = String::with_capacity(slug.len());
            let mut prev_dash = false;
            for c in slug.chars() {
                if c == '-' {
                    if !prev_dash {
                        out.push(c);
                    }
                    prev_dash = true;
                } else {
                    out.push(c);
                    prev_dash = false;
                }
            }
            out
        };
        format!("{}-{}", slug, to_base36(Utc::now().timestamp_millis()))
    }
}

fn to_base36(mut n: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n <= 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub name: String,
    pub short_code: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub target_users: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Partial update applied over an existing project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    pub short_code: Option<String>,
    pub description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub target_users: Option<Vec<String>>,
    pub document_version: Option<String>,
    pub status: Option<ProjectStatus>,
    pub phase: Option<ProjectPhase>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl UpdateProjectInput {
    /// Merge this partial input over `project`, stamping `updated_at`.
    /// Short codes are normalized to upper case, as at creation.
    pub fn apply(self, project: &Project) -> Project {
        let mut updated = project.clone();
        if let Some(name) = self.name {
            updated.name = name;
        }
        if let Some(code) = self.short_code {
            updated.short_code = code.to_uppercase();
        }
        if let Some(description) = self.description {
            updated.description = description;
        }
        if let Some(tech_stack) = self.tech_stack {
            updated.tech_stack = tech_stack;
        }
        if let Some(target_users) = self.target_users {
            updated.target_users = target_users;
        }
        if let Some(document_version) = self.document_version {
            updated.document_version = document_version;
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        if let Some(phase) = self.phase {
            updated.phase = phase;
        }
        if let Some(color) = self.color {
            updated.color = color;
        }
        if let Some(icon) = self.icon {
            updated.icon = Some(icon);
        }
        updated.updated_at = Utc::now();
        updated
    }
}

/// Per-project test and defect statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_test_cases: usize,
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub blocked: usize,
    pub defects_open: usize,
    pub defects_closed: usize,
    /// Rounded percentage, 0 when there are no test cases
    pub pass_rate: u32,
}

/// Statistics aggregated across every project
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_test_cases: usize,
    pub total_passed: usize,
    pub total_failed: usize,
    pub total_pending: usize,
    pub total_blocked: usize,
    pub total_defects_open: usize,
    pub total_defects_closed: usize,
    pub overall_pass_rate: u32,
    pub project_breakdown: Vec<(Project, ProjectStats)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_slugs_the_name() {
        let id = Project::generate_id("My New Project!");
        assert!(id.starts_with("my-new-project-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn update_merges_only_present_fields() {
        let project = Project {
            id: "p-1".into(),
            name: "Alpha".into(),
            short_code: "ALP".into(),
            description: "d".into(),
            tech_stack: vec!["Rust".into()],
            target_users: vec![],
            document_version: "1.0".into(),
            status: ProjectStatus::Active,
            phase: ProjectPhase::Planning,
            color: "#6366F1".into(),
            icon: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let updated = UpdateProjectInput {
            short_code: Some("beta".into()),
            phase: Some(ProjectPhase::Testing),
            ..Default::default()
        }
        .apply(&project);

        assert_eq!(updated.name, "Alpha");
        assert_eq!(updated.short_code, "BETA");
        assert_eq!(updated.phase, ProjectPhase::Testing);
        assert!(updated.updated_at >= project.updated_at);
    }
}
