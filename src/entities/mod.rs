//! Domain record types for all tracked collections
//!
//! Every record carries an opaque id and an optional owning-project
//! reference. Collections are persisted wholesale as JSON arrays, so the
//! serde field names here are load-bearing: they must match the payloads
//! already stored by earlier releases.

pub mod defect;
pub mod environment;
pub mod metric;
pub mod module;
pub mod objective;
pub mod project;
pub mod sign_off;
pub mod tab;
pub mod test_case;

pub use defect::{Defect, DefectSeverity, DefectStatus};
pub use environment::{EnvironmentStatus, TestEnvironment};
pub use metric::{MetricStatus, SuccessMetric};
pub use module::{DefaultScenario, ModuleType, TestingModule, TestingModuleTemplate};
pub use objective::TestObjective;
pub use project::{
    CreateProjectInput, GlobalStats, Project, ProjectPhase, ProjectStats, ProjectStatus,
    UpdateProjectInput,
};
pub use sign_off::SignOff;
pub use tab::ProjectTab;
pub use test_case::{TestCase, TestStatus};
