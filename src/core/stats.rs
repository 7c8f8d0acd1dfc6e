//! Test and defect statistics
//!
//! Counts are computed over the project-scoped collections plus the
//! legacy unscoped ones: rows written before project scoping existed
//! carry no `projectId`, and those count toward every project rather
//! than silently vanishing from the dashboard.

use crate::entities::{Defect, GlobalStats, ProjectStats, ProjectStatus, TestCase, TestStatus};

use super::sync::SyncEngine;

/// Whether a legacy or scoped row belongs to `project_id`
fn belongs_to(row_project: Option<&str>, project_id: &str) -> bool {
    match row_project {
        Some(pid) => pid == project_id,
        None => true,
    }
}

impl SyncEngine {
    /// Statistics for one project
    pub fn project_stats(&self, project_id: &str) -> ProjectStats {
        let mut cases: Vec<TestCase> = self.load_test_cases(Some(project_id));
        cases.extend(
            self.load_test_cases(None)
                .into_iter()
                .filter(|tc| belongs_to(tc.project_id.as_deref(), project_id)),
        );

        let mut defects: Vec<Defect> = self.load_defects(Some(project_id));
        defects.extend(
            self.load_defects(None)
                .into_iter()
                .filter(|d| belongs_to(d.project_id.as_deref(), project_id)),
        );

        compute_stats(&cases, &defects)
    }

    /// Statistics aggregated over every known project
    pub fn global_stats(&self) -> GlobalStats {
        let projects = self.load_projects();
        let mut global = GlobalStats {
            total_projects: projects.len(),
            ..Default::default()
        };

        for project in projects {
            if project.status == ProjectStatus::Active {
                global.active_projects += 1;
            }
            let stats = self.project_stats(&project.id);
            global.total_test_cases += stats.total_test_cases;
            global.total_passed += stats.passed;
            global.total_failed += stats.failed;
            global.total_pending += stats.pending;
            global.total_blocked += stats.blocked;
            global.total_defects_open += stats.defects_open;
            global.total_defects_closed += stats.defects_closed;
            global.project_breakdown.push((project, stats));
        }

        global.overall_pass_rate = pass_rate(global.total_passed, global.total_test_cases);
        global
    }
}

fn compute_stats(cases: &[TestCase], defects: &[Defect]) -> ProjectStats {
    let mut stats = ProjectStats {
        total_test_cases: cases.len(),
        ..Default::default()
    };
    for case in cases {
        match case.status {
            TestStatus::Pass => stats.passed += 1,
            TestStatus::Fail => stats.failed += 1,
            TestStatus::Pending => stats.pending += 1,
            TestStatus::Blocked => stats.blocked += 1,
        }
    }
    for defect in defects {
        if defect.status.is_open() {
            stats.defects_open += 1;
        } else {
            stats.defects_closed += 1;
        }
    }
    stats.pass_rate = pass_rate(stats.passed, stats.total_test_cases);
    stats
}

/// Rounded percentage; 0 for an empty set
fn pass_rate(passed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((passed as f64 / total as f64) * 100.0).round() as u32
}
