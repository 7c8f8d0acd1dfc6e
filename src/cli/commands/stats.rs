//! `qatrack stats` command - test and defect statistics

use miette::{miette, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::build_engine;
use crate::cli::GlobalOpts;
use crate::entities::ProjectStats;

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Project id (omit for the cross-project summary)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Tabled)]
struct BreakdownRow {
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "TESTS")]
    tests: usize,
    #[tabled(rename = "PASS")]
    passed: usize,
    #[tabled(rename = "FAIL")]
    failed: usize,
    #[tabled(rename = "PENDING")]
    pending: usize,
    #[tabled(rename = "BLOCKED")]
    blocked: usize,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "DEFECTS OPEN")]
    defects_open: usize,
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;

    if let Some(project_id) = &args.project {
        if engine.get_project(project_id).is_none() {
            return Err(miette!("Project not found: {}", project_id));
        }
        print_project_stats(&engine.project_stats(project_id));
        return Ok(());
    }

    let global_stats = engine.global_stats();
    println!(
        "Projects: {} total, {} active",
        global_stats.total_projects, global_stats.active_projects
    );
    println!(
        "Tests:    {} total, {}% passing",
        global_stats.total_test_cases, global_stats.overall_pass_rate
    );
    println!(
        "Defects:  {} open, {} closed",
        global_stats.total_defects_open, global_stats.total_defects_closed
    );
    println!();

    let rows: Vec<BreakdownRow> = global_stats
        .project_breakdown
        .iter()
        .map(|(project, stats)| BreakdownRow {
            code: project.short_code.clone(),
            tests: stats.total_test_cases,
            passed: stats.passed,
            failed: stats.failed,
            pending: stats.pending,
            blocked: stats.blocked,
            rate: format!("{}%", stats.pass_rate),
            defects_open: stats.defects_open,
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn print_project_stats(stats: &ProjectStats) {
    println!("Test cases: {}", stats.total_test_cases);
    println!("  Passed:   {}", stats.passed);
    println!("  Failed:   {}", stats.failed);
    println!("  Pending:  {}", stats.pending);
    println!("  Blocked:  {}", stats.blocked);
    println!("Pass rate:  {}%", stats.pass_rate);
    println!("Defects:    {} open, {} closed", stats.defects_open, stats.defects_closed);
}
