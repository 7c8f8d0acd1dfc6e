//! `qatrack export` / `import` / `report` - collection dumps and reports

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::build_engine;
use crate::cli::GlobalOpts;
use crate::core::ExportBundle;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Project id to export (omit for the legacy unscoped collections)
    #[arg(long)]
    pub project: Option<String>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Exported JSON document to import
    pub file: PathBuf,

    /// Project id to import into (omit for the legacy unscoped collections)
    #[arg(long)]
    pub project: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Test cases as CSV
    TestCases(ReportArgs),

    /// Defects as CSV
    Defects(ReportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Project id to report on
    #[arg(long)]
    pub project: Option<String>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

pub fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let bundle = engine.export_all(args.project.as_deref());
    let json = serde_json::to_string_pretty(&bundle).into_diagnostic()?;

    match args.out {
        Some(path) => {
            fs::write(&path, json).into_diagnostic()?;
            if !global.quiet {
                println!("Exported to {}", path.display());
            }
        }
        None => println!("{}", json),
    }
    Ok(())
}

pub fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let contents = fs::read_to_string(&args.file).into_diagnostic()?;
    let bundle: ExportBundle = serde_json::from_str(&contents).into_diagnostic()?;

    engine.import_all(&bundle, args.project.as_deref());
    if !global.quiet {
        println!("Imported {}", args.file.display());
    }
    Ok(())
}

pub fn run_report(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::TestCases(args) => run_test_case_csv(args, global),
        ReportCommands::Defects(args) => run_defect_csv(args, global),
    }
}

fn run_test_case_csv(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let cases = engine.load_test_cases(args.project.as_deref());

    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record([
            "testCaseId",
            "module",
            "scenario",
            "expectedResult",
            "actualResult",
            "status",
            "comments",
        ])
        .into_diagnostic()?;
    for case in &cases {
        writer
            .write_record([
                case.test_case_id.as_str(),
                case.module.as_str(),
                case.scenario.as_str(),
                case.expected_result.as_str(),
                case.actual_result.as_str(),
                &case.status.to_string(),
                case.comments.as_str(),
            ])
            .into_diagnostic()?;
    }
    write_csv(writer, args.out)
}

fn run_defect_csv(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let defects = engine.load_defects(args.project.as_deref());

    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record([
            "bugId",
            "severity",
            "module",
            "description",
            "status",
            "assignedTo",
        ])
        .into_diagnostic()?;
    for defect in &defects {
        writer
            .write_record([
                defect.bug_id.as_str(),
                &defect.severity.to_string(),
                defect.module.as_str(),
                defect.description.as_str(),
                &defect.status.to_string(),
                defect.assigned_to.as_str(),
            ])
            .into_diagnostic()?;
    }
    write_csv(writer, args.out)
}

fn write_csv(writer: csv::Writer<Vec<u8>>, out: Option<PathBuf>) -> Result<()> {
    let bytes = writer.into_inner().into_diagnostic()?;
    match out {
        Some(path) => fs::write(path, bytes).into_diagnostic()?,
        None => std::io::stdout().write_all(&bytes).into_diagnostic()?,
    }
    Ok(())
}
