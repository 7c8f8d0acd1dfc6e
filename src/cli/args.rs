//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    auth::AuthCommands,
    data::{ExportArgs, ImportArgs, ReportCommands},
    project::ProjectCommands,
    stats::StatsArgs,
    sync::SyncCommands,
};

#[derive(Parser)]
#[command(name = "qatrack")]
#[command(author, version, about = "QA test tracking with dual-tier persistence")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Directory holding the local cache (default: platform data dir)
    #[arg(long, global = true, env = "QATRACK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote store database path; omit to run offline
    #[arg(long, global = true, env = "QATRACK_REMOTE_DB")]
    pub remote_db: Option<PathBuf>,

    /// Resolve ownership under this authenticated principal id
    #[arg(long, global = true, env = "QATRACK_AUTH_USER")]
    pub auth_user: Option<String>,

    /// Email reported for the authenticated principal
    #[arg(long, global = true, env = "QATRACK_AUTH_EMAIL")]
    pub auth_email: Option<String>,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// Export every collection for a project as one JSON document
    Export(ExportArgs),

    /// Import a previously exported JSON document
    Import(ImportArgs),

    /// Tabular and CSV reports over tracked collections
    #[command(subcommand)]
    Report(ReportCommands),

    /// Remote synchronization
    #[command(subcommand)]
    Sync(SyncCommands),

    /// Test and defect statistics
    Stats(StatsArgs),

    /// Demo-mode sign-in state (offline deployments)
    #[command(subcommand)]
    Auth(AuthCommands),
}
