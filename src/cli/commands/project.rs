//! `qatrack project` command - project catalog management

use clap::Subcommand;
use miette::{miette, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::build_engine;
use crate::cli::GlobalOpts;
use crate::entities::{
    CreateProjectInput, Project, ProjectPhase, ProjectStatus, UpdateProjectInput,
};

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// List all projects
    List,

    /// Show one project in detail
    Show(ShowArgs),

    /// Create a new project
    Create(CreateArgs),

    /// Update fields of an existing project
    Update(UpdateArgs),

    /// Delete a project and its tracked collections
    Delete(DeleteArgs),

    /// Migrate locally created projects onto their server identities
    Migrate,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Project id
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Project name
    #[arg(long)]
    pub name: String,

    /// Short code, unique among all projects (normalized to upper case)
    #[arg(long)]
    pub code: String,

    /// Description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Technology stack entries (repeatable)
    #[arg(long = "tech")]
    pub tech_stack: Vec<String>,

    /// Target user groups (repeatable)
    #[arg(long = "user")]
    pub target_users: Vec<String>,

    /// Theme color (hex)
    #[arg(long)]
    pub color: Option<String>,

    /// Icon name
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Project id
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Project status (active, completed, on-hold, archived)
    #[arg(long)]
    pub status: Option<ProjectStatus>,

    /// Project phase (planning, development, testing, uat, completed)
    #[arg(long)]
    pub phase: Option<ProjectPhase>,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Project id
    pub id: String,
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CODE")]
    code: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PHASE")]
    phase: String,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.clone(),
            code: p.short_code.clone(),
            name: p.name.clone(),
            status: p.status.to_string(),
            phase: p.phase.to_string(),
        }
    }
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::List => run_list(global),
        ProjectCommands::Show(args) => run_show(args, global),
        ProjectCommands::Create(args) => run_create(args, global),
        ProjectCommands::Update(args) => run_update(args, global),
        ProjectCommands::Delete(args) => run_delete(args, global),
        ProjectCommands::Migrate => run_migrate(global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let projects = engine.load_projects();
    let rows: Vec<ProjectRow> = projects.iter().map(ProjectRow::from).collect();
    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let project = engine
        .get_project(&args.id)
        .ok_or_else(|| miette!("Project not found: {}", args.id))?;

    println!("ID:          {}", project.id);
    println!("Name:        {}", project.name);
    println!("Short code:  {}", project.short_code);
    println!("Status:      {}", project.status);
    println!("Phase:       {}", project.phase);
    println!("Color:       {}", project.color);
    if !project.description.is_empty() {
        println!("Description: {}", project.description);
    }
    if !project.tech_stack.is_empty() {
        println!("Tech stack:  {}", project.tech_stack.join(", "));
    }
    if !project.target_users.is_empty() {
        println!("Users:       {}", project.target_users.join(", "));
    }
    println!("Created:     {}", project.created_at.to_rfc3339());
    println!("Updated:     {}", project.updated_at.to_rfc3339());
    Ok(())
}

fn run_create(args: CreateArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let project = engine
        .create_project(CreateProjectInput {
            name: args.name,
            short_code: args.code,
            description: args.description,
            tech_stack: args.tech_stack,
            target_users: args.target_users,
            document_version: None,
            color: args.color,
            icon: args.icon,
        })
        .map_err(|e| miette!("{}", e))?;

    if !global.quiet {
        println!("Created project {} ({})", project.short_code, project.id);
    }
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let updated = engine
        .update_project(
            &args.id,
            UpdateProjectInput {
                name: args.name,
                short_code: args.code,
                description: args.description,
                status: args.status,
                phase: args.phase,
                color: args.color,
                icon: args.icon,
                ..Default::default()
            },
        )
        .map_err(|e| miette!("{}", e))?;

    if !global.quiet {
        println!("Updated project {} ({})", updated.short_code, updated.id);
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    engine
        .delete_project(&args.id)
        .map_err(|e| miette!("{}", e))?;

    if !global.quiet {
        println!("Deleted project {}", args.id);
    }
    Ok(())
}

fn run_migrate(global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let outcome = engine.migrate_projects();

    if outcome.skipped {
        println!("Migration already in progress");
    } else if outcome.migrated.is_empty() {
        println!("No projects needed migration");
    } else {
        for pair in &outcome.migrated {
            println!("{} -> {}", pair.old_id, pair.new_id);
        }
        println!("Migrated {} project(s)", outcome.migrated.len());
    }
    Ok(())
}
