//! `qatrack sync` command - remote synchronization

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::build_engine;
use crate::cli::GlobalOpts;
use crate::core::SyncState;

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Pull every remote record for the current owner into the local cache
    Pull,

    /// Show sync configuration and state
    Status,
}

pub fn run(cmd: SyncCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SyncCommands::Pull => run_pull(global),
        SyncCommands::Status => run_status(global),
    }
}

fn run_pull(global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    let count = engine.sync_all();

    match engine.status().get() {
        SyncState::Synced => {
            println!("Pulled {} record(s)", count);
        }
        state => {
            println!("Sync did not complete: {}", state);
        }
    }
    Ok(())
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;

    match engine.remote() {
        Some(_) => {
            println!("Remote:       configured");
            match engine.owner() {
                Some(owner) => println!("Owner:        {}", owner),
                None => println!("Owner:        unresolved"),
            }
        }
        None => println!("Remote:       offline"),
    }
    match engine.local().last_updated() {
        Some(ts) => println!("Last update:  {}", ts.to_rfc3339()),
        None => println!("Last update:  never"),
    }
    println!("State:        {}", engine.status().get());
    Ok(())
}
