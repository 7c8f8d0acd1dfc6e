//! `qatrack auth` command - demo-mode sign-in state
//!
//! Offline deployments have no auth backend; a demo principal stored in
//! the local cache lets sign-in dependent UI flows work. It never takes
//! part in owner resolution.

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::build_engine;
use crate::cli::GlobalOpts;
use crate::core::auth::{demo_current_user, demo_sign_in, demo_sign_out};

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a demo sign-in
    Login(LoginArgs),

    /// Clear the demo sign-in
    Logout,

    /// Show the current demo sign-in
    Whoami,
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// Email to sign in as
    pub email: String,
}

pub fn run(cmd: AuthCommands, global: &GlobalOpts) -> Result<()> {
    let engine = build_engine(global)?;
    match cmd {
        AuthCommands::Login(args) => {
            let user = demo_sign_in(engine.local(), &args.email);
            if !global.quiet {
                println!("Signed in as {}", user.email);
            }
        }
        AuthCommands::Logout => {
            demo_sign_out(engine.local());
            if !global.quiet {
                println!("Signed out");
            }
        }
        AuthCommands::Whoami => match demo_current_user(engine.local()) {
            Some(user) => println!("{}", user.email),
            None => println!("Not signed in"),
        },
    }
    Ok(())
}
