use clap::Parser;
use miette::Result;
use qatrack::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Project(cmd) => qatrack::cli::commands::project::run(cmd, &global),
        Commands::Export(args) => qatrack::cli::commands::data::run_export(args, &global),
        Commands::Import(args) => qatrack::cli::commands::data::run_import(args, &global),
        Commands::Report(cmd) => qatrack::cli::commands::data::run_report(cmd, &global),
        Commands::Sync(cmd) => qatrack::cli::commands::sync::run(cmd, &global),
        Commands::Stats(args) => qatrack::cli::commands::stats::run(args, &global),
        Commands::Auth(cmd) => qatrack::cli::commands::auth::run(cmd, &global),
    }
}
