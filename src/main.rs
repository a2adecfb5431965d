mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::commands;
use cli::context::{self, Credentials};
use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();
    init_tracing(args.quiet, args.verbose);

    context::init(Some(&args.dir));
    let creds = Credentials {
        github_token: args.token.clone(),
        ai_key: args.ai_key.clone(),
    };

    let result = match &args.command {
        Commands::Init { name, repo } => commands::init::execute(name.as_deref(), repo.as_deref()),
        Commands::Req { action } => commands::requirement::execute(action, &creds),
        Commands::Test { action } => commands::test_case::execute(action, &creds),
        Commands::Risk { action } => commands::risk::execute(action, &creds),
        Commands::Ci { action } => commands::ci::execute(action, &creds),
        Commands::Asset { action } => commands::asset::execute(action, &creds),
        Commands::Link { action } => commands::link::execute(action, &creds),
        Commands::Remove { id } => commands::remove::execute(id, &creds),
        Commands::Dashboard => commands::dashboard::execute(&creds),
        Commands::Log {
            actor,
            event,
            since,
            last,
        } => commands::log::execute(*actor, event.as_deref(), since.as_deref(), *last, &creds),
        Commands::Push { message } => commands::sync::push(message.as_deref(), &creds),
        Commands::Pull => commands::sync::pull(&creds),
        Commands::Issues => commands::github::issues(&creds),
        Commands::Prs { action } => commands::github::prs(action, &creds),
        Commands::Ai { action } => commands::ai::execute(action, &creds),
        Commands::Export { file } => commands::transfer::export(file, &creds),
        Commands::Import { file } => commands::transfer::import(file, &creds),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr; `IGNITION_LOG` overrides the flag-derived level.
fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("IGNITION_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
