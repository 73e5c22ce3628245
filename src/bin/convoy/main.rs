//! Convoy CLI - build orchestration across interdependent checkouts

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{BranchCommands, Cli, Commands};
use convoy::StatusCode;

fn main() {
    match run() {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<StatusCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.global.verbose {
            EnvFilter::new("convoy=debug")
        } else {
            EnvFilter::new("convoy=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = cli.global;
    match cli.command {
        Commands::Checkout(args) => commands::checkout::execute(&global, args),
        Commands::Update(args) => commands::update::execute(&global, args),
        Commands::Status(args) => commands::status::execute(&global, args),
        Commands::Clean(args) => commands::clean::execute(&global, args),
        Commands::Clone => commands::clone::execute(&global),
        Commands::Branch(BranchCommands::Create(args)) => commands::branch::create(&global, args),
        Commands::Branch(BranchCommands::Delete(args)) => commands::branch::delete(&global, args),
        Commands::Branch(BranchCommands::List(args)) => commands::branch::list(&global, args),
        Commands::Cache(args) => commands::cache::execute(&global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
