//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;

use convoy::util::shell::ColorChoice;

/// Convoy - keep interdependent checkouts building against each other
#[derive(Parser)]
#[command(name = "convoy")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output format for messages
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Root project directory (defaults to the nearest directory with a
    /// Convoy.toml)
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check out the declared branch of every dependency
    Checkout(CheckoutArgs),

    /// Rebuild dependencies and update package references
    Update(UpdateArgs),

    /// Show the version-control status of every dependency
    Status(StatusArgs),

    /// Remove untracked files from dependency checkouts
    Clean(CleanArgs),

    /// Clone dependency checkouts that are missing
    Clone,

    /// Create, delete or list branches across dependencies
    #[command(subcommand)]
    Branch(BranchCommands),

    /// Print the artifact cache directory
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CheckoutArgs {
    /// Create branches that do not exist yet
    #[arg(long)]
    pub create: bool,
}

#[derive(Args)]
pub struct CacheDirArg {
    /// Artifact cache directory
    #[arg(long, env = "CONVOY_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Projects to rebuild from source before caching their packages
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub rebuild: Vec<String>,

    /// Projects whose package references are updated and committed
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub update: Vec<String>,

    /// Create dependency branches that do not exist yet
    #[arg(long)]
    pub create: bool,

    #[command(flatten)]
    pub cache: CacheDirArg,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Only report these dependencies (by project name)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Only clean these dependencies
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Subcommand)]
pub enum BranchCommands {
    /// Create a branch in dependencies
    Create(BranchCreateArgs),

    /// Delete a branch in dependencies
    Delete(BranchDeleteArgs),

    /// List the branches of every dependency
    List(BranchListArgs),
}

#[derive(Args)]
pub struct BranchCreateArgs {
    /// Branch name
    pub branch: String,

    /// Only these dependencies
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct BranchDeleteArgs {
    /// Branch name
    pub branch: String,

    /// Delete even if not merged
    #[arg(short, long)]
    pub force: bool,

    /// Only these dependencies
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Args)]
pub struct BranchListArgs {
    /// Only branches merged into the current one
    #[arg(long)]
    pub merged: bool,
}

#[derive(Args)]
pub struct CacheArgs {
    #[command(flatten)]
    pub cache: CacheDirArg,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
