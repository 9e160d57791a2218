//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// paprika2notion - import Paprika recipes into a Notion database
#[derive(Parser, Debug)]
#[command(name = "p2n", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.paprika2notion/config.json)
    #[arg(long, global = true, env = "P2N_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write log output to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import recipes into the Notion database
    Import(ImportArgs),

    /// Print the Notion page a recipe file would become
    Preview {
        /// Recipe file (.paprikarecipe, .json, .yaml)
        file: PathBuf,
    },

    /// Check that recipe content hashes match their content
    Verify {
        /// Recipe file or directory of recipe files
        path: PathBuf,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Recipe file or directory of recipe files
    pub path: PathBuf,

    /// Notion database id (overrides NOTION_RECIPE_DB_ID)
    #[arg(long)]
    pub database_id: Option<String>,

    /// Write failed records to this JSONL file
    #[arg(long)]
    pub failures: Option<PathBuf>,

    /// Only import recipes listed in a previous failures file
    #[arg(long)]
    pub only_failed: Option<PathBuf>,

    /// Look up recipes but do not create any pages
    #[arg(long)]
    pub dry_run: bool,
}
