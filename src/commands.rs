//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::suites::Suite;

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Base URL of the application under test (overrides NEXT_PUBLIC_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to a config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Treat heuristic warnings as failures
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log requests and checks to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios against the API and print a report
    Run {
        /// Only run this suite
        #[arg(long, value_enum)]
        suite: Option<Suite>,

        /// Only run these scenario keys (repeatable)
        #[arg(long = "only")]
        only: Vec<String>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List available scenarios
    List {
        /// Only list this suite
        #[arg(long, value_enum)]
        suite: Option<Suite>,
    },

    /// Show the effective configuration
    Config,
}
