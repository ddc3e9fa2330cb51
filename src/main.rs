//! Accommodation API harness
//!
//! Runs contract scenarios against the accommodation builder API and exits
//! non-zero if any scenario fails.

use clap::Parser;
use harness::commands::{Commands, GlobalOptions};
use harness::{cli, common::logging};

#[derive(Parser)]
#[command(
    name = "accommodation-harness",
    about = "Contract checks for the accommodation builder API"
)]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.global.verbose);

    match cli::dispatch(cli.command, cli.global).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
