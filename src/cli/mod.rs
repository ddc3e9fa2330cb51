//! CLI command handling
//!
//! Resolves configuration, runs the harness and prints its output.

use crate::commands::{Commands, GlobalOptions};
use crate::common::paths::config_path;
use crate::common::{Config, Error, Result};
use crate::suites::{self, Suite};
use crate::testing::report::{render_result, render_start, render_summary};
use crate::testing::{Harness, RunEvent};

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands, opts: GlobalOptions) -> Result<i32> {
    match command {
        Commands::Run { suite, only, json } => {
            let scenarios = suites::select(suite, &only)?;
            let config = Config::resolve(opts.config.as_deref(), opts.base_url, opts.strict)?;
            let harness = Harness::from_config(&config)?;

            if !json {
                println!(
                    "Starting {} against {}",
                    heading(suite).to_lowercase(),
                    harness.client().api_base()
                );
                println!("{}", "=".repeat(70));
            }

            let report = harness
                .run(&scenarios, |event| {
                    if json {
                        return;
                    }
                    match event {
                        RunEvent::Started(scenario) => println!("{}", render_start(scenario.title)),
                        RunEvent::Finished(result) => println!("{}", render_result(result)),
                    }
                })
                .await;

            if json {
                println!("{}", report.to_json()?);
            } else {
                println!("{}", render_summary(&report, &format!("{} SUMMARY", heading(suite))));
            }

            Ok(report.exit_code())
        }

        Commands::List { suite } => {
            for scenario in suites::select(suite, &[])? {
                println!(
                    "{:20} {:9} {}",
                    scenario.key,
                    scenario.suite.as_str(),
                    scenario.title
                );
            }
            Ok(0)
        }

        Commands::Config => {
            let config = Config::resolve(opts.config.as_deref(), opts.base_url, opts.strict)?;

            let source = match (&opts.config, config_path()) {
                (Some(path), _) => path.display().to_string(),
                (None, Some(path)) if path.exists() => path.display().to_string(),
                (None, Some(path)) => format!("{} (not present, using defaults)", path.display()),
                (None, None) => "defaults".to_string(),
            };

            println!("# config: {source}");
            println!("# api base: {}", config.api_base()?);
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| Error::Config(e.to_string()))?;
            print!("{rendered}");
            Ok(0)
        }
    }
}

fn heading(suite: Option<Suite>) -> &'static str {
    match suite {
        Some(Suite::Backend) => "BACKEND API TESTS",
        Some(Suite::Profiles) => "AUTISM PROFILE GENERATOR TESTS",
        None => "API TESTS",
    }
}
