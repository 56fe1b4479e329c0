//! apitest - run declarative API test suites
//!
//! Each configuration file given on the command line is loaded and executed
//! in turn. The exit code is 0 when every test passed, 1 otherwise.

use std::path::PathBuf;

use clap::Parser;

use apitest::cli;

#[derive(Parser)]
#[command(name = "apitest", about = "Run API test suites described in JSON")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration files (JSON, or YAML with a .yaml/.yml extension)
    #[arg(required = true, value_name = "CONFIG")]
    configs: Vec<PathBuf>,

    /// Numeric log level overriding the configuration (10 debug .. 40 error)
    #[arg(long)]
    log_level: Option<u32>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = tokio::select! {
        result = cli::run_configs(&cli.configs, cli.log_level) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, exiting before the run completed");
            std::process::exit(0);
        }
    };

    match result {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) if e.is_construction() => {
            eprintln!("Error: could not build the test run: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
