//! CLI orchestration
//!
//! Loads each configuration file, builds its test run and executes it
//! against the real HTTP client.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::common::config::RunConfig;
use crate::common::{logging, Result};
use crate::http::{HttpClient, ReqwestHttpClient};
use crate::testing::{RunOutcome, TestRun};

/// Run every configuration file in order
///
/// Logging is set up from the first file's `logLevel` unless `log_level`
/// overrides it. Loading or construction errors stop processing and are
/// returned; test failures only affect the outcome.
pub async fn run_configs(paths: &[PathBuf], log_level: Option<u32>) -> Result<RunOutcome> {
    let client = ReqwestHttpClient::new()?;
    run_configs_with(paths, log_level, &client).await
}

/// Same as [`run_configs`] with a caller-provided HTTP client
pub async fn run_configs_with(
    paths: &[PathBuf],
    log_level: Option<u32>,
    client: &dyn HttpClient,
) -> Result<RunOutcome> {
    let mut outcome = RunOutcome::Passed;

    // A failing file does not stop later ones; only the exit code combines them.
    for path in paths {
        let config = RunConfig::load(path)?;
        logging::init_cli(log_level.unwrap_or(config.log_level));
        debug!("Loaded configuration file {}", path.display());

        let mut run = TestRun::new(&config)?;
        info!(
            "Configuration {}: {} suite(s)",
            path.display(),
            run.suites().len()
        );
        outcome = outcome.and(run.run(client).await);
    }

    Ok(outcome)
}
