//! Test runs
//!
//! A run owns every suite of one configuration file, executes them one after
//! the other and reduces their results to a single verdict.

use colored::Colorize;
use tracing::{error, info};

use crate::common::config::RunConfig;
use crate::common::Result;
use crate::header::headers_from_config;
use crate::http::HttpClient;
use crate::status::TestStatus;

use super::suite::TestSuite;

/// Final verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Passed,
    Failed,
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::Failed => 1,
        }
    }

    /// Combine two outcomes; any failure wins
    pub fn and(self, other: RunOutcome) -> RunOutcome {
        if self == RunOutcome::Passed && other == RunOutcome::Passed {
            RunOutcome::Passed
        } else {
            RunOutcome::Failed
        }
    }
}

/// Collection of test suites
#[derive(Debug)]
pub struct TestRun {
    suites: Vec<TestSuite>,
}

impl TestRun {
    /// Build every suite of the configuration
    ///
    /// Run-level headers are shared by all suites. Any construction error
    /// aborts the whole run.
    pub fn new(config: &RunConfig) -> Result<Self> {
        let global_headers = headers_from_config(&config.headers);
        let suites = config
            .suites
            .iter()
            .map(|suite| TestSuite::new(suite, &global_headers))
            .collect::<Result<_>>()?;
        Ok(Self { suites })
    }

    /// Run all suites in order and print the summary
    ///
    /// Suites are independent: each has its own value pool.
    pub async fn run(&mut self, client: &dyn HttpClient) -> RunOutcome {
        info!("Starting Test Run");
        for suite in &mut self.suites {
            suite.run(client).await;
        }
        info!("Test Run finished");

        self.summary();
        self.outcome()
    }

    /// Passed unless some recorded result is a failure
    pub fn outcome(&self) -> RunOutcome {
        let failed = self
            .suites
            .iter()
            .flat_map(|suite| suite.results())
            .any(|result| result.status.is_failure());
        if failed {
            RunOutcome::Failed
        } else {
            RunOutcome::Passed
        }
    }

    /// Print per-suite, per-test results to stdout
    pub fn summary(&self) {
        println!("\n{}", "---------- Test Run Results ----------".bold());
        for suite in &self.suites {
            println!();
            println!("{}", "*".repeat(50));
            println!("Test Suite \"{}\"", suite.name().white().bold());
            println!("{}", "*".repeat(50));
            for result in suite.results() {
                println!(
                    "{} Test \"{}\" - Result: {}",
                    paint(result.status, result.status.icon()),
                    result.name,
                    paint(result.status, &result.status.to_string())
                );
            }
        }
        println!();

        match self.outcome() {
            RunOutcome::Passed => info!("All tests successful. See the results above for more details."),
            RunOutcome::Failed => error!("Some tests failed. See the results above for more details."),
        }
    }

    pub fn suites(&self) -> &[TestSuite] {
        &self.suites
    }
}

fn paint(status: TestStatus, text: &str) -> colored::ColoredString {
    match status {
        TestStatus::Success => text.green(),
        TestStatus::Failure => text.red(),
        TestStatus::Skipped => text.yellow(),
        TestStatus::Pending | TestStatus::Running => text.dimmed(),
    }
}
