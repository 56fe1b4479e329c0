//! Test execution engine
//!
//! A [`TestRun`] holds [`TestSuite`]s, which hold [`ApiTest`]s. Suites chain
//! their tests: values extracted from one response are injected into the
//! next request.

mod case;
mod run;
mod suite;

pub use case::{ApiTest, SharedConfig, TestOutput};
pub use run::{RunOutcome, TestRun};
pub use suite::{TestResult, TestSuite};

/// Named values extracted from responses, shared across a suite
pub type ValuePool = serde_json::Map<String, serde_json::Value>;
