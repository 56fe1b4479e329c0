//! Declarative API testing
//!
//! Suites of HTTP calls and their expected responses are described as data.
//! Tests in a suite run in order, and values extracted from one response can
//! be injected into the requests that follow.

pub mod cli;
pub mod common;
pub mod header;
pub mod http;
pub mod keypath;
pub mod matcher;
pub mod status;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use status::TestStatus;
pub use testing::{RunOutcome, TestRun};
