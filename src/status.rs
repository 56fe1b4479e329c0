//! Lifecycle status of a single API test

use std::fmt;

/// Status of a test
///
/// A test starts `Pending`, moves to `Running` when its call is issued and
/// ends in `Success` or `Failure`. Disabled tests go straight to `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestStatus {
    /// Not executed yet
    #[default]
    Pending,
    /// Call in flight
    Running,
    /// Executed and every check passed
    Success,
    /// Executed with at least one failed check
    Failure,
    /// Disabled in configuration, never executed
    Skipped,
}

impl TestStatus {
    /// Symbol shown next to the test in run summaries
    pub fn icon(self) -> &'static str {
        match self {
            TestStatus::Pending => "\u{231B}",
            TestStatus::Running => "\u{25B6}",
            TestStatus::Success => "\u{2714}",
            TestStatus::Failure => "\u{2718}",
            TestStatus::Skipped => "\u{25C9}",
        }
    }

    /// Whether the test reached a final state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TestStatus::Success | TestStatus::Failure | TestStatus::Skipped
        )
    }

    /// Only failures count against a run; skipped tests do not
    pub fn is_failure(self) -> bool {
        self == TestStatus::Failure
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "PENDING"),
            TestStatus::Running => write!(f, "RUNNING"),
            TestStatus::Success => write!(f, "SUCCESS"),
            TestStatus::Failure => write!(f, "FAILURE"),
            TestStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}
