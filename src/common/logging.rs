//! Logging and tracing configuration
//!
//! The run log is the primary output of the tool, so everything goes to
//! stderr through a compact formatter.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default numeric log level (debug), as found in `logLevel` configs
pub const DEFAULT_LOG_LEVEL: u32 = 10;

/// Map a numeric `logLevel` (10 = debug, 20 = info, 30 = warning, 40+ = error)
/// to a tracing level filter
pub fn level_from_number(level: u32) -> LevelFilter {
    match level {
        0..=10 => LevelFilter::DEBUG,
        11..=20 => LevelFilter::INFO,
        21..=30 => LevelFilter::WARN,
        _ => LevelFilter::ERROR,
    }
}

/// Initialize tracing for the CLI
///
/// `RUST_LOG` takes precedence when set. Otherwise the crate logs at the
/// level derived from `level`, dependencies at WARN.
pub fn init_cli(level: u32) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_from_number(level);
        EnvFilter::new(format!("apitest={},warn", level).to_lowercase())
    });

    // A second init (e.g. several configs in one process) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
