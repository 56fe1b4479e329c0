//! Configuration, errors and logging shared by the engine and the CLI

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
