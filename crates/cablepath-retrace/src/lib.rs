//! Library side of the `retrace` tool: configuration, snapshot files and
//! subcommand bodies.

pub mod commands;
pub mod config_file;
pub mod error;
pub mod snapshot;

pub use config_file::{RetraceConfig, DEFAULT_CONFIG_PATH};
pub use error::{Result, RetraceError};
