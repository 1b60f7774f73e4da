//! Error types for retrace

use std::path::{Path, PathBuf};

use cablepath_trace::{TopologyError, TraceError};
use cablepath_types::ParseError;
use thiserror::Error;

/// Errors raised by the retrace tool
#[derive(Error, Debug)]
pub enum RetraceError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Snapshot could not be parsed or serialized
    #[error("Snapshot error in {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    /// Snapshot content violates topology constraints
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Trace aborted
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// Node reference could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Writing command output failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// IO error
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RetraceError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn snapshot(path: &Path, message: impl ToString) -> Self {
        Self::Snapshot {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for retrace operations
pub type Result<T> = std::result::Result<T, RetraceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use cablepath_types::{NodeKind, NodeRef};

    #[test]
    fn test_error_display() {
        let err = RetraceError::config("progress_interval must be > 0");
        assert_eq!(
            err.to_string(),
            "Configuration error: progress_interval must be > 0"
        );
    }

    #[test]
    fn test_snapshot_error_names_file() {
        let err = RetraceError::snapshot(Path::new("/tmp/topo.json"), "expected value");
        assert_eq!(
            err.to_string(),
            "Snapshot error in /tmp/topo.json: expected value"
        );
    }

    #[test]
    fn test_topology_error_conversion() {
        let node = NodeRef::new(NodeKind::Interface, 4);
        let err: RetraceError = TopologyError::NodeNotFound(node).into();
        assert!(matches!(err, RetraceError::Topology(_)));
    }
}
