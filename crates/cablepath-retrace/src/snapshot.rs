//! Topology snapshot files
//!
//! A snapshot is a JSON document holding nodes, cables and stored endpoint
//! state. Writes go to a sibling temporary file that is renamed over the
//! target, so an interrupted run never leaves a truncated snapshot.

use std::fs;
use std::path::Path;

use cablepath_trace::{MemoryTopology, TopologySnapshot};
use tracing::{debug, info};

use crate::error::{Result, RetraceError};

/// Reads a snapshot file without building a topology from it.
pub fn read_snapshot(path: &Path) -> Result<TopologySnapshot> {
    let content = fs::read_to_string(path).map_err(|e| RetraceError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| RetraceError::snapshot(path, e))
}

/// Loads a snapshot file into a `MemoryTopology`.
pub fn load_topology(path: &Path) -> Result<MemoryTopology> {
    let snapshot = read_snapshot(path)?;
    let topology = MemoryTopology::from_snapshot(snapshot)?;
    info!(
        path = %path.display(),
        nodes = topology.node_count(),
        cables = topology.cable_count(),
        "Loaded topology"
    );
    Ok(topology)
}

/// Writes `topology` to `path` as pretty-printed JSON.
pub fn save_topology(topology: &MemoryTopology, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(&topology.to_snapshot())
        .map_err(|e| RetraceError::snapshot(path, e))?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = Path::new(&staging);

    fs::write(staging, content).map_err(|e| RetraceError::io(staging, e))?;
    fs::rename(staging, path).map_err(|e| RetraceError::io(path, e))?;
    debug!(path = %path.display(), "Saved topology");
    Ok(())
}
