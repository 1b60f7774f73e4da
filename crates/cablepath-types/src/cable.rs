//! Cable records.

use crate::NodeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Installation status of a cable.
///
/// Only `connected` cables count towards a live path. Unknown status
/// strings are preserved as [`CableStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CableStatus {
    /// Cable is installed and patched (default).
    #[default]
    Connected,
    /// Cable is planned but not yet installed.
    Planned,
    /// Cable is scheduled for removal.
    Decommissioning,
    /// Any other status string.
    Other(String),
}

impl CableStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, CableStatus::Connected)
    }

    pub fn as_str(&self) -> &str {
        match self {
            CableStatus::Connected => "connected",
            CableStatus::Planned => "planned",
            CableStatus::Decommissioning => "decommissioning",
            CableStatus::Other(s) => s,
        }
    }
}

impl From<String> for CableStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "connected" => CableStatus::Connected,
            "planned" => CableStatus::Planned,
            "decommissioning" => CableStatus::Decommissioning,
            _ => CableStatus::Other(s),
        }
    }
}

impl From<&str> for CableStatus {
    fn from(s: &str) -> Self {
        CableStatus::from(s.to_string())
    }
}

impl From<CableStatus> for String {
    fn from(status: CableStatus) -> Self {
        match status {
            CableStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for CableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An undirected cable between two terminations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cable {
    pub id: u64,
    pub termination_a: NodeRef,
    pub termination_b: NodeRef,
    #[serde(default)]
    pub status: CableStatus,
}

impl Cable {
    pub fn new(id: u64, termination_a: NodeRef, termination_b: NodeRef) -> Self {
        Self {
            id,
            termination_a,
            termination_b,
            status: CableStatus::Connected,
        }
    }

    pub fn with_status(mut self, status: impl Into<CableStatus>) -> Self {
        self.status = status.into();
        self
    }

    /// Returns the end opposite `near`.
    ///
    /// If the A end matches, the B end is returned and vice versa. Returns
    /// `None` when `near` is not an end of this cable.
    pub fn far_end(&self, near: NodeRef) -> Option<NodeRef> {
        if self.termination_a == near {
            Some(self.termination_b)
        } else if self.termination_b == near {
            Some(self.termination_a)
        } else {
            None
        }
    }
}

impl fmt::Display for Cable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cable {} ({} <-> {}, {})",
            self.id, self.termination_a, self.termination_b, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_far_end() {
        let a = NodeRef::new(NodeKind::Interface, 1);
        let b = NodeRef::new(NodeKind::FrontPort, 2);
        let cable = Cable::new(10, a, b);

        assert_eq!(cable.far_end(a), Some(b));
        assert_eq!(cable.far_end(b), Some(a));
        assert_eq!(cable.far_end(NodeRef::new(NodeKind::Interface, 3)), None);
    }

    #[test]
    fn test_status_strings() {
        assert!(CableStatus::from("connected").is_connected());
        assert_eq!(CableStatus::from("planned"), CableStatus::Planned);
        assert_eq!(
            CableStatus::from("in-transit"),
            CableStatus::Other("in-transit".to_string())
        );
        assert!(!CableStatus::from("in-transit").is_connected());
        assert_eq!(String::from(CableStatus::Decommissioning), "decommissioning");
    }

    #[test]
    fn test_cable_serde_default_status() {
        let json = r#"{
            "id": 3,
            "termination_a": {"kind": "interface", "id": 1},
            "termination_b": {"kind": "interface", "id": 2}
        }"#;
        let cable: Cable = serde_json::from_str(json).unwrap();
        assert_eq!(cable.status, CableStatus::Connected);

        let planned = cable.with_status("planned");
        let out = serde_json::to_value(&planned).unwrap();
        assert_eq!(out["status"], "planned");
    }
}
