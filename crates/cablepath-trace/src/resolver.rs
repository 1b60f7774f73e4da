//! Reduction of a trace to the endpoint pair and path status.

use std::fmt;

use cablepath_types::{Node, NodeRef};

use crate::error::{TraceError, TraceResult};
use crate::tracer::Trace;

/// The derived connection of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub origin: NodeRef,
    /// Far endpoint, or `None` when the path is unterminated or ambiguous.
    pub endpoint: Option<NodeRef>,
    /// True only when every hop crossed a connected cable.
    pub status: bool,
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.status { "connected" } else { "not connected" };
        match self.endpoint {
            Some(endpoint) => write!(f, "{} <-> {} ({})", self.origin, endpoint, status),
            None => write!(f, "{} <-> (none) ({})", self.origin, status),
        }
    }
}

/// Decides the far endpoint and overall status of a trace.
///
/// A split with candidates or a non-empty position stack means the far end
/// cannot be known, whatever the last segment says. A split with no
/// candidates resolves like any other trace ending on its rear port. A trace that ends one hop past a
/// circuit termination resolves to that termination.
pub fn resolve(trace: &Trace) -> TraceResult<Connection> {
    let origin = trace.origin.node_ref();
    if !origin.is_endpoint() {
        return Err(TraceError::non_terminal(origin));
    }

    let status = !trace.looped && trace.path.iter().all(|segment| segment.is_connected());

    let ambiguous = trace
        .split
        .as_ref()
        .is_some_and(|split| !split.candidates.is_empty());
    let endpoint = if ambiguous || !trace.position_stack.is_empty() {
        None
    } else {
        far_endpoint(trace)
    };

    if let Some(endpoint) = endpoint {
        if !endpoint.is_endpoint() {
            return Err(TraceError::non_terminal(endpoint));
        }
    }

    Ok(Connection {
        origin,
        endpoint,
        status,
    })
}

fn far_endpoint(trace: &Trace) -> Option<NodeRef> {
    let last = trace.last()?;
    // A looped trace never reached a terminus of its own.
    let far = if trace.looped { None } else { last.far };

    match far {
        Some(node) => Some(node.node_ref()),
        None if trace.path.len() >= 2 => match trace.path[trace.path.len() - 2].far {
            Some(node @ Node::CircuitTermination(_)) => Some(node.node_ref()),
            _ => None,
        },
        None => None,
    }
}
