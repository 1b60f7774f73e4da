//! Verification helpers for reconciled topologies
//!
//! Assertions over stored endpoint links and connection status

use cablepath_trace::{
    derive_connection, get_connected_endpoint, EndpointStore, Topology, TraceError,
};
use cablepath_types::{EndpointKind, NodeRef};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    #[error("Endpoint mismatch for {endpoint}: expected {expected:?}, stored {actual:?}")]
    EndpointMismatch {
        endpoint: NodeRef,
        expected: Option<NodeRef>,
        actual: Option<NodeRef>,
    },

    #[error("Status mismatch for {endpoint}: expected {expected:?}, stored {actual:?}")]
    StatusMismatch {
        endpoint: NodeRef,
        expected: Option<bool>,
        actual: Option<bool>,
    },

    #[error("{endpoint} is not settled: derived {derived:?} ({status}), stored {stored:?}")]
    NotSettled {
        endpoint: NodeRef,
        derived: Option<NodeRef>,
        status: bool,
        stored: Option<NodeRef>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Stored connection verification helper
pub struct ConnectionVerifier<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> ConnectionVerifier<'a, S>
where
    S: Topology + EndpointStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Verify the stored far endpoint of `endpoint`
    pub fn assert_endpoint(&self, endpoint: NodeRef, expected: Option<NodeRef>) -> VerifyResult<()> {
        let actual = get_connected_endpoint(self.store, endpoint)?;
        if actual != expected {
            return Err(VerificationError::EndpointMismatch {
                endpoint,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Verify the stored connection status of `endpoint`
    pub fn assert_status(&self, endpoint: NodeRef, expected: Option<bool>) -> VerifyResult<()> {
        let actual = self
            .store
            .endpoint_record(endpoint)
            .map_err(TraceError::from)?
            .connection_status;
        if actual != expected {
            return Err(VerificationError::StatusMismatch {
                endpoint,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Verify that `a` and `b` are stored as each other's far endpoint
    /// with the given status on both sides
    pub fn assert_linked(&self, a: NodeRef, b: NodeRef, status: bool) -> VerifyResult<()> {
        self.assert_endpoint(a, Some(b))?;
        self.assert_endpoint(b, Some(a))?;
        self.assert_status(a, Some(status))?;
        self.assert_status(b, Some(status))
    }

    /// Verify that `endpoint` has no stored far endpoint
    pub fn assert_unlinked(&self, endpoint: NodeRef) -> VerifyResult<()> {
        self.assert_endpoint(endpoint, None)
    }

    /// Verify that every endpoint's stored state matches a fresh trace
    ///
    /// Endpoints whose trace fails are skipped; a sweep leaves them as they
    /// were.
    pub fn assert_settled(&self) -> VerifyResult<()> {
        for kind in EndpointKind::ALL {
            for endpoint in self.store.endpoints(kind).map_err(TraceError::from)? {
                let Ok(connection) = derive_connection(self.store, endpoint) else {
                    continue;
                };
                let stored = get_connected_endpoint(self.store, endpoint)?;
                let status = self
                    .store
                    .endpoint_record(endpoint)
                    .map_err(TraceError::from)?
                    .connection_status;
                if stored != connection.endpoint || status != Some(connection.status) {
                    return Err(VerificationError::NotSettled {
                        endpoint,
                        derived: connection.endpoint,
                        status: connection.status,
                        stored,
                    });
                }
            }
        }
        Ok(())
    }
}
