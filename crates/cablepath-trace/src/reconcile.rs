//! Sweep over every endpoint that writes back derived connections.
//!
//! For each endpoint the sweep traces, resolves, and compares the result
//! with what the store holds. A record is written only when the far
//! endpoint or the status differs, so running the sweep twice over an
//! unchanged topology writes nothing the second time.
//!
//! Errors are per endpoint: an integrity problem on one endpoint is logged
//! and recorded in the [`ReconcileReport`], and the sweep moves on.

use cablepath_types::{EndpointKind, NodeRef};
use tracing::{debug, error, info, instrument, warn};

use crate::endpoint_state::{get_connected_endpoint, set_connected_endpoint, EndpointStore};
use crate::error::{TraceError, TraceResult};
use crate::resolver::{resolve, Connection};
use crate::topology::Topology;
use crate::tracer::trace;

/// Receives progress notifications from a sweep.
pub trait ProgressSink {
    /// Called after each endpoint with the number examined so far.
    fn endpoint_done(&mut self, examined: usize);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize),
{
    fn endpoint_done(&mut self, examined: usize) {
        self(examined)
    }
}

/// Progress sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn endpoint_done(&mut self, _examined: usize) {}
}

/// Options for a reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Compute changes without writing them.
    pub dry_run: bool,
}

/// A difference between stored and derived state for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointChange {
    pub endpoint: NodeRef,
    pub previous_endpoint: Option<NodeRef>,
    pub previous_status: Option<bool>,
    pub connection: Connection,
}

/// An endpoint whose trace could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub endpoint: NodeRef,
    pub error: TraceError,
}

/// Summary of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub examined: usize,
    pub unchanged: usize,
    pub changes: Vec<EndpointChange>,
    pub failures: Vec<EndpointFailure>,
    pub dry_run: bool,
}

impl ReconcileReport {
    /// Number of endpoints whose record was (or in a dry run would be)
    /// written.
    pub fn updated(&self) -> usize {
        self.changes.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Traces `endpoint` and resolves its connection without touching the
/// store.
pub fn derive_connection<T>(topology: &T, endpoint: NodeRef) -> TraceResult<Connection>
where
    T: Topology + ?Sized,
{
    let trace = trace(topology, endpoint)?;
    resolve(&trace)
}

/// Drives reconciliation sweeps over a store.
#[derive(Debug)]
pub struct Reconciler<P = NoProgress> {
    options: ReconcileOptions,
    progress: P,
}

impl Reconciler<NoProgress> {
    pub fn new(options: ReconcileOptions) -> Self {
        Self {
            options,
            progress: NoProgress,
        }
    }
}

impl Default for Reconciler<NoProgress> {
    fn default() -> Self {
        Self::new(ReconcileOptions::default())
    }
}

impl<P: ProgressSink> Reconciler<P> {
    /// Replaces the progress sink.
    pub fn with_progress<Q: ProgressSink>(self, progress: Q) -> Reconciler<Q> {
        Reconciler {
            options: self.options,
            progress,
        }
    }

    /// Reconciles every endpoint of every kind.
    ///
    /// Only a failure to list endpoints aborts the sweep.
    #[instrument(skip(self, store), fields(dry_run = self.options.dry_run))]
    pub fn run<S>(&mut self, store: &mut S) -> TraceResult<ReconcileReport>
    where
        S: Topology + EndpointStore + ?Sized,
    {
        let mut report = ReconcileReport {
            dry_run: self.options.dry_run,
            ..Default::default()
        };

        for kind in EndpointKind::ALL {
            for endpoint in store.endpoints(kind)? {
                match self.reconcile_endpoint(store, endpoint) {
                    Ok(Some(change)) => report.changes.push(change),
                    Ok(None) => report.unchanged += 1,
                    Err(error) => {
                        if error.is_integrity_violation() {
                            warn!(endpoint = %endpoint, error = %error, "Topology integrity problem, endpoint skipped");
                        } else {
                            error!(endpoint = %endpoint, error = %error, "Failed to reconcile endpoint");
                        }
                        report.failures.push(EndpointFailure { endpoint, error });
                    }
                }
                report.examined += 1;
                self.progress.endpoint_done(report.examined);
            }
        }

        info!(
            examined = report.examined,
            updated = report.updated(),
            unchanged = report.unchanged,
            failed = report.failures.len(),
            "Reconciliation complete"
        );
        Ok(report)
    }

    /// Reconciles a single endpoint, returning the change if one was
    /// needed.
    pub fn reconcile_endpoint<S>(
        &mut self,
        store: &mut S,
        endpoint: NodeRef,
    ) -> TraceResult<Option<EndpointChange>>
    where
        S: Topology + EndpointStore + ?Sized,
    {
        let kind = endpoint
            .kind
            .as_endpoint()
            .ok_or(TraceError::non_terminal(endpoint))?;

        let connection = derive_connection(&*store, endpoint)?;
        let previous_endpoint = get_connected_endpoint(&*store, endpoint)?;
        let stored = store.endpoint_record(endpoint)?;
        let previous_status = stored.connection_status;

        if previous_endpoint == connection.endpoint
            && previous_status == Some(connection.status)
        {
            return Ok(None);
        }

        // Reverse-owned links and dual fields of another kind cannot hold
        // the derived peer; only a record that actually changes is written.
        let mut record = stored.clone();
        set_connected_endpoint(&mut record, kind, connection.endpoint);
        record.connection_status = Some(connection.status);
        if record == stored {
            debug!(
                endpoint = %endpoint,
                derived = ?connection.endpoint,
                "Derived peer not storable on this endpoint; record already current"
            );
            return Ok(None);
        }

        debug!(
            endpoint = %endpoint,
            previous = ?previous_endpoint,
            derived = ?connection.endpoint,
            status = connection.status,
            "Endpoint connection changed"
        );

        if !self.options.dry_run {
            store.save_endpoint_record(endpoint, record)?;
        }

        Ok(Some(EndpointChange {
            endpoint,
            previous_endpoint,
            previous_status,
            connection,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTopology;
    use cablepath_types::{Cable, Node, NodeKind};
    use pretty_assertions::assert_eq;

    fn iface(id: u64) -> NodeRef {
        NodeRef::new(NodeKind::Interface, id)
    }

    fn linked_pair() -> MemoryTopology {
        let mut topo = MemoryTopology::new();
        topo.add_node(Node::Interface { id: 1 }).unwrap();
        topo.add_node(Node::Interface { id: 2 }).unwrap();
        topo.add_cable(Cable::new(1, iface(1), iface(2))).unwrap();
        topo
    }

    #[test]
    fn test_run_writes_then_settles() {
        let mut topo = linked_pair();
        let mut reconciler = Reconciler::default();

        let first = reconciler.run(&mut topo).unwrap();
        assert_eq!(first.examined, 2);
        assert_eq!(first.updated(), 2);
        assert!(first.is_clean());
        assert_eq!(get_connected_endpoint(&topo, iface(1)).unwrap(), Some(iface(2)));

        let second = reconciler.run(&mut topo).unwrap();
        assert_eq!(second.updated(), 0);
        assert_eq!(second.unchanged, 2);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let mut topo = linked_pair();
        let mut reconciler = Reconciler::new(ReconcileOptions { dry_run: true });

        let report = reconciler.run(&mut topo).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.updated(), 2);
        assert_eq!(get_connected_endpoint(&topo, iface(1)).unwrap(), None);
        assert_eq!(topo.endpoint_record(iface(1)).unwrap().connection_status, None);
    }

    #[test]
    fn test_progress_is_reported_per_endpoint() {
        let mut topo = linked_pair();
        let mut seen = Vec::new();
        let report = Reconciler::default()
            .with_progress(|n: usize| seen.push(n))
            .run(&mut topo)
            .unwrap();
        assert_eq!(report.examined, 2);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn test_status_change_alone_triggers_write() {
        let mut topo = linked_pair();
        let mut reconciler = Reconciler::default();
        reconciler.run(&mut topo).unwrap();

        topo.set_cable_status(1, "planned").unwrap();
        let report = reconciler.run(&mut topo).unwrap();
        assert_eq!(report.updated(), 2);
        let change = &report.changes[0];
        assert_eq!(change.previous_endpoint, Some(iface(2)));
        assert_eq!(change.previous_status, Some(true));
        assert_eq!(change.connection.endpoint, Some(iface(2)));
        assert!(!change.connection.status);
    }

    #[test]
    fn test_pass_through_is_not_reconciled() {
        let mut topo = MemoryTopology::new();
        let front = NodeRef::new(NodeKind::FrontPort, 1);
        let err = Reconciler::default()
            .reconcile_endpoint(&mut topo, front)
            .unwrap_err();
        assert_eq!(err, TraceError::non_terminal(front));
    }
}
