//! Subcommand bodies
//!
//! Each command works on an already loaded topology or snapshot and writes
//! its human-readable output to `out`, so the binary only handles files,
//! logging and exit codes.

use std::io::Write;

use cablepath_trace::{
    resolve, trace, MemoryTopology, ProgressSink, ReconcileOptions, ReconcileReport, Reconciler,
    TopologySnapshot, Trace,
};
use cablepath_types::NodeRef;
use tracing::instrument;

use crate::error::Result;

/// Returns a progress sink that writes a dot every `interval` endpoints.
pub fn progress_dots<W: Write>(interval: usize, mut out: W) -> impl FnMut(usize) {
    move |examined: usize| {
        if interval > 0 && examined % interval == 0 {
            // Progress output is best effort.
            let _ = write!(out, ".");
            let _ = out.flush();
        }
    }
}

/// Runs a reconciliation sweep and writes a summary.
pub fn reconcile<P, W>(
    topology: &mut MemoryTopology,
    options: ReconcileOptions,
    progress: P,
    out: &mut W,
) -> Result<ReconcileReport>
where
    P: ProgressSink,
    W: Write + ?Sized,
{
    let report = Reconciler::new(options)
        .with_progress(progress)
        .run(topology)?;
    write_report(out, &report)?;
    Ok(report)
}

/// Writes the summary of a sweep.
pub fn write_report<W: Write + ?Sized>(out: &mut W, report: &ReconcileReport) -> Result<()> {
    for change in &report.changes {
        let previous = match change.previous_endpoint {
            Some(endpoint) => endpoint.to_string(),
            None => "(none)".to_string(),
        };
        writeln!(out, "{} (was {})", change.connection, previous)?;
    }
    for failure in &report.failures {
        writeln!(out, "FAILED {}: {}", failure.endpoint, failure.error)?;
    }
    writeln!(
        out,
        "{}{} endpoints examined, {} updated, {} unchanged, {} failed",
        if report.dry_run { "[dry run] " } else { "" },
        report.examined,
        report.updated(),
        report.unchanged,
        report.failures.len()
    )?;
    Ok(())
}

/// Traces one node and writes the path and its resolution.
///
/// Returns false when the trace could not be resolved to a connection.
#[instrument(skip(topology, out))]
pub fn trace_node<W: Write + ?Sized>(
    topology: &MemoryTopology,
    node: NodeRef,
    out: &mut W,
) -> Result<bool> {
    let trace = trace(topology, node)?;
    write_trace(out, &trace)?;

    if node.kind.is_pass_through() {
        writeln!(out, "connection: not resolved for pass-through port {}", node)?;
        return Ok(true);
    }

    match resolve(&trace) {
        Ok(connection) => {
            writeln!(out, "connection: {}", connection)?;
            Ok(true)
        }
        Err(e) => {
            writeln!(out, "connection: unresolved: {}", e)?;
            Ok(false)
        }
    }
}

/// Writes each segment of a trace, then why it stopped.
pub fn write_trace<W: Write + ?Sized>(out: &mut W, trace: &Trace) -> Result<()> {
    writeln!(out, "trace from {}", trace.origin)?;
    for (index, segment) in trace.path.iter().enumerate() {
        writeln!(out, "  {}: {}", index + 1, segment)?;
    }

    if let Some(split) = &trace.split {
        let candidates: Vec<String> = split
            .candidates
            .iter()
            .map(|fp| fp.node_ref().to_string())
            .collect();
        writeln!(
            out,
            "split at {} ({} positions): {}",
            split.rear_port.node_ref(),
            split.rear_port.positions,
            candidates.join(", ")
        )?;
    }
    if !trace.position_stack.is_empty() {
        let entered: Vec<String> = trace
            .position_stack
            .iter()
            .map(|fp| format!("{} (position {})", fp.node_ref(), fp.rear_port_position))
            .collect();
        writeln!(out, "unresolved positions: {}", entered.join(", "))?;
    }
    if trace.looped {
        writeln!(out, "loop: stopped before re-crossing a cable")?;
    }
    Ok(())
}

/// Validates a snapshot and writes every problem found.
///
/// Entries the store refuses (duplicate nodes, cables to missing nodes,
/// nodes cabled twice) are reported alongside the wiring problems of what
/// could be loaded. Returns true when the snapshot is clean.
pub fn check<W: Write + ?Sized>(snapshot: TopologySnapshot, out: &mut W) -> Result<bool> {
    let nodes = snapshot.nodes.len();
    let cables = snapshot.cables.len();
    let (topology, mut problems) = MemoryTopology::from_snapshot_lenient(snapshot);
    problems.extend(topology.validate());

    for problem in &problems {
        writeln!(out, "{}", problem)?;
    }
    writeln!(
        out,
        "{} nodes, {} cables, {} problems",
        nodes,
        cables,
        problems.len()
    )?;
    Ok(problems.is_empty())
}
