//! Tracing and resolution over complete topologies
//!
//! Each test builds a scenario from the fixtures crate and checks the
//! walk and its resolved connection from one or both ends.

use cablepath_test::refs::*;
use cablepath_test::{scenarios, TopologyBuilder};
use cablepath_trace::{
    derive_connection, resolve, trace, Connection, EndpointRecord, EndpointStore, Reconciler,
    TraceError,
};
use cablepath_types::{NodeKind, NodeRef};
use pretty_assertions::assert_eq;

fn connection(origin: NodeRef, endpoint: Option<NodeRef>, status: bool) -> Connection {
    Connection {
        origin,
        endpoint,
        status,
    }
}

#[test]
fn test_uncabled_endpoint_resolves_to_none() {
    let topo = TopologyBuilder::new().interface(1).build();

    let trace = trace(&topo, iface(1)).unwrap();
    assert_eq!(trace.path.len(), 1);
    assert!(trace.path[0].cable.is_none());
    assert_eq!(
        resolve(&trace).unwrap(),
        connection(iface(1), None, false)
    );
}

#[test]
fn test_direct_link_from_both_ends() {
    let topo = scenarios::direct_link();

    assert_eq!(
        derive_connection(&topo, iface(1)).unwrap(),
        connection(iface(1), Some(iface(2)), true)
    );
    assert_eq!(
        derive_connection(&topo, iface(2)).unwrap(),
        connection(iface(2), Some(iface(1)), true)
    );
}

#[test]
fn test_single_position_panels_never_use_the_stack() {
    let topo = scenarios::single_position_patch();

    let trace = trace(&topo, iface(1)).unwrap();
    assert_eq!(trace.cable_ids(), vec![1, 2, 3]);
    assert!(trace.split.is_none());
    assert!(trace.position_stack.is_empty());
    assert_eq!(
        resolve(&trace).unwrap(),
        connection(iface(1), Some(iface(2)), true)
    );

    let back = trace_from(&topo, iface(2));
    assert_eq!(back, connection(iface(2), Some(iface(1)), true));
}

#[test]
fn test_trunk_keeps_positions_aligned() {
    let topo = scenarios::multi_position_trunk();

    for (near, far) in [(1, 4), (2, 5), (3, 6)] {
        assert_eq!(
            trace_from(&topo, iface(near)),
            connection(iface(near), Some(iface(far)), true)
        );
        assert_eq!(
            trace_from(&topo, iface(far)),
            connection(iface(far), Some(iface(near)), true)
        );
    }

    // interface:2 -> front:2 -> rear:1 -> rear:2 -> front:5 -> interface:5
    let trace = trace(&topo, iface(2)).unwrap();
    assert_eq!(trace.cable_ids(), vec![2, 4, 6]);
    assert!(trace.position_stack.is_empty());
}

#[test]
fn test_cable_into_multi_position_rear_splits() {
    let topo = scenarios::split_at_rear_port();

    let trace = trace(&topo, iface(1)).unwrap();
    let split = trace.split.as_ref().expect("trace should split");
    assert_eq!(split.rear_port.node_ref(), rear(1));
    let candidates: Vec<NodeRef> = split.candidates.iter().map(|fp| fp.node_ref()).collect();
    assert_eq!(candidates, vec![front(1), front(2), front(3)]);

    assert_eq!(resolve(&trace).unwrap().endpoint, None);
}

#[test]
fn test_patch_panel_loop_crosses_each_cable_once() {
    let topo = scenarios::patch_panel_loop();

    let trace = trace(&topo, front(1)).unwrap();
    assert!(trace.looped);
    assert_eq!(trace.cable_ids(), vec![1, 2]);

    // A pass-through port is never a valid origin for resolution.
    assert_eq!(
        resolve(&trace),
        Err(TraceError::non_terminal(front(1)))
    );
}

#[test]
fn test_loop_reached_from_endpoint_is_not_connected() {
    let topo = scenarios::folded_trunk_loop();

    let trace = trace(&topo, iface(1)).unwrap();
    assert!(trace.looped);
    assert_eq!(trace.cable_ids(), vec![1, 2, 3]);
    assert_eq!(
        resolve(&trace).unwrap(),
        connection(iface(1), None, false)
    );
}

#[test]
fn test_planned_cable_clears_status() {
    let topo = scenarios::mixed_status_path();

    assert_eq!(
        trace_from(&topo, iface(1)),
        connection(iface(1), Some(iface(2)), false)
    );
    assert_eq!(
        trace_from(&topo, iface(2)),
        connection(iface(2), Some(iface(1)), false)
    );
}

#[test]
fn test_dangling_circuit_falls_back_to_near_termination() {
    let topo = scenarios::circuit_dangling();

    let trace = trace(&topo, iface(1)).unwrap();
    assert_eq!(trace.path.len(), 2);
    assert_eq!(trace.path[1].near.node_ref(), circuit_term(2));
    assert_eq!(
        resolve(&trace).unwrap(),
        connection(iface(1), Some(circuit_term(1)), false)
    );

    assert_eq!(
        trace_from(&topo, circuit_term(1)),
        connection(circuit_term(1), Some(iface(1)), true)
    );
    assert_eq!(
        trace_from(&topo, circuit_term(2)),
        connection(circuit_term(2), None, false)
    );
}

#[test]
fn test_circuit_is_transparent_end_to_end() {
    let topo = scenarios::circuit_end_to_end();

    assert_eq!(
        trace_from(&topo, iface(1)),
        connection(iface(1), Some(iface(2)), true)
    );
    assert_eq!(
        trace_from(&topo, iface(2)),
        connection(iface(2), Some(iface(1)), true)
    );
}

#[test]
fn test_out_of_range_position_is_an_integrity_error() {
    // front:1 claims position 3 of a 2-position rear port.
    let topo = TopologyBuilder::new()
        .interface(1)
        .rear_port(1, 2)
        .front_port(1, 1, 3)
        .panel(2, 2, 10)
        .cable(iface(1), front(1))
        .cable(rear(1), rear(2))
        .build();

    let err = trace(&topo, iface(1)).unwrap_err();
    assert_eq!(
        err,
        TraceError::InvalidPosition {
            rear_port: rear(2),
            positions: 2,
            position: 3,
        }
    );
    assert!(err.is_integrity_violation());
}

#[test]
fn test_pass_through_terminus_is_an_integrity_error() {
    // A single-position rear port with no front port behind it.
    let topo = TopologyBuilder::new()
        .interface(1)
        .rear_port(1, 1)
        .cable(iface(1), rear(1))
        .build();

    let err = derive_connection(&topo, iface(1)).unwrap_err();
    assert_eq!(err, TraceError::non_terminal(rear(1)));
    assert!(err.is_integrity_violation());
}

#[test]
fn test_unwired_multi_position_rear_is_an_integrity_error() {
    // Four positions and not one front port behind them.
    let mut topo = TopologyBuilder::new()
        .interface(1)
        .rear_port(1, 4)
        .cable(iface(1), rear(1))
        .build();

    let walk = trace(&topo, iface(1)).unwrap();
    assert!(walk.split.as_ref().is_some_and(|split| split.candidates.is_empty()));

    let err = derive_connection(&topo, iface(1)).unwrap_err();
    assert_eq!(err, TraceError::non_terminal(rear(1)));

    let report = Reconciler::default().run(&mut topo).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].endpoint, iface(1));
    assert_eq!(topo.endpoint_record(iface(1)).unwrap(), EndpointRecord::default());
}

#[test]
fn test_unknown_start_node() {
    let topo = scenarios::direct_link();
    let missing = NodeRef::new(NodeKind::PowerPort, 1);

    let err = trace(&topo, missing).unwrap_err();
    assert!(matches!(err, TraceError::Topology(ref e) if e.is_not_found()));
}

fn trace_from(topo: &cablepath_trace::MemoryTopology, origin: NodeRef) -> Connection {
    derive_connection(topo, origin).unwrap()
}
