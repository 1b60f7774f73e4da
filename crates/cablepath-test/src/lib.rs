//! Test infrastructure for cable path tracing
//!
//! Provides:
//! - A fluent topology builder over `MemoryTopology`
//! - Ready-made scenarios (patch panels, trunks, circuits, loops, splits)
//! - Verification helpers for stored endpoint connections

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
