//! Session telemetry.
//!
//! Telemetry is a READ-ONLY side-effect layer: the engine writes to it but
//! never reads it back when deciding what to do next.
//!
//! Events carry no learner content: only indices, counts, states and timings.

pub mod event;
pub mod metrics;
pub mod recorder;
