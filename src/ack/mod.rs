//! Acknowledgment reconciliation: extraction, classification, state
//! machine, actuation, and the sweep / watch drivers.

pub mod actuator;
pub mod extract;
pub mod poll;
pub mod reaction;
pub mod reconcile;
