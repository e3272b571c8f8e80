//! Reconciliation logic for Cluster resources

pub mod cluster;
pub mod readiness;

pub use readiness::{Propagation, ReadinessPropagator};
