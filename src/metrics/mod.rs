//! Prometheus metrics for the Cache Storage Operator
//!
//! This module exposes metrics for monitoring reconciliation and partition
//! readiness.

pub mod prometheus;

pub use prometheus::*;
