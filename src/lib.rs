//! Atomix Cache Storage Kubernetes Operator
//!
//! This operator provisions the ConfigMap, Deployment and Service backing
//! each cache storage `Cluster`, and propagates readiness from the
//! Deployment up to the cluster's `Partition` resources and the `Cluster`
//! status.

pub mod adapters;
pub mod config;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;
pub mod store;

pub use error::{Error, Result};
