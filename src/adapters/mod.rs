//! Adapters for configuration transformation and Kubernetes resource building

pub mod cluster_config;
pub mod common;
pub mod config_map_builder;
pub mod deployment_builder;
pub mod service_builder;
