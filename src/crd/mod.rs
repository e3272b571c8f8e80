//! Custom Resource Definitions for the Cache Storage Operator

mod cache_storage;
mod cluster;
mod partition;
mod sharding;

pub use cache_storage::*;
pub use cluster::*;
pub use partition::*;
pub use sharding::*;

use kube::CustomResourceExt;

/// Generate CRD YAML manifests for all custom resources
pub fn generate_crds() -> serde_yaml::Result<Vec<String>> {
    Ok(vec![
        serde_yaml::to_string(&Cluster::crd())?,
        serde_yaml::to_string(&Partition::crd())?,
        serde_yaml::to_string(&CacheStorage::crd())?,
    ])
}
