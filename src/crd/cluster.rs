//! Cluster Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::cache_storage::{CACHE_STORAGE_GROUP, CACHE_STORAGE_KIND};

/// Cluster resource specification
///
/// A cluster is one shard of a database. It owns a contiguous range of
/// partitions and is backed by a storage resource referenced in `storage`.
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "cloud.atomix.io",
    version = "v1beta2",
    kind = "Cluster",
    plural = "clusters",
    singular = "cluster",
    namespaced,
    status = "ClusterStatus",
    printcolumn = r#"{"name": "Partitions", "type": "integer", "jsonPath": ".spec.partitions"}"#,
    printcolumn = r#"{"name": "Ready", "type": "integer", "jsonPath": ".status.readyPartitions"}"#,
    printcolumn = r#"{"name": "Storage", "type": "string", "jsonPath": ".spec.storage.kind"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Number of partitions owned by this cluster shard
    #[serde(default = "default_partitions")]
    pub partitions: i32,

    /// Storage resource backing the cluster
    pub storage: StorageReference,
}

fn default_partitions() -> i32 {
    1
}

/// Reference to the storage resource backing a cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageReference {
    /// Storage API group
    pub group: String,

    /// Storage API version
    pub version: String,

    /// Storage kind
    pub kind: String,

    /// Storage namespace (defaults to the cluster namespace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Storage name
    pub name: String,
}

impl StorageReference {
    /// Whether this reference points at a CacheStorage resource
    pub fn is_cache_storage(&self) -> bool {
        self.group == CACHE_STORAGE_GROUP && self.kind == CACHE_STORAGE_KIND
    }
}

/// Cluster status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    /// Number of owned partitions marked ready
    #[serde(default)]
    pub ready_partitions: i32,
}

impl Cluster {
    /// Number of partitions already marked ready
    pub fn ready_partitions(&self) -> i32 {
        self.status
            .as_ref()
            .map(|s| s.ready_partitions)
            .unwrap_or(0)
    }

    /// Whether every owned partition has been marked ready
    pub fn is_ready(&self) -> bool {
        self.ready_partitions() >= self.spec.partitions
    }
}
