//! Partition Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Partition resource specification
///
/// Partitions are created by the database controller; this operator only
/// flips their readiness once the owning cluster's Deployment is available.
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "cloud.atomix.io",
    version = "v1beta2",
    kind = "Partition",
    plural = "partitions",
    singular = "partition",
    namespaced,
    status = "PartitionStatus",
    printcolumn = r#"{"name": "ID", "type": "integer", "jsonPath": ".spec.partitionId"}"#,
    printcolumn = r#"{"name": "Ready", "type": "boolean", "jsonPath": ".status.ready"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSpec {
    /// Partition ordinal within the database
    pub partition_id: i32,
}

/// Partition status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartitionStatus {
    /// Whether the partition is being served
    #[serde(default)]
    pub ready: bool,
}

impl Partition {
    pub fn is_ready(&self) -> bool {
        self.status.as_ref().map(|s| s.ready).unwrap_or(false)
    }
}
