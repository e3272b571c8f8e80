//! Labels and ownership shared by every object built for a Cluster

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

use crate::crd::Cluster;

/// Value of the `app.kubernetes.io/managed-by` label on owned objects
pub const MANAGED_BY: &str = "cache-storage-operator";

/// Label selector matching every object this operator manages
pub fn managed_by_selector() -> String {
    format!("app.kubernetes.io/managed-by={}", MANAGED_BY)
}

/// Standard labels for objects belonging to `cluster`
pub fn build_labels(cluster: &Cluster) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(
        "app.kubernetes.io/name".to_string(),
        "atomix-cache-storage".to_string(),
    );
    labels.insert("app.kubernetes.io/instance".to_string(), cluster.name_any());
    labels.insert(
        "app.kubernetes.io/managed-by".to_string(),
        MANAGED_BY.to_string(),
    );
    labels
}

/// Controller owner reference pointing at `cluster`
pub fn build_owner_reference(cluster: &Cluster) -> OwnerReference {
    OwnerReference {
        api_version: Cluster::api_version(&()).to_string(),
        kind: Cluster::kind(&()).to_string(),
        name: cluster.name_any(),
        uid: cluster.metadata.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Metadata for an object named after and owned by `cluster`
pub fn owned_metadata(cluster: &Cluster) -> ObjectMeta {
    ObjectMeta {
        name: Some(cluster.name_any()),
        namespace: cluster.namespace(),
        labels: Some(build_labels(cluster)),
        owner_references: Some(vec![build_owner_reference(cluster)]),
        ..Default::default()
    }
}
