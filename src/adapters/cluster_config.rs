//! Cluster spec to storage node JSON configuration transformation
//!
//! The storage node reads `cluster.json` with the member list and the
//! partition ids it serves. Field names follow the node's JSON mapping
//! (camelCase, empty fields omitted).

use kube::ResourceExt;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::crd::{partition_range, Cluster};
use crate::Result;

/// Port used for both the protocol and client API of a storage node
pub const NODE_PORT: i32 = 5678;

/// Configuration for every node of a cluster
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    pub members: Vec<MemberConfig>,
    pub partitions: Vec<PartitionId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberConfig {
    pub id: String,
    pub host: String,
    pub protocol_port: i32,
    pub api_port: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionId {
    pub partition: i32,
    pub cluster: ClusterId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterId {
    pub id: i32,
    pub database_id: DatabaseId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseId {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

/// Build the node configuration for `cluster`
///
/// Fails with a configuration error when the shard or database annotation
/// is missing or malformed.
pub fn build_cluster_config(cluster: &Cluster) -> Result<ClusterConfig> {
    let name = cluster.name_any();
    let namespace = cluster.namespace().unwrap_or_default();
    let cluster_id = cluster.cluster_id()?;
    let database = cluster.database()?;

    let members = vec![MemberConfig {
        id: name.clone(),
        host: format!("{}.{}.svc.cluster.local", name, namespace),
        protocol_port: NODE_PORT,
        api_port: NODE_PORT,
    }];

    let partitions = partition_range(cluster.spec.partitions, cluster_id)?
        .map(|partition| PartitionId {
            partition,
            cluster: ClusterId {
                id: cluster_id,
                database_id: DatabaseId {
                    name: database.clone(),
                    namespace: namespace.clone(),
                },
            },
        })
        .collect();

    Ok(ClusterConfig {
        members,
        partitions,
    })
}

impl ClusterConfig {
    /// Serialize to the JSON document mounted as `cluster.json`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short SHA-256 digest of the serialized configuration
    pub fn checksum(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_json()?.as_bytes());
        Ok(format!("{:x}", hasher.finalize())[..16].to_string())
    }
}
