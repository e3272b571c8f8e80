//! Kubernetes ConfigMap builder for storage node configuration

use k8s_openapi::api::core::v1::ConfigMap;
use std::collections::BTreeMap;

use super::cluster_config::ClusterConfig;
use super::common::owned_metadata;
use crate::crd::Cluster;
use crate::Result;

/// Directory the ConfigMap is mounted at inside the node container
pub const CONFIG_PATH: &str = "/etc/atomix";

/// ConfigMap key holding the cluster configuration
pub const CLUSTER_CONFIG_FILE: &str = "cluster.json";

/// ConfigMap key holding the protocol configuration
pub const PROTOCOL_CONFIG_FILE: &str = "protocol.json";

/// Build the ConfigMap for a cluster
pub fn build_config_map(cluster: &Cluster, config: &ClusterConfig) -> Result<ConfigMap> {
    let mut data = BTreeMap::new();
    data.insert(CLUSTER_CONFIG_FILE.to_string(), config.to_json()?);
    // The cache protocol takes no options.
    data.insert(PROTOCOL_CONFIG_FILE.to_string(), "{}".to_string());

    Ok(ConfigMap {
        metadata: owned_metadata(cluster),
        data: Some(data),
        ..Default::default()
    })
}
