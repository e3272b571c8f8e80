//! Kubernetes Deployment builder for storage node pods

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, EmptyDirVolumeSource, PodSpec,
    PodTemplateSpec, Probe, TCPSocketAction, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;
use std::collections::BTreeMap;

use super::cluster_config::NODE_PORT;
use super::common::{build_labels, owned_metadata};
use super::config_map_builder::{CLUSTER_CONFIG_FILE, CONFIG_PATH, PROTOCOL_CONFIG_FILE};
use crate::crd::{CacheStorage, Cluster};

/// Directory backing the node's local data
pub const DATA_PATH: &str = "/var/lib/atomix";

/// Pod template annotation recording the checksum of the configuration the
/// Deployment was created with
pub const CONFIG_CHECKSUM_ANNOTATION: &str = "checksum/config";

const DEFAULT_PULL_POLICY: &str = "IfNotPresent";

/// Build the single-node Deployment for a cluster
pub fn build_deployment(cluster: &Cluster, storage: &CacheStorage, config_hash: &str) -> Deployment {
    let labels = build_labels(cluster);

    let mut pod_annotations = BTreeMap::new();
    pod_annotations.insert(
        CONFIG_CHECKSUM_ANNOTATION.to_string(),
        config_hash.to_string(),
    );

    Deployment {
        metadata: owned_metadata(cluster),
        spec: Some(DeploymentSpec {
            // Each cluster shard is served by exactly one cache node.
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    annotations: Some(pod_annotations),
                    ..Default::default()
                }),
                spec: Some(build_pod_spec(cluster, storage)),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn build_pod_spec(cluster: &Cluster, storage: &CacheStorage) -> PodSpec {
    let image_pull_policy = storage
        .spec
        .image_pull_policy
        .clone()
        .unwrap_or_else(|| DEFAULT_PULL_POLICY.to_string());

    let tcp_probe = |initial_delay: i32, period: i32| Probe {
        tcp_socket: Some(TCPSocketAction {
            port: IntOrString::String("api".to_string()),
            ..Default::default()
        }),
        initial_delay_seconds: Some(initial_delay),
        period_seconds: Some(period),
        timeout_seconds: Some(5),
        failure_threshold: Some(3),
        ..Default::default()
    };

    let container = Container {
        name: "atomix".to_string(),
        image: Some(storage.spec.image.clone()),
        image_pull_policy: Some(image_pull_policy),
        args: Some(vec![
            cluster.name_any(),
            format!("{}/{}", CONFIG_PATH, CLUSTER_CONFIG_FILE),
            format!("{}/{}", CONFIG_PATH, PROTOCOL_CONFIG_FILE),
        ]),
        ports: Some(vec![ContainerPort {
            name: Some("api".to_string()),
            container_port: NODE_PORT,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![
            VolumeMount {
                name: "config".to_string(),
                mount_path: CONFIG_PATH.to_string(),
                read_only: Some(true),
                ..Default::default()
            },
            VolumeMount {
                name: "data".to_string(),
                mount_path: DATA_PATH.to_string(),
                ..Default::default()
            },
        ]),
        liveness_probe: Some(tcp_probe(60, 10)),
        readiness_probe: Some(tcp_probe(10, 10)),
        ..Default::default()
    };

    PodSpec {
        containers: vec![container],
        volumes: Some(vec![
            Volume {
                name: "config".to_string(),
                config_map: Some(ConfigMapVolumeSource {
                    name: cluster.name_any(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            Volume {
                name: "data".to_string(),
                empty_dir: Some(EmptyDirVolumeSource::default()),
                ..Default::default()
            },
        ]),
        ..Default::default()
    }
}
