//! Kubernetes Service builder for storage node access

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::ResourceExt;

use super::cluster_config::NODE_PORT;
use super::common::{build_labels, owned_metadata};
use crate::crd::Cluster;

/// Build the Service fronting a cluster's node
pub fn build_service(cluster: &Cluster) -> Service {
    Service {
        metadata: owned_metadata(cluster),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(build_labels(cluster)),
            ports: Some(vec![ServicePort {
                name: Some("api".to_string()),
                port: NODE_PORT,
                target_port: Some(IntOrString::String("api".to_string())),
                protocol: Some("TCP".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// In-cluster DNS endpoint of a cluster's Service
pub fn service_endpoint(cluster: &Cluster) -> String {
    format!(
        "{}.{}.svc.cluster.local:{}",
        cluster.name_any(),
        cluster.namespace().unwrap_or_default(),
        NODE_PORT
    )
}
