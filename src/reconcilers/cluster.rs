//! Reconciliation logic for the objects owned by a Cluster

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use kube::ResourceExt;
use tracing::{debug, info};

use crate::adapters::cluster_config::ClusterConfig;
use crate::adapters::{config_map_builder, deployment_builder, service_builder};
use crate::crd::{CacheStorage, Cluster};
use crate::store::{ensure_exists, ResourceStore};
use crate::{Error, Result};

/// Validate a Cluster spec
pub fn validate(cluster: &Cluster) -> Result<()> {
    let spec = &cluster.spec;

    if spec.partitions < 1 {
        return Err(Error::ValidationError(
            "spec.partitions must be >= 1".to_string(),
        ));
    }

    if spec.storage.name.is_empty() {
        return Err(Error::ValidationError(
            "spec.storage.name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Look up the CacheStorage referenced by a Cluster
///
/// The storage namespace defaults to the cluster's own namespace.
pub async fn get_storage<S: ResourceStore>(
    cluster: &Cluster,
    store: &S,
) -> Result<Option<CacheStorage>> {
    let namespace = cluster
        .spec
        .storage
        .namespace
        .clone()
        .filter(|ns| !ns.is_empty())
        .or_else(|| cluster.namespace())
        .unwrap_or_default();

    let storage = store
        .get::<CacheStorage>(&namespace, &cluster.spec.storage.name)
        .await?;

    if storage.is_none() {
        debug!(
            "CacheStorage {}/{} for cluster {} not found",
            namespace,
            cluster.spec.storage.name,
            cluster.name_any()
        );
    }

    Ok(storage)
}

/// Ensure the ConfigMap holding the node configuration exists
pub async fn reconcile_config_map<S: ResourceStore>(
    cluster: &Cluster,
    store: &S,
    config: &ClusterConfig,
) -> Result<bool> {
    let namespace = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    let created = ensure_exists::<_, ConfigMap, _>(store, &namespace, &name, || {
        config_map_builder::build_config_map(cluster, config)
    })
    .await?;

    info!("Reconciled ConfigMap {}/{}", namespace, name);
    Ok(created)
}

/// Ensure the Deployment running the storage node exists
pub async fn reconcile_deployment<S: ResourceStore>(
    cluster: &Cluster,
    storage: &CacheStorage,
    store: &S,
    config: &ClusterConfig,
) -> Result<bool> {
    let namespace = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    let created = ensure_exists::<_, Deployment, _>(store, &namespace, &name, || {
        let config_hash = config.checksum()?;
        Ok(deployment_builder::build_deployment(
            cluster,
            storage,
            &config_hash,
        ))
    })
    .await?;

    info!("Reconciled Deployment {}/{}", namespace, name);
    Ok(created)
}

/// Ensure the Service fronting the storage node exists
pub async fn reconcile_service<S: ResourceStore>(cluster: &Cluster, store: &S) -> Result<bool> {
    let namespace = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    let created = ensure_exists::<_, Service, _>(store, &namespace, &name, || {
        Ok(service_builder::build_service(cluster))
    })
    .await?;

    info!("Reconciled Service {}/{}", namespace, name);
    Ok(created)
}
