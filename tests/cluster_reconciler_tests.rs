//! Integration tests for Cluster validation and owned-object provisioning
//!
//! These tests verify spec validation, storage lookup, and that the
//! ConfigMap, Deployment and Service are created exactly once and never
//! overwritten.

mod common;

use cache_storage_operator::adapters::cluster_config::build_cluster_config;
use cache_storage_operator::adapters::deployment_builder::CONFIG_CHECKSUM_ANNOTATION;
use cache_storage_operator::crd::{Cluster, StorageReference};
use cache_storage_operator::reconcilers::cluster as reconciler;
use cache_storage_operator::store::ensure_exists;
use cache_storage_operator::Error;
use common::{cache_storage, cluster, MemoryStore, Write, NAMESPACE};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use tokio_test::{assert_err, assert_ok};

fn create(kind: &str, name: &str) -> Write {
    Write::Create {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn valid_cluster_passes_validation() {
    let c = cluster("cache-1", 3, "1", 0);
    assert!(reconciler::validate(&c).is_ok());
}

#[test]
fn zero_partitions_fails_validation() {
    let c = cluster("cache-1", 0, "1", 0);
    let err = reconciler::validate(&c).unwrap_err();

    assert!(matches!(err, Error::ValidationError(_)));
    assert!(err.to_string().contains("partitions"));
}

#[test]
fn empty_storage_name_fails_validation() {
    let mut c = cluster("cache-1", 3, "1", 0);
    c.spec.storage.name = String::new();

    let err = reconciler::validate(&c).unwrap_err();
    assert!(err.to_string().contains("storage"));
}

#[test]
fn only_cache_storage_references_are_managed() {
    assert!(common::storage_reference().is_cache_storage());

    let raft = StorageReference {
        group: "storage.cloud.atomix.io".to_string(),
        version: "v1beta1".to_string(),
        kind: "RaftStorage".to_string(),
        namespace: None,
        name: "raft".to_string(),
    };
    assert!(!raft.is_cache_storage());
}

// ============================================================================
// Storage lookup
// ============================================================================

#[tokio::test]
async fn storage_defaults_to_cluster_namespace() {
    let store = MemoryStore::new();
    store.insert(cache_storage());
    let c = cluster("cache-1", 1, "1", 0);

    let storage = assert_ok!(reconciler::get_storage(&c, &store).await);
    assert!(storage.is_some());
}

#[tokio::test]
async fn storage_in_other_namespace_is_looked_up_there() {
    let store = MemoryStore::new();
    store.insert(cache_storage());
    let mut c = cluster("cache-1", 1, "1", 0);
    c.spec.storage.namespace = Some("atomix-system".to_string());

    let storage = assert_ok!(reconciler::get_storage(&c, &store).await);
    assert!(storage.is_none());
}

// ============================================================================
// Get-or-create
// ============================================================================

#[tokio::test]
async fn ensure_exists_creates_once() {
    let store = MemoryStore::new();
    let c = cluster("cache-1", 1, "1", 0);

    let created = assert_ok!(
        ensure_exists(&store, NAMESPACE, "cache-1", || Ok(
            cache_storage_operator::adapters::service_builder::build_service(&c)
        ))
        .await
    );
    assert!(created);

    let created_again = assert_ok!(
        ensure_exists::<_, Service, _>(&store, NAMESPACE, "cache-1", || {
            panic!("builder must not run for an existing object")
        })
        .await
    );
    assert!(!created_again);
    assert_eq!(store.writes(), vec![create("Service", "cache-1")]);
}

#[tokio::test]
async fn ensure_exists_propagates_builder_errors() {
    let store = MemoryStore::new();

    let err = assert_err!(
        ensure_exists::<_, ConfigMap, _>(&store, NAMESPACE, "cache-1", || {
            Err(Error::ConfigError("broken".to_string()))
        })
        .await
    );
    assert!(matches!(err, Error::ConfigError(_)));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn owned_objects_are_provisioned() {
    let store = MemoryStore::new();
    let c = cluster("cache-1", 2, "1", 0);
    let storage = cache_storage();
    let config = assert_ok!(build_cluster_config(&c));

    assert!(assert_ok!(
        reconciler::reconcile_config_map(&c, &store, &config).await
    ));
    assert!(assert_ok!(
        reconciler::reconcile_deployment(&c, &storage, &store, &config).await
    ));
    assert!(assert_ok!(reconciler::reconcile_service(&c, &store).await));

    assert_eq!(
        store.writes(),
        vec![
            create("ConfigMap", "cache-1"),
            create("Deployment", "cache-1"),
            create("Service", "cache-1"),
        ]
    );

    let deployment = store.fetch::<Deployment>("cache-1").unwrap();
    let pod = deployment.spec.unwrap().template.spec.unwrap();
    assert_eq!(
        pod.containers[0].image.as_deref(),
        Some("atomix/cache-storage-node:v0.4.0")
    );
}

#[tokio::test]
async fn existing_objects_are_not_overwritten() {
    let store = MemoryStore::new();
    let c = cluster("cache-1", 2, "1", 0);
    let storage = cache_storage();
    let config = assert_ok!(build_cluster_config(&c));

    store.insert(ConfigMap {
        metadata: common::metadata("cache-1"),
        ..Default::default()
    });

    let created = assert_ok!(reconciler::reconcile_config_map(&c, &store, &config).await);
    assert!(!created);
    assert!(store.fetch::<ConfigMap>("cache-1").unwrap().data.is_none());

    assert_ok!(reconciler::reconcile_deployment(&c, &storage, &store, &config).await);
    assert_ok!(reconciler::reconcile_deployment(&c, &storage, &store, &config).await);
    assert_eq!(store.writes(), vec![create("Deployment", "cache-1")]);
}

#[tokio::test]
async fn deployment_keeps_checksum_of_creation_config() {
    let store = MemoryStore::new();
    let storage = cache_storage();
    let original = cluster("cache-1", 2, "1", 0);
    let original_config = assert_ok!(build_cluster_config(&original));
    assert_ok!(reconciler::reconcile_deployment(&original, &storage, &store, &original_config).await);

    let resized = cluster("cache-1", 4, "1", 0);
    let resized_config = assert_ok!(build_cluster_config(&resized));
    assert_ok!(reconciler::reconcile_deployment(&resized, &storage, &store, &resized_config).await);

    let annotations = store
        .fetch::<Deployment>("cache-1")
        .unwrap()
        .spec
        .unwrap()
        .template
        .metadata
        .unwrap()
        .annotations
        .unwrap();
    assert_eq!(
        annotations[CONFIG_CHECKSUM_ANNOTATION],
        original_config.checksum().unwrap()
    );
    assert_ne!(
        annotations[CONFIG_CHECKSUM_ANNOTATION],
        resized_config.checksum().unwrap()
    );
}

#[test]
fn config_map_needs_shard_annotation() {
    let mut c: Cluster = cluster("cache-1", 2, "1", 0);
    c.metadata.annotations = None;

    let err = assert_err!(build_cluster_config(&c));
    assert!(matches!(err, Error::ConfigError(_)));
}
