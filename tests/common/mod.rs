//! Shared fixtures and an in-memory resource store for integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cache_storage_operator::crd::{
    CacheStorage, CacheStorageSpec, Cluster, ClusterSpec, ClusterStatus, Partition,
    PartitionSpec, PartitionStatus, StorageReference, CLUSTER_ANNOTATION, DATABASE_ANNOTATION,
};
use cache_storage_operator::store::{ResourceStore, StoreObject};
use cache_storage_operator::{Error, Result};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::ResourceExt;

pub const NAMESPACE: &str = "default";
pub const DATABASE: &str = "cache";

/// A write performed against the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Write {
    Create { kind: String, name: String },
    UpdateStatus { kind: String, name: String },
}

type Key = (String, String, String);

/// In-memory store holding objects as JSON, keyed by (kind, namespace, name)
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<Key, serde_json::Value>>,
    writes: Mutex<Vec<Write>>,
    failing_status_updates: Mutex<Vec<String>>,
    failing_gets: Mutex<Vec<String>>,
}

fn key<K: StoreObject>(namespace: &str, name: &str) -> Key {
    (K::kind(&()).to_string(), namespace.to_string(), name.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without recording a write
    pub fn insert<K: StoreObject>(&self, object: K) -> &Self {
        let k = key::<K>(&object.namespace().unwrap_or_default(), &object.name_any());
        let value = serde_json::to_value(&object).expect("serialize fixture");
        self.objects.lock().unwrap().insert(k, value);
        self
    }

    pub fn fetch<K: StoreObject>(&self, name: &str) -> Option<K> {
        self.objects
            .lock()
            .unwrap()
            .get(&key::<K>(NAMESPACE, name))
            .map(|v| serde_json::from_value(v.clone()).expect("deserialize stored object"))
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    /// Make status updates of the named object fail with a transient error
    pub fn fail_status_update(&self, name: &str) {
        self.failing_status_updates
            .lock()
            .unwrap()
            .push(name.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_status_updates.lock().unwrap().clear();
        self.failing_gets.lock().unwrap().clear();
    }

    /// Make lookups of the named object fail with a transient error
    pub fn fail_get(&self, name: &str) {
        self.failing_gets.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn get<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        if self.failing_gets.lock().unwrap().iter().any(|n| n == name) {
            return Err(Error::KubeError(format!("injected get failure for {}", name)));
        }
        let value = self
            .objects
            .lock()
            .unwrap()
            .get(&key::<K>(namespace, name))
            .cloned();
        value
            .map(|v| serde_json::from_value(v).map_err(Error::from))
            .transpose()
    }

    async fn create<K: StoreObject>(&self, object: &K) -> Result<()> {
        let name = object.name_any();
        let k = key::<K>(&object.namespace().unwrap_or_default(), &name);
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&k) {
            return Err(Error::KubeError(format!("{} {} already exists", k.0, name)));
        }
        objects.insert(k.clone(), serde_json::to_value(object)?);
        self.writes.lock().unwrap().push(Write::Create { kind: k.0, name });
        Ok(())
    }

    async fn update_status<K: StoreObject>(&self, object: &K) -> Result<()> {
        let name = object.name_any();
        if self
            .failing_status_updates
            .lock()
            .unwrap()
            .iter()
            .any(|n| n == &name)
        {
            return Err(Error::KubeError(format!(
                "injected status update failure for {}",
                name
            )));
        }
        let k = key::<K>(&object.namespace().unwrap_or_default(), &name);
        let mut objects = self.objects.lock().unwrap();
        if !objects.contains_key(&k) {
            return Err(Error::NotFound(format!("{} {}", k.0, name)));
        }
        objects.insert(k.clone(), serde_json::to_value(object)?);
        self.writes
            .lock()
            .unwrap()
            .push(Write::UpdateStatus { kind: k.0, name });
        Ok(())
    }
}

pub fn metadata(name: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(NAMESPACE.to_string()),
        uid: Some(format!("{}-uid", name)),
        ..Default::default()
    }
}

pub fn storage_reference() -> StorageReference {
    StorageReference {
        group: "storage.cloud.atomix.io".to_string(),
        version: "v1beta1".to_string(),
        kind: "CacheStorage".to_string(),
        namespace: None,
        name: "cache-storage".to_string(),
    }
}

/// Cluster shard `cluster_id` with `partitions` partitions, `ready` of them ready
pub fn cluster(name: &str, partitions: i32, cluster_id: &str, ready: i32) -> Cluster {
    let mut meta = metadata(name);
    let mut annotations = BTreeMap::new();
    annotations.insert(CLUSTER_ANNOTATION.to_string(), cluster_id.to_string());
    annotations.insert(DATABASE_ANNOTATION.to_string(), DATABASE.to_string());
    meta.annotations = Some(annotations);

    Cluster {
        metadata: meta,
        spec: ClusterSpec {
            partitions,
            storage: storage_reference(),
        },
        status: Some(ClusterStatus {
            ready_partitions: ready,
        }),
    }
}

pub fn cache_storage() -> CacheStorage {
    CacheStorage {
        metadata: metadata("cache-storage"),
        spec: CacheStorageSpec {
            image: "atomix/cache-storage-node:v0.4.0".to_string(),
            image_pull_policy: Some("Always".to_string()),
        },
    }
}

pub fn deployment(name: &str, replicas: i32, ready_replicas: i32) -> Deployment {
    Deployment {
        metadata: metadata(name),
        status: Some(DeploymentStatus {
            replicas: Some(replicas),
            ready_replicas: Some(ready_replicas),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn partition(ordinal: i32, ready: bool) -> Partition {
    Partition {
        metadata: metadata(&format!("{}-{}", DATABASE, ordinal)),
        spec: PartitionSpec {
            partition_id: ordinal,
        },
        status: Some(PartitionStatus { ready }),
    }
}

pub fn status_update(kind: &str, name: &str) -> Write {
    Write::UpdateStatus {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}
