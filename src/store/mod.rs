//! Resource store abstraction over the Kubernetes API
//!
//! Reconcilers talk to the cluster only through [`ResourceStore`], which
//! keeps the get-or-create and status propagation logic independent of the
//! transport and lets tests substitute an in-memory store.

mod kube_store;

pub use kube_store::KubeStore;

use std::fmt::Debug;

use async_trait::async_trait;
use kube::core::NamespaceResourceScope;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::metrics::prometheus::RESOURCES_CREATED;
use crate::Result;

/// Namespaced Kubernetes object the store can read and write
pub trait StoreObject:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
}

impl<K> StoreObject for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned
        + Serialize
        + Send
        + Sync
        + 'static
{
}

/// Read/create/status-update access to namespaced objects
///
/// Each call is independently atomic. Implementations perform no retries;
/// failures surface as [`crate::Error`] and the controller requeues.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Fetch an object, returning `None` when it does not exist
    async fn get<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<Option<K>>;

    /// Create an object in the namespace recorded in its metadata
    async fn create<K: StoreObject>(&self, object: &K) -> Result<()>;

    /// Replace the status subresource of an existing object
    async fn update_status<K: StoreObject>(&self, object: &K) -> Result<()>;
}

/// Create `namespace/name` from `build` unless it already exists
///
/// Existing objects are never modified. Returns `true` when the object was
/// created by this call.
pub async fn ensure_exists<S, K, F>(store: &S, namespace: &str, name: &str, build: F) -> Result<bool>
where
    S: ResourceStore,
    K: StoreObject,
    F: FnOnce() -> Result<K> + Send,
{
    if store.get::<K>(namespace, name).await?.is_some() {
        return Ok(false);
    }

    let kind = K::kind(&());
    info!("Creating {} {}/{}", kind, namespace, name);

    let object = build()?;
    store.create(&object).await?;

    RESOURCES_CREATED.with_label_values(&[kind.as_ref()]).inc();

    Ok(true)
}
