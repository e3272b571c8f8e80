//! [`ResourceStore`] backed by the Kubernetes API server

use async_trait::async_trait;
use kube::api::PostParams;
use kube::{Api, Client, ResourceExt};

use super::{ResourceStore, StoreObject};
use crate::{Error, Result};

/// Resource store talking to the API server through a [`kube::Client`]
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    field_manager: String,
}

impl KubeStore {
    /// Create a store that records `field_manager` on every write
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn api<K: StoreObject>(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    async fn get<K: StoreObject>(&self, namespace: &str, name: &str) -> Result<Option<K>> {
        self.api::<K>(namespace)
            .get_opt(name)
            .await
            .map_err(|e| store_error("get", &K::kind(&()), namespace, name, e))
    }

    async fn create<K: StoreObject>(&self, object: &K) -> Result<()> {
        let namespace = object.namespace().unwrap_or_default();
        let name = object.name_any();

        self.api::<K>(&namespace)
            .create(&self.post_params(), object)
            .await
            .map_err(|e| store_error("create", &K::kind(&()), &namespace, &name, e))?;

        Ok(())
    }

    async fn update_status<K: StoreObject>(&self, object: &K) -> Result<()> {
        let namespace = object.namespace().unwrap_or_default();
        let name = object.name_any();
        let data = serde_json::to_vec(object)?;

        self.api::<K>(&namespace)
            .replace_status(&name, &self.post_params(), data)
            .await
            .map_err(|e| store_error("update status of", &K::kind(&()), &namespace, &name, e))?;

        Ok(())
    }
}

fn store_error(action: &str, kind: &str, namespace: &str, name: &str, err: kube::Error) -> Error {
    match err {
        kube::Error::Api(ref response) if response.code == 404 => {
            Error::NotFound(format!("{} {}/{}", kind, namespace, name))
        }
        other => Error::KubeError(format!(
            "Failed to {} {} {}/{}: {}",
            action, kind, namespace, name, other
        )),
    }
}
