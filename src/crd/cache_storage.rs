//! CacheStorage Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the CacheStorage resource
pub const CACHE_STORAGE_GROUP: &str = "storage.cloud.atomix.io";

/// Kind of the CacheStorage resource
pub const CACHE_STORAGE_KIND: &str = "CacheStorage";

/// CacheStorage resource specification
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "storage.cloud.atomix.io",
    version = "v1beta1",
    kind = "CacheStorage",
    plural = "cachestorages",
    singular = "cachestorage",
    namespaced,
    printcolumn = r#"{"name": "Image", "type": "string", "jsonPath": ".spec.image"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CacheStorageSpec {
    /// Storage node image
    #[serde(default = "default_image")]
    pub image: String,

    /// Image pull policy (Always, IfNotPresent, Never)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<String>,
}

fn default_image() -> String {
    "atomix/cache-storage-node:latest".to_string()
}

impl Default for CacheStorageSpec {
    fn default() -> Self {
        Self {
            image: default_image(),
            image_pull_policy: None,
        }
    }
}
