//! Controller implementations for watching and reconciling resources

pub mod cluster_controller;

use kube::Client;
use std::sync::Arc;

use crate::config::OperatorConfig;
use crate::store::KubeStore;

/// Shared context for controllers
pub struct Context {
    /// Kubernetes client
    pub client: Client,
    /// Store used by reconcilers for every read and write
    pub store: KubeStore,
    /// Runtime configuration
    pub config: OperatorConfig,
}

impl Context {
    /// Create a new context
    pub fn new(client: Client, config: OperatorConfig) -> Arc<Self> {
        let store = KubeStore::new(client.clone(), config.field_manager.clone());
        Arc::new(Self {
            client,
            store,
            config,
        })
    }
}
