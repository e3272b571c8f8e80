//! Readiness propagation from a cluster's Deployment to its Partitions
//!
//! Once the Deployment backing a cluster shard is fully rolled out, every
//! Partition in the shard's ordinal range is marked ready, and then the
//! Cluster status records all of its partitions as ready. The Cluster write
//! is the commit point: it only happens after every partition write has
//! succeeded. Partition writes that landed before a failure stay in place,
//! which is safe because marking an already-ready partition is skipped.

use k8s_openapi::api::apps::v1::Deployment;
use kube::ResourceExt;
use tracing::{debug, info};

use crate::crd::{
    partition_name, partition_range, Cluster, ClusterStatus, Partition, PartitionStatus,
};
use crate::store::ResourceStore;
use crate::Result;

/// Result of one propagation pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Propagation {
    /// No Deployment exists for the cluster yet
    DeploymentMissing,
    /// The cluster already reports every partition ready
    AlreadyReady,
    /// The Deployment has not finished rolling out
    RollingOut { ready_replicas: i32, replicas: i32 },
    /// Partitions were marked ready and the cluster status advanced
    Advanced {
        partitions_marked: usize,
        ready_partitions: i32,
    },
}

/// Marks a cluster's partitions ready once its Deployment is available
pub struct ReadinessPropagator<'a, S> {
    store: &'a S,
}

impl<'a, S: ResourceStore> ReadinessPropagator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Run one propagation pass for `cluster`
    pub async fn propagate(&self, cluster: &Cluster) -> Result<Propagation> {
        let namespace = cluster.namespace().unwrap_or_default();
        let name = cluster.name_any();

        let Some(deployment) = self.store.get::<Deployment>(&namespace, &name).await? else {
            debug!("Deployment {}/{} not found, skipping status", namespace, name);
            return Ok(Propagation::DeploymentMissing);
        };

        let partitions = cluster.spec.partitions;
        if cluster.is_ready() {
            return Ok(Propagation::AlreadyReady);
        }

        let (ready_replicas, replicas) = rollout(&deployment);
        if ready_replicas != replicas {
            debug!(
                "Deployment {}/{} not available: {}/{} replicas ready",
                namespace, name, ready_replicas, replicas
            );
            return Ok(Propagation::RollingOut {
                ready_replicas,
                replicas,
            });
        }

        let cluster_id = cluster.cluster_id()?;
        let database = cluster.database()?;

        let mut partitions_marked = 0;
        for ordinal in partition_range(partitions, cluster_id)? {
            if self.mark_ready(&namespace, &partition_name(&database, ordinal)).await? {
                partitions_marked += 1;
            }
        }

        let mut updated = cluster.clone();
        updated
            .status
            .get_or_insert_with(ClusterStatus::default)
            .ready_partitions = partitions;

        info!(
            "Updating Cluster {}/{} status: readyPartitions={}",
            namespace, name, partitions
        );
        self.store.update_status(&updated).await?;

        Ok(Propagation::Advanced {
            partitions_marked,
            ready_partitions: partitions,
        })
    }

    /// Mark one partition ready; returns whether a write was made
    async fn mark_ready(&self, namespace: &str, name: &str) -> Result<bool> {
        let Some(mut partition) = self.store.get::<Partition>(namespace, name).await? else {
            debug!("Partition {}/{} not found, skipping", namespace, name);
            return Ok(false);
        };

        if partition.is_ready() {
            return Ok(false);
        }

        partition
            .status
            .get_or_insert_with(PartitionStatus::default)
            .ready = true;

        info!("Updating Partition {}/{} status: ready=true", namespace, name);
        self.store.update_status(&partition).await?;

        Ok(true)
    }
}

/// `(ready_replicas, replicas)` from a Deployment's status; absent counts are 0
pub fn rollout(deployment: &Deployment) -> (i32, i32) {
    deployment
        .status
        .as_ref()
        .map(|s| (s.ready_replicas.unwrap_or(0), s.replicas.unwrap_or(0)))
        .unwrap_or((0, 0))
}
