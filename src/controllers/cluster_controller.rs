//! Controller for Cluster resources backed by CacheStorage

use futures::StreamExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    runtime::{
        controller::{Action, Controller},
        watcher::Config,
    },
    Api, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::adapters::cluster_config::build_cluster_config;
use crate::adapters::common::managed_by_selector;
use crate::adapters::service_builder::service_endpoint;
use crate::controllers::Context;
use crate::crd::Cluster;
use crate::metrics::prometheus::{
    OPERATOR_HEALTH, PARTITIONS_MARKED_READY, READY_PARTITIONS, RECONCILE_DURATION,
    RECONCILIATIONS, RECONCILIATION_ERRORS,
};
use crate::reconcilers::{cluster as reconciler, Propagation, ReadinessPropagator};
use crate::Error;

/// Run the cluster controller
pub async fn run(ctx: Arc<Context>) {
    let client = ctx.client.clone();
    let (clusters, deployments): (Api<Cluster>, Api<Deployment>) =
        match &ctx.config.watch_namespace {
            Some(ns) => (
                Api::namespaced(client.clone(), ns),
                Api::namespaced(client.clone(), ns),
            ),
            None => (Api::all(client.clone()), Api::all(client.clone())),
        };

    info!(
        "Starting Cluster controller (namespace: {})",
        ctx.config.watch_namespace.as_deref().unwrap_or("*")
    );

    Controller::new(clusters, Config::default().any_semantic())
        .owns(deployments, Config::default().labels(&managed_by_selector()))
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok(o) => debug!("Reconciled {:?}", o),
                Err(e) => error!("Reconcile failed: {:?}", e),
            }
        })
        .await;

    OPERATOR_HEALTH.set(0.0);
    info!("Cluster controller stopped");
}

/// Reconcile a Cluster resource
#[instrument(skip(cluster, ctx), fields(name = %cluster.name_any(), namespace = cluster.namespace().unwrap_or_default()))]
async fn reconcile(cluster: Arc<Cluster>, ctx: Arc<Context>) -> Result<Action, Error> {
    let start = std::time::Instant::now();
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    RECONCILIATIONS.with_label_values(&["Cluster"]).inc();

    let result = apply(&cluster, &ctx).await;

    let duration = start.elapsed().as_secs_f64();
    RECONCILE_DURATION
        .with_label_values(&["Cluster"])
        .observe(duration);

    match &result {
        Ok(_) => info!("Successfully reconciled {}/{} in {:.2}s", ns, name, duration),
        Err(e) => {
            RECONCILIATION_ERRORS.with_label_values(&["Cluster"]).inc();
            error!("Failed to reconcile {}/{}: {:?}", ns, name, e);
        }
    }

    result
}

/// Provision the cluster's objects and propagate readiness
async fn apply(cluster: &Cluster, ctx: &Context) -> Result<Action, Error> {
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    if !cluster.spec.storage.is_cache_storage() {
        debug!(
            "Cluster {}/{} uses {}/{} storage, ignoring",
            ns, name, cluster.spec.storage.group, cluster.spec.storage.kind
        );
        return Ok(Action::await_change());
    }

    info!("Applying Cluster {}/{}", ns, name);

    reconciler::validate(cluster)?;

    let Some(storage) = reconciler::get_storage(cluster, &ctx.store).await? else {
        return Ok(Action::await_change());
    };

    let config = build_cluster_config(cluster)?;

    reconciler::reconcile_config_map(cluster, &ctx.store, &config).await?;
    reconciler::reconcile_deployment(cluster, &storage, &ctx.store, &config).await?;
    reconciler::reconcile_service(cluster, &ctx.store).await?;

    let outcome = ReadinessPropagator::new(&ctx.store)
        .propagate(cluster)
        .await?;

    match outcome {
        Propagation::Advanced {
            partitions_marked,
            ready_partitions,
        } => {
            PARTITIONS_MARKED_READY
                .with_label_values(&[ns.as_str(), name.as_str()])
                .inc_by(partitions_marked as f64);
            READY_PARTITIONS
                .with_label_values(&[ns.as_str(), name.as_str()])
                .set(f64::from(ready_partitions));
            info!(
                "Cluster {}/{} ready at {} ({} partitions)",
                ns,
                name,
                service_endpoint(cluster),
                ready_partitions
            );
            Ok(Action::await_change())
        }
        Propagation::AlreadyReady => {
            READY_PARTITIONS
                .with_label_values(&[ns.as_str(), name.as_str()])
                .set(f64::from(cluster.ready_partitions()));
            Ok(Action::await_change())
        }
        // Deployment creation and rollout events arrive through the owner
        // relation; the requeue covers missed watch events.
        Propagation::DeploymentMissing | Propagation::RollingOut { .. } => {
            Ok(Action::requeue(ctx.config.requeue_interval))
        }
    }
}

/// Error policy for the controller
fn error_policy(cluster: Arc<Cluster>, err: &Error, _ctx: Arc<Context>) -> Action {
    let ns = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();

    error!("Reconciliation error for {}/{}: {:?}", ns, name, err);

    match err {
        e if e.is_transient() => Action::requeue(Duration::from_secs(30)),
        Error::ConfigError(_) | Error::ValidationError(_) => {
            Action::requeue(Duration::from_secs(300))
        }
        _ => Action::requeue(Duration::from_secs(60)),
    }
}
