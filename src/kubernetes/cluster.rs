use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, PersistentVolumeClaim, Pod, Secret, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::serde::de::DeserializeOwned;
use k8s_openapi::{Metadata, NamespaceResourceScope, Resource};
use kube::api::{Api, DeleteParams, ListParams, ObjectMeta};
use kube::{Client, ResourceExt};
use log::{debug, trace};

use crate::error::ClusterError;
use crate::kubernetes::resource::ResourceKind;

/// The cluster operations the reaper needs, and nothing more.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Cluster: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError>;

    async fn count_resources(
        &self,
        namespace: &str,
        kind: ResourceKind,
    ) -> Result<usize, ClusterError>;

    async fn delete_namespace(&self, namespace: &str) -> Result<(), ClusterError>;
}

/// Gives up on `call` once `timeout` has passed.
async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, ClusterError>
where
    F: Future<Output = Result<T, kube::Error>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| ClusterError::Timeout(timeout))?
        .map_err(ClusterError::from)
}

pub struct KubeCluster {
    client: Client,
    timeout: Duration,
}

impl KubeCluster {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    async fn count<
        K: Resource<Scope = NamespaceResourceScope>
            + Metadata<Ty = ObjectMeta>
            + DeserializeOwned
            + Clone
            + Debug,
    >(
        &self,
        namespace: &str,
    ) -> Result<usize, ClusterError> {
        let resources: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let objects = bounded(self.timeout, resources.list_metadata(&ListParams::default())).await?;
        trace!(
            "Got {} {} from the namespace {namespace}",
            objects.items.len(),
            K::KIND,
        );
        Ok(objects.items.len())
    }
}

#[async_trait]
impl Cluster for KubeCluster {
    async fn list_namespaces(&self) -> Result<Vec<String>, ClusterError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        let namespaces =
            bounded(self.timeout, namespaces.list_metadata(&ListParams::default())).await?;
        debug!("Got {} namespaces from the cluster.", namespaces.items.len());
        Ok(namespaces
            .items
            .into_iter()
            .map(|namespace| namespace.name_any())
            .collect())
    }

    async fn count_resources(
        &self,
        namespace: &str,
        kind: ResourceKind,
    ) -> Result<usize, ClusterError> {
        match kind {
            ResourceKind::Pods => self.count::<Pod>(namespace).await,
            ResourceKind::Services => self.count::<Service>(namespace).await,
            ResourceKind::ConfigMaps => self.count::<ConfigMap>(namespace).await,
            ResourceKind::Secrets => self.count::<Secret>(namespace).await,
            ResourceKind::Deployments => self.count::<Deployment>(namespace).await,
            ResourceKind::ReplicaSets => self.count::<ReplicaSet>(namespace).await,
            ResourceKind::StatefulSets => self.count::<StatefulSet>(namespace).await,
            ResourceKind::DaemonSets => self.count::<DaemonSet>(namespace).await,
            ResourceKind::Jobs => self.count::<Job>(namespace).await,
            ResourceKind::CronJobs => self.count::<CronJob>(namespace).await,
            ResourceKind::PersistentVolumeClaims => {
                self.count::<PersistentVolumeClaim>(namespace).await
            }
            ResourceKind::Ingresses => self.count::<Ingress>(namespace).await,
        }
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<(), ClusterError> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());
        bounded(self.timeout, namespaces.delete(namespace, &DeleteParams::default())).await?;
        Ok(())
    }
}
