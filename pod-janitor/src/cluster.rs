use std::future::Future;

use pod_janitor_kubeapi as kubeapi;

use kubeapi::KubeApi;

use super::*;

/// Which side of the `Running` phase a listing covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseFilter {
    Running,
    NotRunning,
}

impl PhaseFilter {
    pub fn field_selector(self) -> &'static str {
        match self {
            Self::Running => kubeapi::RUNNING,
            Self::NotRunning => kubeapi::NOT_RUNNING,
        }
    }

    /// Whether the listing is narrowed by the configured label selector.
    /// Lifetime evictions look at every running workload in the namespace.
    pub fn label_scoped(self) -> bool {
        self == Self::NotRunning
    }

    pub fn accepts(self, entity: &WorkloadEntity) -> bool {
        match self {
            Self::Running => entity.is_running(),
            Self::NotRunning => !entity.is_running(),
        }
    }
}

/// Query-and-delete access to the workloads in scope.
///
/// Namespace and label scoping belong to the implementation, with labels
/// applied only where [`PhaseFilter::label_scoped`] says so. Every error is
/// treated as transient by the caller.
pub trait Cluster {
    type Error: std::error::Error + Send + Sync + 'static;

    fn list(
        &self,
        kind: EntityKind,
        phase: PhaseFilter,
    ) -> impl Future<Output = Result<Vec<WorkloadEntity>, Self::Error>> + Send;

    /// Deletes `entity`, returning `false` if it was already gone.
    fn delete(
        &self,
        entity: &WorkloadEntity,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

impl Cluster for KubeApi {
    type Error = kube::Error;

    async fn list(&self, kind: EntityKind, phase: PhaseFilter) -> kube::Result<Vec<WorkloadEntity>> {
        let entities = match kind {
            EntityKind::Pod => self
                .list_pods(Some(phase.field_selector()), phase.label_scoped())
                .await?
                .iter()
                .map(WorkloadEntity::from)
                .collect(),
            EntityKind::Job => self
                .list_jobs(phase.label_scoped())
                .await?
                .iter()
                .map(WorkloadEntity::from)
                .filter(|entity| phase.accepts(entity))
                .collect(),
        };
        Ok(entities)
    }

    async fn delete(&self, entity: &WorkloadEntity) -> kube::Result<bool> {
        match entity.kind {
            EntityKind::Pod => self.delete_pod(&entity.name, &entity.namespace).await,
            EntityKind::Job => self.delete_job(&entity.name, &entity.namespace).await,
        }
    }
}
