use kube::ResourceExt as _;
use pod_janitor_ext as k8s;

use k8s::batchv1;
use k8s::corev1;
use k8s::metav1;
use k8s::ContainerStatusExt as _;
use k8s::JobExt as _;
use k8s::PodExt as _;
use k8s::TimeExt as _;

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Pod,
    Job,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pod => f.write_str("Pod"),
            Self::Job => f.write_str("Job"),
        }
    }
}

/// Termination record of a single container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerStatus {
    /// When the current container instance terminated.
    pub terminated_at: Option<OffsetDateTime>,
    /// When the previous container instance terminated.
    pub last_terminated_at: Option<OffsetDateTime>,
}

impl ContainerStatus {
    pub fn terminated(at: OffsetDateTime) -> Self {
        Self {
            terminated_at: Some(at),
            last_terminated_at: None,
        }
    }

    /// The termination time this status reports, if any.
    pub fn finished_at(&self) -> Option<OffsetDateTime> {
        self.terminated_at.or(self.last_terminated_at)
    }
}

/// Read-only snapshot of a Pod or Job as seen by one cycle.
///
/// Jobs report no container statuses; their completion (or failure) time is
/// carried as a single [`ContainerStatus`].
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadEntity {
    pub kind: EntityKind,
    pub name: String,
    pub namespace: String,
    pub phase: String,
    pub reason: Option<String>,
    pub creation_timestamp: Option<OffsetDateTime>,
    /// Init containers first, then regular containers.
    pub container_statuses: Vec<ContainerStatus>,
    /// Owners as `Kind/name`.
    pub owner_references: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

impl WorkloadEntity {
    pub fn new(
        kind: EntityKind,
        name: impl ToString,
        namespace: impl ToString,
        phase: impl ToString,
    ) -> Self {
        Self {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
            phase: phase.to_string(),
            reason: None,
            creation_timestamp: None,
            container_statuses: Vec::new(),
            owner_references: Vec::new(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    pub fn pod(name: impl ToString, namespace: impl ToString, phase: impl ToString) -> Self {
        Self::new(EntityKind::Pod, name, namespace, phase)
    }

    pub fn with_reason(self, reason: impl ToString) -> Self {
        Self {
            reason: Some(reason.to_string()),
            ..self
        }
    }

    pub fn created(self, ts: impl Into<Option<OffsetDateTime>>) -> Self {
        Self {
            creation_timestamp: ts.into(),
            ..self
        }
    }

    pub fn with_container_status(mut self, status: ContainerStatus) -> Self {
        self.container_statuses.push(status);
        self
    }

    pub fn owned_by(mut self, owner: impl ToString) -> Self {
        self.owner_references.push(owner.to_string());
        self
    }

    pub fn labelled(mut self, key: impl ToString, value: impl ToString) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn annotated(mut self, key: impl ToString, value: impl ToString) -> Self {
        self.annotations.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_running(&self) -> bool {
        self.phase == k8s::POD_PHASE_RUNNING
    }
}

impl From<&corev1::Pod> for WorkloadEntity {
    fn from(pod: &corev1::Pod) -> Self {
        let container_statuses = pod
            .all_container_statuses()
            .into_iter()
            .map(|status| ContainerStatus {
                terminated_at: status.finished_at(),
                last_terminated_at: status.last_finished_at(),
            })
            .collect();
        Self {
            kind: EntityKind::Pod,
            name: pod.name_any(),
            namespace: pod.namespace().unwrap_or_default(),
            phase: pod.phase().unwrap_or_default().to_string(),
            reason: pod.reason().map(ToString::to_string),
            creation_timestamp: created_at(&pod.metadata),
            container_statuses,
            owner_references: owners(pod.owner_references()),
            labels: pod.labels().clone(),
            annotations: pod.annotations().clone(),
        }
    }
}

impl From<&batchv1::Job> for WorkloadEntity {
    fn from(job: &batchv1::Job) -> Self {
        let container_statuses = job
            .finished_at()
            .map(ContainerStatus::terminated)
            .into_iter()
            .collect();
        Self {
            kind: EntityKind::Job,
            name: job.name_any(),
            namespace: job.namespace().unwrap_or_default(),
            phase: job.phase().to_string(),
            reason: job.reason().map(ToString::to_string),
            creation_timestamp: created_at(&job.metadata),
            container_statuses,
            owner_references: owners(job.owner_references()),
            labels: job.labels().clone(),
            annotations: job.annotations().clone(),
        }
    }
}

fn created_at(meta: &metav1::ObjectMeta) -> Option<OffsetDateTime> {
    meta.creation_timestamp
        .as_ref()
        .and_then(|ts| ts.to_offset_date_time())
}

fn owners(references: &[metav1::OwnerReference]) -> Vec<String> {
    references
        .iter()
        .map(|owner| format!("{}/{}", owner.kind, owner.name))
        .collect()
}
