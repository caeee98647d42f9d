pub use k8s_openapi as openapi;
pub use k8s_openapi::api::batch::v1 as batchv1;
pub use k8s_openapi::api::core::v1 as corev1;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

pub use timestamp::parse_rfc3339;
pub use timestamp::TimeExt;

mod timestamp;

pub const POD_PHASE_RUNNING: &str = "Running";
pub const POD_PHASE_SUCCEEDED: &str = "Succeeded";
pub const POD_PHASE_FAILED: &str = "Failed";

pub trait PodExt {
    fn phase(&self) -> Option<&str>;
    fn reason(&self) -> Option<&str>;
    /// Init container statuses followed by regular container statuses.
    fn all_container_statuses(&self) -> Vec<&corev1::ContainerStatus>;
}

impl PodExt for corev1::Pod {
    fn phase(&self) -> Option<&str> {
        self.status.as_ref()?.phase.as_deref()
    }

    fn reason(&self) -> Option<&str> {
        self.status.as_ref()?.reason.as_deref()
    }

    fn all_container_statuses(&self) -> Vec<&corev1::ContainerStatus> {
        let Some(status) = self.status.as_ref() else {
            return Vec::new();
        };
        status
            .init_container_statuses
            .iter()
            .flatten()
            .chain(status.container_statuses.iter().flatten())
            .collect()
    }
}

pub trait ContainerStatusExt {
    /// `state.terminated.finishedAt`
    fn finished_at(&self) -> Option<time::OffsetDateTime>;
    /// `lastState.terminated.finishedAt`
    fn last_finished_at(&self) -> Option<time::OffsetDateTime>;
}

impl ContainerStatusExt for corev1::ContainerStatus {
    fn finished_at(&self) -> Option<time::OffsetDateTime> {
        terminated_at(self.state.as_ref())
    }

    fn last_finished_at(&self) -> Option<time::OffsetDateTime> {
        terminated_at(self.last_state.as_ref())
    }
}

fn terminated_at(state: Option<&corev1::ContainerState>) -> Option<time::OffsetDateTime> {
    state?
        .terminated
        .as_ref()?
        .finished_at
        .as_ref()?
        .to_offset_date_time()
}

/// Jobs carry no phase of their own; it is derived from the job conditions
/// so that Jobs and Pods can be matched by the same `phase[:reason]` rules.
pub trait JobExt {
    fn phase(&self) -> &'static str;
    fn reason(&self) -> Option<&str>;
    fn finished_at(&self) -> Option<time::OffsetDateTime>;
}

impl JobExt for batchv1::Job {
    fn phase(&self) -> &'static str {
        if condition(self, "Failed").is_some() {
            POD_PHASE_FAILED
        } else if condition(self, "Complete").is_some() {
            POD_PHASE_SUCCEEDED
        } else {
            POD_PHASE_RUNNING
        }
    }

    fn reason(&self) -> Option<&str> {
        condition(self, "Failed")
            .or_else(|| condition(self, "Complete"))?
            .reason
            .as_deref()
    }

    fn finished_at(&self) -> Option<time::OffsetDateTime> {
        let status = self.status.as_ref()?;
        status
            .completion_time
            .as_ref()
            .or_else(|| condition(self, "Failed")?.last_transition_time.as_ref())?
            .to_offset_date_time()
    }
}

fn condition<'a>(job: &'a batchv1::Job, type_: &str) -> Option<&'a batchv1::JobCondition> {
    job.status
        .as_ref()?
        .conditions
        .as_ref()?
        .iter()
        .find(|condition| condition.type_ == type_ && condition.status == "True")
}
