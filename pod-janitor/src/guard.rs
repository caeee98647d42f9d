use super::*;

pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// Safety policies that veto an otherwise eligible deletion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeletionGuard {
    /// Never touch entities in `kube-system`.
    pub user_only: bool,
    /// Never touch entities managed by a controller.
    pub skip_with_owner: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    SystemNamespace,
    HasOwner,
}

impl DeletionGuard {
    pub fn check(&self, entity: &WorkloadEntity) -> Verdict {
        if self.user_only && entity.namespace == SYSTEM_NAMESPACE {
            Verdict::SystemNamespace
        } else if self.skip_with_owner && !entity.owner_references.is_empty() {
            Verdict::HasOwner
        } else {
            Verdict::Allow
        }
    }

    pub fn permits(&self, entity: &WorkloadEntity) -> bool {
        self.check(entity) == Verdict::Allow
    }

    /// Like [`permits`](Self::permits), logging the skip unless `quiet`.
    pub(crate) fn admit(&self, entity: &WorkloadEntity, quiet: bool) -> bool {
        let verdict = self.check(entity);
        if !quiet {
            let name = entity.name.as_str();
            let namespace = entity.namespace.as_str();
            match verdict {
                Verdict::Allow => {}
                Verdict::SystemNamespace => {
                    tracing::info!(name, namespace, "Skipping system {}", entity.kind);
                }
                Verdict::HasOwner => {
                    tracing::info!(name, namespace, "Skipping {} with owner reference", entity.kind);
                }
            }
        }
        verdict == Verdict::Allow
    }
}
