use super::*;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid status selector {0:?}, expected phase[:reason]")]
    InvalidSelector(String),

    #[error("Invalid lifetime {value:?}: {reason}")]
    InvalidLifetime { value: String, reason: String },

    #[error("{kind} {name} in namespace {namespace} has no creation timestamp")]
    MissingTimestamp {
        kind: EntityKind,
        name: String,
        namespace: String,
    },

    #[error("Too many errors ({limit}) when communicating with the control plane")]
    ErrorBudgetExhausted { limit: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn missing_timestamp(entity: &WorkloadEntity) -> Self {
        Self::MissingTimestamp {
            kind: entity.kind,
            name: entity.name.clone(),
            namespace: entity.namespace.clone(),
        }
    }
}
