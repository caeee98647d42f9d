use super::*;

pub use lifetime::expired_pool;
pub use lifetime::sample_evictions;

mod lifetime;

/// Why an entity was selected for deletion.
#[derive(Clone, Debug, PartialEq)]
pub enum Cause {
    /// Preempted entities carry no usable container status and go at once.
    Preempted,
    /// Matched a status selector and outlived the grace period.
    Status { age_seconds: u64 },
    /// Running past the lifetime in its annotation.
    Lifetime { age: Duration, lifetime: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Deletion {
    pub entity: WorkloadEntity,
    pub cause: Cause,
}

impl Deletion {
    fn new(entity: &WorkloadEntity, cause: Cause) -> Self {
        Self {
            entity: entity.clone(),
            cause,
        }
    }
}

impl fmt::Display for Deletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entity = &self.entity;
        write!(
            f,
            "{} {} in namespace {} because ",
            entity.kind, entity.name, entity.namespace
        )?;
        match &self.cause {
            Cause::Preempted => f.write_str("it is being preempted"),
            Cause::Status { age_seconds } => {
                write!(f, "of {}", entity.phase)?;
                if let Some(reason) = &entity.reason {
                    write!(f, " ({reason})")?;
                }
                write!(f, " status and age {age_seconds}s")
            }
            Cause::Lifetime { age, lifetime } => write!(
                f,
                "its age of {} exceeds the maximum age of {lifetime}",
                format_age(*age)
            ),
        }
    }
}

/// Status based pass over entities that are not running.
///
/// Deletions come out in listing order, at most one per entity however many
/// selectors it matches.
pub fn select_by_status(
    entities: &[WorkloadEntity],
    config: &Config,
    now: OffsetDateTime,
) -> Vec<Deletion> {
    entities
        .iter()
        .filter(|entity| !entity.is_running())
        .filter_map(|entity| status_deletion(entity, config, now))
        .collect()
}

fn status_deletion(entity: &WorkloadEntity, config: &Config, now: OffsetDateTime) -> Option<Deletion> {
    if entity.reason.as_deref() == Some(PREEMPTING) {
        return Some(Deletion::new(entity, Cause::Preempted));
    }

    if !config
        .selectors
        .iter()
        .any(|selector| selector.matches_entity(entity))
    {
        return None;
    }

    if !config.guard.admit(entity, config.quiet) {
        return None;
    }

    match is_expired(entity, config.grace_period_seconds, now) {
        Ok(age) => age.map(|age_seconds| Deletion::new(entity, Cause::Status { age_seconds })),
        Err(err) => {
            tracing::warn!(%err, "Skipping {}", entity.kind);
            None
        }
    }
}

#[cfg(test)]
mod tests;
