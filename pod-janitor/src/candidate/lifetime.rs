use rand::seq::SliceRandom as _;
use rand::Rng;

use super::*;

/// Annotation based pass: running entities whose lifetime annotation has
/// elapsed since creation.
pub fn expired_pool(
    entities: &[WorkloadEntity],
    config: &Config,
    now: OffsetDateTime,
) -> Vec<Deletion> {
    entities
        .iter()
        .filter(|entity| entity.is_running())
        .filter_map(|entity| lifetime_deletion(entity, config, now))
        .collect()
}

fn lifetime_deletion(
    entity: &WorkloadEntity,
    config: &Config,
    now: OffsetDateTime,
) -> Option<Deletion> {
    let annotation = config.lifetime_annotation.as_str();
    let value = entity.annotations.get(annotation)?;
    let name = entity.name.as_str();
    let namespace = entity.namespace.as_str();

    let lifetime = match parse_lifetime(value) {
        Ok(lifetime) => lifetime,
        Err(err) => {
            tracing::warn!(name, namespace, annotation, %err, "Cannot parse {} lifetime", entity.kind);
            return None;
        }
    };
    let Some(created) = entity.creation_timestamp else {
        let err = Error::missing_timestamp(entity);
        tracing::warn!(%err, "Skipping {}", entity.kind);
        return None;
    };

    let age = now - created;
    if age <= lifetime {
        return None;
    }

    if !config.quiet {
        tracing::info!(
            name,
            namespace,
            annotation,
            lifetime = %value,
            age = %format_age(age),
            "{} will be considered for termination",
            entity.kind
        );
    }

    config.guard.admit(entity, config.quiet).then(|| {
        let lifetime = value.clone();
        Deletion::new(entity, Cause::Lifetime { age, lifetime })
    })
}

/// Uniformly random subset of `pool` of size `min(pool.len(), max_kills)`,
/// in random order.
pub fn sample_evictions<R>(mut pool: Vec<Deletion>, max_kills: usize, rng: &mut R) -> Vec<Deletion>
where
    R: Rng + ?Sized,
{
    pool.shuffle(rng);
    pool.truncate(max_kills);
    pool
}
