use super::*;

/// When the last container of `entity` to finish, finished.
///
/// Returns `None` when no container reports a termination, e.g. for a Pod
/// that never got scheduled.
pub fn termination_time(entity: &WorkloadEntity) -> Option<OffsetDateTime> {
    entity
        .container_statuses
        .iter()
        .filter_map(ContainerStatus::finished_at)
        .max()
}

/// Seconds elapsed since `entity` terminated (or was created, when no
/// termination time is known), if that strictly exceeds `max_age_seconds`.
///
/// `Ok(None)` means "not expired". An entity with neither a termination time
/// nor a creation timestamp cannot be aged and yields an error.
pub fn is_expired(
    entity: &WorkloadEntity,
    max_age_seconds: u64,
    now: OffsetDateTime,
) -> Result<Option<u64>> {
    let since = termination_time(entity)
        .or(entity.creation_timestamp)
        .ok_or_else(|| Error::missing_timestamp(entity))?;
    let age = now - since;
    let max_age = Duration::seconds(i64::try_from(max_age_seconds).unwrap_or(i64::MAX));
    Ok((age > max_age).then(|| age.whole_seconds().unsigned_abs()))
}
