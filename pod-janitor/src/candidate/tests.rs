use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng as _;
use time::macros::datetime;

use super::*;

const NOW: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);
const LIFETIME: &str = DEFAULT_LIFETIME_ANNOTATION;

fn config(selectors: &[&str]) -> Config {
    let selectors = selectors
        .iter()
        .map(|text| text.parse().unwrap())
        .collect();
    Config::new(selectors)
}

fn terminated(name: &str, phase: &str, reason: &str, seconds_ago: i64) -> WorkloadEntity {
    WorkloadEntity::pod(name, "default", phase)
        .with_reason(reason)
        .created(NOW - Duration::hours(1))
        .with_container_status(ContainerStatus::terminated(NOW - Duration::seconds(seconds_ago)))
}

fn running(name: &str, lifetime: &str, age: Duration) -> WorkloadEntity {
    WorkloadEntity::pod(name, "default", "Running")
        .created(NOW - age)
        .annotated(LIFETIME, lifetime)
}

fn names(deletions: &[Deletion]) -> Vec<&str> {
    deletions.iter().map(|deletion| deletion.entity.name.as_str()).collect()
}

#[test]
fn matching_status_past_grace_period_is_deleted() {
    let entities = [terminated("batch-1", "Failed", "Shutdown", 400)];
    let deletions = select_by_status(&entities, &config(&["Failed:Shutdown"]), NOW);
    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].cause, Cause::Status { age_seconds: 400 });
    assert_eq!(
        deletions[0].to_string(),
        "Pod batch-1 in namespace default because of Failed (Shutdown) status and age 400s"
    );
}

#[test]
fn reason_mismatch_is_kept() {
    let entities = [terminated("batch-1", "Failed", "OOMKilled", 400)];
    let deletions = select_by_status(&entities, &config(&["Failed:Shutdown"]), NOW);
    assert!(deletions.is_empty());
}

#[test]
fn within_grace_period_is_kept() {
    let entities = [terminated("batch-1", "Failed", "Shutdown", 200)];
    assert!(select_by_status(&entities, &config(&["Failed"]), NOW).is_empty());

    let config = Config {
        grace_period_seconds: 100,
        ..config(&["Failed"])
    };
    assert_eq!(names(&select_by_status(&entities, &config, NOW)), ["batch-1"]);
}

#[test]
fn preempting_is_deleted_immediately() {
    let entity = WorkloadEntity::pod("victim", "default", "Failed")
        .with_reason(PREEMPTING)
        .created(NOW);
    let deletions = select_by_status(&[entity], &config(&["Succeeded"]), NOW);
    assert_eq!(deletions.len(), 1);
    assert_eq!(deletions[0].cause, Cause::Preempted);
}

#[test]
fn preempting_ignores_an_empty_selector_list() {
    let entity = WorkloadEntity::pod("victim", "default", "Pending").with_reason(PREEMPTING);
    let deletions = select_by_status(&[entity], &config(&[]), NOW);
    assert_eq!(names(&deletions), ["victim"]);
}

#[test]
fn multiple_matching_selectors_delete_once() {
    let entities = [terminated("batch-1", "Failed", "Shutdown", 400)];
    let deletions = select_by_status(&entities, &config(&["Failed", "Failed:Shutdown"]), NOW);
    assert_eq!(names(&deletions), ["batch-1"]);
}

#[test]
fn listing_order_is_kept() {
    let entities = [
        terminated("c", "Succeeded", "Completed", 900),
        terminated("a", "Failed", "Error", 900),
        terminated("keep", "Failed", "Error", 10),
        terminated("b", "Succeeded", "Completed", 900),
    ];
    let deletions = select_by_status(&entities, &config(&["Succeeded", "Failed"]), NOW);
    assert_eq!(names(&deletions), ["c", "a", "b"]);
}

#[test]
fn running_entities_are_not_status_candidates() {
    let entity = WorkloadEntity::pod("web", "default", "Running").created(NOW - Duration::days(1));
    assert!(select_by_status(&[entity], &config(&["Running"]), NOW).is_empty());
}

#[test]
fn guard_vetoes_status_deletion() {
    let system = WorkloadEntity {
        namespace: SYSTEM_NAMESPACE.to_string(),
        ..terminated("dns", "Failed", "Error", 900)
    };
    let owned = terminated("web", "Failed", "Error", 900).owned_by("ReplicaSet/web");
    let entities = [system, owned];

    let mut config = config(&["Failed"]);
    assert_eq!(select_by_status(&entities, &config, NOW).len(), 2);

    config.guard.user_only = true;
    assert_eq!(names(&select_by_status(&entities, &config, NOW)), ["web"]);

    config.guard.skip_with_owner = true;
    assert!(select_by_status(&entities, &config, NOW).is_empty());
}

#[test]
fn entity_without_time_is_skipped() {
    let broken = WorkloadEntity::pod("broken", "default", "Failed");
    let fine = terminated("fine", "Failed", "Error", 900);
    let deletions = select_by_status(&[broken, fine], &config(&["Failed"]), NOW);
    assert_eq!(names(&deletions), ["fine"]);
}

#[test]
fn expired_lifetime_joins_the_pool() {
    let entities = [
        running("old", "1h", Duration::hours(2)),
        running("young", "1h", Duration::minutes(30)),
        running("exact", "1h", Duration::hours(1)),
        WorkloadEntity::pod("plain", "default", "Running").created(NOW - Duration::days(3)),
    ];
    let pool = expired_pool(&entities, &config(&["Failed"]), NOW);
    assert_eq!(names(&pool), ["old"]);
    assert_eq!(
        pool[0].cause,
        Cause::Lifetime {
            age: Duration::hours(2),
            lifetime: "1h".to_string()
        }
    );
    assert_eq!(
        pool[0].to_string(),
        "Pod old in namespace default because its age of 2hrs exceeds the maximum age of 1h"
    );
}

#[test]
fn malformed_lifetime_is_skipped() {
    let entities = [
        running("bad", "a while", Duration::hours(2)),
        running("good", "90m", Duration::hours(2)),
    ];
    let pool = expired_pool(&entities, &config(&["Failed"]), NOW);
    assert_eq!(names(&pool), ["good"]);
}

#[test]
fn custom_annotation_key() {
    let entity = WorkloadEntity::pod("web", "default", "Running")
        .created(NOW - Duration::hours(2))
        .annotated("janitor.example.com/ttl", "1h");
    let default_key = config(&["Failed"]);
    assert!(expired_pool(std::slice::from_ref(&entity), &default_key, NOW).is_empty());

    let custom_key = Config {
        lifetime_annotation: "janitor.example.com/ttl".to_string(),
        ..config(&["Failed"])
    };
    assert_eq!(names(&expired_pool(&[entity], &custom_key, NOW)), ["web"]);
}

#[test]
fn lifetime_pass_only_covers_running() {
    let finished = WorkloadEntity {
        phase: "Succeeded".to_string(),
        ..running("done", "1h", Duration::hours(2))
    };
    assert!(expired_pool(&[finished], &config(&["Failed"]), NOW).is_empty());
}

#[test]
fn guard_vetoes_lifetime_eviction() {
    let entities = [running("web", "1h", Duration::hours(2)).owned_by("ReplicaSet/web")];
    let mut config = config(&["Failed"]);
    config.guard.skip_with_owner = true;
    assert!(expired_pool(&entities, &config, NOW).is_empty());
}

#[test]
fn lifetime_without_creation_is_skipped() {
    let entity = running("web", "1h", Duration::hours(2)).created(None::<OffsetDateTime>);
    assert!(expired_pool(&[entity], &config(&["Failed"]), NOW).is_empty());
}

fn pool(size: usize) -> Vec<Deletion> {
    let entities = (0..size)
        .map(|n| running(&format!("web-{n}"), "1h", Duration::hours(2)))
        .collect::<Vec<_>>();
    expired_pool(&entities, &config(&["Failed"]), NOW)
}

#[test]
fn one_of_three_is_evicted() {
    let mut rng = StdRng::seed_from_u64(7);
    let evicted = sample_evictions(pool(3), 1, &mut rng);
    assert_eq!(evicted.len(), 1);
}

#[test]
fn sample_size_is_capped_by_pool() {
    let mut rng = StdRng::seed_from_u64(7);
    for (size, max_kills, expected) in [(5, 2, 2), (2, 5, 2), (4, 4, 4), (3, 0, 0), (0, 3, 0)] {
        let evicted = sample_evictions(pool(size), max_kills, &mut rng);
        assert_eq!(evicted.len(), expected, "pool {size}, max {max_kills}");
        let distinct = names(&evicted).into_iter().collect::<BTreeSet<_>>();
        assert_eq!(distinct.len(), expected);
    }
}

#[test]
fn seeded_sampling_is_reproducible() {
    let first = sample_evictions(pool(10), 3, &mut StdRng::seed_from_u64(42));
    let second = sample_evictions(pool(10), 3, &mut StdRng::seed_from_u64(42));
    assert_eq!(first, second);
}

#[test]
fn sampling_varies_between_cycles() {
    let mut rng = StdRng::seed_from_u64(1);
    let chosen = (0..50)
        .map(|_| names(&sample_evictions(pool(5), 2, &mut rng)).join(","))
        .collect::<BTreeSet<_>>();
    assert!(chosen.len() > 1);
}
