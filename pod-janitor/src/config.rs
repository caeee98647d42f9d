use std::time::Duration as StdDuration;

use super::*;

pub const DEFAULT_GRACE_PERIOD_SECONDS: u64 = 300;
pub const DEFAULT_LIFETIME_ANNOTATION: &str = "pod.kubernetes.io/lifetime";
pub const DEFAULT_LIFETIME_MAX_KILLS: usize = 1;
pub const DEFAULT_INTERVAL: StdDuration = StdDuration::from_secs(60);
pub const DEFAULT_ERROR_LIMIT: u32 = 5;

/// Operator supplied policy, fixed for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct Config {
    /// Entity kinds both passes run over.
    pub kinds: Vec<EntityKind>,
    pub selectors: Vec<StatusSelector>,
    pub grace_period_seconds: u64,
    pub guard: DeletionGuard,
    pub lifetime_annotation: String,
    pub lifetime_max_kills: usize,
    pub quiet: bool,
    pub dry_run: bool,
    pub interval: StdDuration,
    pub error_limit: u32,
}

impl Config {
    pub fn new(selectors: Vec<StatusSelector>) -> Self {
        Self {
            kinds: vec![EntityKind::Pod],
            selectors,
            grace_period_seconds: DEFAULT_GRACE_PERIOD_SECONDS,
            guard: DeletionGuard::default(),
            lifetime_annotation: DEFAULT_LIFETIME_ANNOTATION.to_string(),
            lifetime_max_kills: DEFAULT_LIFETIME_MAX_KILLS,
            quiet: false,
            dry_run: false,
            interval: DEFAULT_INTERVAL,
            error_limit: DEFAULT_ERROR_LIMIT,
        }
    }

    /// Pause after a failed cycle, one and a half times the interval.
    pub fn backoff(&self) -> StdDuration {
        self.interval.mul_f64(1.5)
    }
}
