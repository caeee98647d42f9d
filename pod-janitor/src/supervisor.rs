use std::future::Future;

use rand::Rng;

use super::*;

/// Where the supervisory loop stands with respect to its error budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Backoff,
    Fatal,
}

/// Consecutive cycle failures against the configured limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorBudget {
    consecutive: u32,
    limit: u32,
}

impl ErrorBudget {
    pub fn new(limit: u32) -> Self {
        Self {
            consecutive: 0,
            limit,
        }
    }

    pub fn record_success(&mut self) -> LoopState {
        self.consecutive = 0;
        self.state()
    }

    pub fn record_failure(&mut self) -> LoopState {
        self.consecutive = self.consecutive.saturating_add(1);
        self.state()
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn state(&self) -> LoopState {
        if self.consecutive >= self.limit {
            LoopState::Fatal
        } else if self.consecutive > 0 {
            LoopState::Backoff
        } else {
            LoopState::Running
        }
    }
}

/// What one cycle did.
///
/// Deletion counts cover objects actually removed, or that would have been
/// removed in dry-run mode; objects already gone are not counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub pods_deleted: usize,
    pub jobs_deleted: usize,
    pub expired_pool: usize,
    pub lifetime_evictions: usize,
}

impl CycleReport {
    fn record_status_deletion(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Pod => self.pods_deleted += 1,
            EntityKind::Job => self.jobs_deleted += 1,
        }
    }
}

/// Runs deletion cycles against a [`Cluster`] until interrupted or until the
/// error budget runs out.
#[derive(Debug)]
pub struct Supervisor<C, K, R> {
    cluster: C,
    config: Config,
    clock: K,
    rng: R,
}

impl<C, K, R> Supervisor<C, K, R>
where
    C: Cluster,
    K: Clock,
    R: Rng,
{
    pub fn new(cluster: C, config: Config, clock: K, rng: R) -> Self {
        Self {
            cluster,
            config,
            clock,
            rng,
        }
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loop until `shutdown` resolves or the error budget is exhausted.
    ///
    /// `shutdown` is only polled while sleeping between cycles, so a cycle
    /// always runs to completion or to its first error.
    pub async fn run<S>(&mut self, shutdown: S) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut budget = ErrorBudget::new(self.config.error_limit);

        loop {
            let (state, pause) = match self.run_cycle().await {
                Ok(_) => (budget.record_success(), self.config.interval),
                Err(err) => {
                    tracing::error!(%err, consecutive = budget.consecutive() + 1, "Cycle failed");
                    (budget.record_failure(), self.config.backoff())
                }
            };

            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested, exiting");
                    return Ok(());
                }
                () = tokio::time::sleep(pause) => {}
            }

            if state == LoopState::Fatal {
                let limit = budget.limit();
                tracing::error!(limit, "Too many errors when communicating with the control plane, stopping now");
                return Err(Error::ErrorBudgetExhausted { limit });
            }
        }
    }

    /// One full pass: status based deletions, then lifetime based evictions.
    ///
    /// The first cluster error abandons the rest of the cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, C::Error> {
        let now = self.clock.now();
        let mut report = CycleReport::default();

        for &kind in &self.config.kinds {
            let entities = self.cluster.list(kind, PhaseFilter::NotRunning).await?;
            for deletion in select_by_status(&entities, &self.config, now) {
                if self.execute(&deletion).await? {
                    report.record_status_deletion(kind);
                }
            }
        }

        if !self.config.quiet || report.pods_deleted > 0 || report.jobs_deleted > 0 {
            tracing::info!(
                "Deleted {} pods and {} jobs.",
                report.pods_deleted,
                report.jobs_deleted
            );
        }

        let mut pool = Vec::new();
        for &kind in &self.config.kinds {
            let entities = self.cluster.list(kind, PhaseFilter::Running).await?;
            pool.extend(expired_pool(&entities, &self.config, now));
        }
        report.expired_pool = pool.len();

        if !pool.is_empty() {
            let max_kills = self.config.lifetime_max_kills;
            if !self.config.quiet {
                tracing::info!(
                    expired = pool.len(),
                    max_kills,
                    "Found expired workloads, evicting a bounded number this cycle"
                );
            }
            for deletion in sample_evictions(pool, max_kills, &mut self.rng) {
                if self.execute(&deletion).await? {
                    report.lifetime_evictions += 1;
                }
            }
        }

        Ok(report)
    }

    /// Returns `false` when the entity was already gone.
    async fn execute(&self, deletion: &Deletion) -> Result<bool, C::Error> {
        let entity = &deletion.entity;
        let kind = entity.kind;
        let name = entity.name.as_str();
        let namespace = entity.namespace.as_str();

        if self.config.dry_run {
            tracing::info!(%kind, name, namespace, "[DRY RUN] Deleting {deletion}");
            return Ok(true);
        }

        tracing::info!(%kind, name, namespace, "Deleting {deletion}");
        let deleted = self.cluster.delete(entity).await?;
        if !deleted {
            tracing::debug!(%kind, name, namespace, "Already gone");
        }
        Ok(deleted)
    }
}
