use std::collections::BTreeMap;
use std::time::Duration;

use clap::Parser;
use pod_janitor::Config;
use pod_janitor::DeletionGuard;
use pod_janitor::EntityKind;
use pod_janitor::StatusSelector;

#[derive(Debug, Parser)]
#[command(name = "pod-janitor")]
#[command(version, about = "Delete expired Pods and Jobs")]
pub(crate) struct Args {
    /// Limit the scope to a single namespace [default: all namespaces]
    #[arg(short, long)]
    pub(crate) namespace: Option<String>,

    /// Limit the scope to user namespaces and exclude kube-system objects
    #[arg(short, long)]
    user: bool,

    /// Time in seconds to wait before deleting a Pod or Job
    #[arg(short = 'g', long = "graceperiod", default_value_t = pod_janitor::DEFAULT_GRACE_PERIOD_SECONDS)]
    grace_period: u64,

    /// Delete only Pods and Jobs that meet the label selector, a JSON object
    #[arg(short, long, default_value = "{}", value_parser = parse_labels)]
    pub(crate) label_selector: BTreeMap<String, String>,

    /// Skip deletion of objects which currently have an owner reference
    #[arg(long)]
    skip_with_owner: bool,

    /// Annotation holding the maximum lifetime of a running Pod
    #[arg(long, default_value = pod_janitor::DEFAULT_LIFETIME_ANNOTATION)]
    lifetime_annotation: String,

    /// Maximum number of objects to evict in one run due to expired lifetime
    #[arg(long, default_value_t = pod_janitor::DEFAULT_LIFETIME_MAX_KILLS)]
    lifetime_max_kills: usize,

    /// Only log when actually deleting something
    #[arg(long)]
    quiet: bool,

    /// Time in seconds to wait between two runs
    #[arg(long, default_value_t = pod_janitor::DEFAULT_INTERVAL.as_secs())]
    interval: u64,

    /// How many consecutive errors are allowed before exiting
    #[arg(long, default_value_t = pod_janitor::DEFAULT_ERROR_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
    error_limit: u32,

    /// Log only, do not delete anything
    #[arg(long)]
    dry_run: bool,

    /// Also clean up Jobs
    #[arg(long)]
    jobs: bool,

    /// Statuses of Pods and Jobs to consider for deletion, as phase[:reason]
    #[arg(required = true)]
    status: Vec<StatusSelector>,
}

impl Args {
    pub(crate) fn config(&self) -> Config {
        let mut kinds = vec![EntityKind::Pod];
        if self.jobs {
            kinds.push(EntityKind::Job);
        }
        Config {
            kinds,
            selectors: self.status.clone(),
            grace_period_seconds: self.grace_period,
            guard: DeletionGuard {
                user_only: self.user,
                skip_with_owner: self.skip_with_owner,
            },
            lifetime_annotation: self.lifetime_annotation.clone(),
            lifetime_max_kills: self.lifetime_max_kills,
            quiet: self.quiet,
            dry_run: self.dry_run,
            interval: Duration::from_secs(self.interval),
            error_limit: self.error_limit,
        }
    }
}

fn parse_labels(text: &str) -> Result<BTreeMap<String, String>, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("pod-janitor").chain(args.iter().copied()))
    }

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = parse(&["Failed:Shutdown", "Succeeded"]).unwrap();
        assert_eq!(args.namespace, None);
        assert!(args.label_selector.is_empty());

        let config = args.config();
        assert_eq!(config.kinds, [EntityKind::Pod]);
        assert_eq!(config.selectors.len(), 2);
        assert_eq!(config.selectors[0].reason(), Some("Shutdown"));
        assert_eq!(config.grace_period_seconds, 300);
        assert_eq!(config.guard, DeletionGuard::default());
        assert_eq!(config.lifetime_annotation, "pod.kubernetes.io/lifetime");
        assert_eq!(config.lifetime_max_kills, 1);
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.error_limit, 5);
        assert!(!config.quiet);
        assert!(!config.dry_run);
    }

    #[test]
    fn all_flags() {
        let args = parse(&[
            "-n",
            "batch",
            "-u",
            "-g",
            "600",
            "-l",
            r#"{"app": "etl"}"#,
            "--skip-with-owner",
            "--lifetime-annotation",
            "janitor.example.com/ttl",
            "--lifetime-max-kills",
            "3",
            "--quiet",
            "--interval",
            "30",
            "--error-limit",
            "2",
            "--dry-run",
            "--jobs",
            "Failed",
        ])
        .unwrap();
        assert_eq!(args.namespace.as_deref(), Some("batch"));
        assert_eq!(args.label_selector["app"], "etl");

        let config = args.config();
        assert_eq!(config.kinds, [EntityKind::Pod, EntityKind::Job]);
        assert_eq!(config.grace_period_seconds, 600);
        assert!(config.guard.user_only);
        assert!(config.guard.skip_with_owner);
        assert_eq!(config.lifetime_annotation, "janitor.example.com/ttl");
        assert_eq!(config.lifetime_max_kills, 3);
        assert!(config.quiet);
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.error_limit, 2);
        assert!(config.dry_run);
    }

    #[test]
    fn status_is_required() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn malformed_status_fails_fast() {
        assert!(parse(&["a:b:c"]).is_err());
    }

    #[test]
    fn label_selector_must_be_a_json_map() {
        assert!(parse(&["-l", "app=etl", "Failed"]).is_err());
        assert!(parse(&["-l", r#"{"replicas": 3}"#, "Failed"]).is_err());
    }

    #[test]
    fn error_limit_must_be_positive() {
        assert!(parse(&["--error-limit", "0", "Failed"]).is_err());
    }
}
