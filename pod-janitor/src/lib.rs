//! Expiration and deletion policy engine for K8s Pods and Jobs.
//!
//! Each cycle lists workload entities through a [`Cluster`], selects the ones
//! whose status or lifetime annotation marks them as expired and deletes them.
//! [`Supervisor`] drives the cycles and owns the consecutive-error budget.

use std::collections::BTreeMap;
use std::fmt;

use time::Duration;
use time::OffsetDateTime;

pub use candidate::expired_pool;
pub use candidate::sample_evictions;
pub use candidate::select_by_status;
pub use candidate::Cause;
pub use candidate::Deletion;
pub use clock::format_age;
pub use clock::parse_lifetime;
pub use clock::Clock;
pub use clock::FixedClock;
pub use clock::SystemClock;
pub use cluster::Cluster;
pub use cluster::PhaseFilter;
pub use config::Config;
pub use config::DEFAULT_ERROR_LIMIT;
pub use config::DEFAULT_GRACE_PERIOD_SECONDS;
pub use config::DEFAULT_INTERVAL;
pub use config::DEFAULT_LIFETIME_ANNOTATION;
pub use config::DEFAULT_LIFETIME_MAX_KILLS;
pub use entity::ContainerStatus;
pub use entity::EntityKind;
pub use entity::WorkloadEntity;
pub use error::Error;
pub use error::Result;
pub use guard::DeletionGuard;
pub use guard::Verdict;
pub use guard::SYSTEM_NAMESPACE;
pub use selector::StatusSelector;
pub use supervisor::CycleReport;
pub use supervisor::ErrorBudget;
pub use supervisor::LoopState;
pub use supervisor::Supervisor;
pub use termination::is_expired;
pub use termination::termination_time;

mod candidate;
mod clock;
mod cluster;
mod config;
mod entity;
mod error;
mod guard;
mod selector;
mod supervisor;
mod termination;

pub const PREEMPTING: &str = "Preempting";
