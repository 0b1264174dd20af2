use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::app::actions::RefreshReason;
use crate::github::{FetchError, PullRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCycle {
    pub started_at: DateTime<Utc>,
    pub reason: RefreshReason,
}

impl RefreshCycle {
    pub fn begin(reason: RefreshReason) -> Self {
        Self {
            started_at: Utc::now(),
            reason,
        }
    }
}

/// One account's fetch that contributed nothing this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFailure {
    pub label: String,
    pub error: FetchError,
}

/// What the aggregator hands back for one cycle.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    pub pull_requests: Vec<PullRequest>,
    pub failures: Vec<AccountFailure>,
    pub accounts_queried: usize,
}

impl RefreshReport {
    /// True when accounts were queried and every one was rejected for auth.
    pub fn all_accounts_unauthorized(&self) -> bool {
        self.accounts_queried > 0
            && self.failures.len() == self.accounts_queried
            && self.failures.iter().all(|f| f.error.is_authentication())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// No cycle has finished yet.
    NotLoaded,
    /// No enabled account, or none with a working token.
    AccountsRequired,
    Ready,
}

/// Last known consolidated state. Immutable; each cycle publishes a new one.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub status: SnapshotStatus,
    pub pull_requests: Vec<PullRequest>,
    pub failures: Vec<AccountFailure>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn not_loaded() -> Self {
        Self {
            status: SnapshotStatus::NotLoaded,
            pull_requests: Vec::new(),
            failures: Vec::new(),
            refreshed_at: None,
        }
    }

    pub fn accounts_required(failures: Vec<AccountFailure>) -> Self {
        Self {
            status: SnapshotStatus::AccountsRequired,
            pull_requests: Vec::new(),
            failures,
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn from_report(report: RefreshReport) -> Self {
        if report.all_accounts_unauthorized() {
            return Self::accounts_required(report.failures);
        }
        Self {
            status: SnapshotStatus::Ready,
            pull_requests: report.pull_requests,
            failures: report.failures,
            refreshed_at: Some(Utc::now()),
        }
    }
}

/// Notifications delivered to the presentation layer.
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Completed {
        cycle: RefreshCycle,
        snapshot: Arc<Snapshot>,
    },
    AccountFailed(AccountFailure),
    AccountsRequired,
}
