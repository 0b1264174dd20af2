use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Why a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshReason {
    Manual,
    Timer,
    AccountChanged,
}

/// Result of asking for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    /// A cycle was already in flight; the request was dropped.
    Dropped,
}

/// Messages from a [`SchedulerHandle`](super::scheduler::SchedulerHandle) to
/// the timer loop.
#[derive(Debug)]
pub(crate) enum Command {
    SetInterval(Duration),
    AccountsChanged,
    Shutdown,
}
