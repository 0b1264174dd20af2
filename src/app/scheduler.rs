//! Refresh scheduling with a single-flight guarantee.
//!
//! Every trigger (timer, manual, account change) goes through
//! [`SchedulerHandle::trigger_refresh`], which starts a cycle only when none
//! is in flight. A background loop owns the periodic timer and the
//! account-change debounce.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::accounts::CredentialStore;
use crate::app::actions::{Command, RefreshReason, TriggerOutcome};
use crate::app::aggregator::Aggregator;
use crate::app::state::{RefreshCycle, RefreshEvent, RefreshState, Snapshot, SnapshotStatus};
use crate::util::config::RefreshConfig;

pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);
pub const MAX_ACCOUNT_CHANGE_DEBOUNCE: Duration = Duration::from_secs(60 * 60);

const EVENT_CAPACITY: usize = 64;

/// Interval in seconds, raised to the 60 second floor and capped at one week.
pub fn clamp_interval(secs: u64) -> Duration {
    Duration::from_secs(secs).clamp(MIN_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL)
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub account_change_debounce: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            account_change_debounce: Duration::from_millis(1500),
        }
    }
}

impl From<&RefreshConfig> for SchedulerConfig {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            interval: clamp_interval(config.interval_secs),
            account_change_debounce: Duration::from_millis(config.account_change_debounce_ms)
                .min(MAX_ACCOUNT_CHANGE_DEBOUNCE),
        }
    }
}

struct Shared {
    store: Arc<dyn CredentialStore>,
    aggregator: Aggregator,
    in_flight: AtomicBool,
    snapshot: watch::Sender<Arc<Snapshot>>,
    events: broadcast::Sender<RefreshEvent>,
}

/// Clears the in-flight flag when the cycle ends, including by panic.
struct InFlightGuard(Arc<Shared>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

pub struct Scheduler;

impl Scheduler {
    /// Start the timer loop. Must be called inside a tokio runtime. The
    /// first timer tick fires one interval from now.
    pub fn spawn(
        config: SchedulerConfig,
        store: Arc<dyn CredentialStore>,
        aggregator: Aggregator,
    ) -> SchedulerHandle {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::not_loaded()));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let shared = Arc::new(Shared {
            store,
            aggregator,
            in_flight: AtomicBool::new(false),
            snapshot,
            events,
        });

        let (commands, rx) = mpsc::unbounded_channel();
        let interval = config
            .interval
            .clamp(MIN_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL);
        let debounce = config
            .account_change_debounce
            .min(MAX_ACCOUNT_CHANGE_DEBOUNCE);
        tokio::spawn(run_loop(Arc::clone(&shared), rx, interval, debounce));

        SchedulerHandle { shared, commands }
    }
}

#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
}

impl SchedulerHandle {
    pub fn trigger_refresh(&self, reason: RefreshReason) -> TriggerOutcome {
        start_cycle(&self.shared, reason)
    }

    /// Reschedule the periodic timer. Returns the interval actually used.
    pub fn set_refresh_interval_secs(&self, secs: u64) -> Duration {
        let interval = clamp_interval(secs);
        let _ = self.commands.send(Command::SetInterval(interval));
        interval
    }

    /// Request a refresh once account changes stop arriving for the
    /// debounce window.
    pub fn notify_accounts_changed(&self) {
        let _ = self.commands.send(Command::AccountsChanged);
    }

    pub fn state(&self) -> RefreshState {
        if self.shared.in_flight.load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Result of the last finished cycle. Never blocks on an in-flight one.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.shared.snapshot.borrow())
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.shared.snapshot.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.shared.events.subscribe()
    }

    /// Stop the timer loop. An in-flight cycle still runs to completion.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

fn start_cycle(shared: &Arc<Shared>, reason: RefreshReason) -> TriggerOutcome {
    if shared
        .in_flight
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        debug!(?reason, "Refresh already in flight, dropping trigger");
        return TriggerOutcome::Dropped;
    }

    let guard = InFlightGuard(Arc::clone(shared));
    tokio::spawn(run_cycle(guard, reason));
    TriggerOutcome::Started
}

async fn run_cycle(guard: InFlightGuard, reason: RefreshReason) {
    let shared = Arc::clone(&guard.0);
    let cycle = RefreshCycle::begin(reason);
    info!(?reason, "Refresh started");

    let accounts = shared.store.list_enabled_accounts();
    if accounts.is_empty() {
        shared
            .snapshot
            .send_replace(Arc::new(Snapshot::accounts_required(Vec::new())));
        drop(guard);
        info!("No enabled accounts");
        let _ = shared.events.send(RefreshEvent::AccountsRequired);
        return;
    }

    let report = shared.aggregator.refresh_all(&accounts).await;
    let failures = report.failures.clone();
    let snapshot = Arc::new(Snapshot::from_report(report));
    shared.snapshot.send_replace(Arc::clone(&snapshot));
    drop(guard);

    info!(
        count = snapshot.pull_requests.len(),
        failed = failures.len(),
        "Refresh complete"
    );
    for failure in failures {
        let _ = shared.events.send(RefreshEvent::AccountFailed(failure));
    }
    if snapshot.status == SnapshotStatus::AccountsRequired {
        let _ = shared.events.send(RefreshEvent::AccountsRequired);
    }
    let _ = shared.events.send(RefreshEvent::Completed { cycle, snapshot });
}

async fn run_loop(
    shared: Arc<Shared>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut interval: Duration,
    debounce: Duration,
) {
    let mut ticker = new_ticker(interval);
    let debounce_timer = tokio::time::sleep(debounce);
    tokio::pin!(debounce_timer);
    let mut debounce_armed = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                start_cycle(&shared, RefreshReason::Timer);
            }
            () = &mut debounce_timer, if debounce_armed => {
                debounce_armed = false;
                start_cycle(&shared, RefreshReason::AccountChanged);
            }
            cmd = commands.recv() => match cmd {
                Some(Command::SetInterval(next)) => {
                    if next != interval {
                        debug!(secs = next.as_secs(), "Rescheduling refresh timer");
                        interval = next;
                        ticker = new_ticker(interval);
                    }
                }
                Some(Command::AccountsChanged) => {
                    debounce_timer.as_mut().reset(deadline_after(debounce));
                    debounce_armed = true;
                }
                Some(Command::Shutdown) | None => break,
            },
        }
    }

    debug!("Scheduler loop stopped");
}

fn new_ticker(interval: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval_at(deadline_after(interval), interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// `now + after`, saturating at the cap instead of overflowing.
fn deadline_after(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after)
        .unwrap_or_else(|| now + MAX_REFRESH_INTERVAL)
}
