use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::accounts::Account;
use crate::app::state::{AccountFailure, RefreshReport};
use crate::github::{FetchError, PullRequest, PullRequestSource};

/// Fans one fetch out per enabled account and merges the results.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn PullRequestSource>,
    account_timeout: Option<Duration>,
}

impl Aggregator {
    pub fn new(source: Arc<dyn PullRequestSource>) -> Self {
        Self {
            source,
            account_timeout: None,
        }
    }

    /// Bound each account's fetch on top of the HTTP client timeout.
    pub fn with_account_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.account_timeout = timeout;
        self
    }

    pub async fn refresh_all(&self, accounts: &[Account]) -> RefreshReport {
        let enabled: Vec<&Account> = accounts.iter().filter(|a| a.enabled).collect();
        if enabled.is_empty() {
            debug!("No enabled accounts, skipping fetch");
            return RefreshReport::default();
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        for (index, account) in enabled.iter().enumerate() {
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            let token = account.token.clone();
            let label = account.label.clone();
            let timeout = self.account_timeout;

            tokio::spawn(async move {
                debug!(account = %label, "Fetching account");
                let fetch = source.fetch_for_account(&token);
                let result = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, fetch).await {
                        Ok(result) => result,
                        Err(_) => Err(FetchError::transport(format!(
                            "fetch timed out after {}s",
                            limit.as_secs()
                        ))),
                    },
                    None => fetch.await,
                };
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<Result<Vec<PullRequest>, FetchError>>> =
            vec![None; enabled.len()];
        while let Some((index, result)) = rx.recv().await {
            slots[index] = Some(result);
        }

        let mut collected = Vec::new();
        let mut failures = Vec::new();
        for (account, slot) in enabled.iter().zip(slots) {
            let result = slot.unwrap_or_else(|| {
                error!(account = %account.label, "Fetch task ended without a result");
                Err(FetchError::transport("fetch task aborted"))
            });
            match result {
                Ok(prs) => {
                    debug!(account = %account.label, count = prs.len(), "Account fetch complete");
                    collected.extend(
                        prs.into_iter()
                            .map(|pr| pr.with_account_label(&account.label)),
                    );
                }
                Err(error) => {
                    warn!(account = %account.label, error = %error, "Account fetch failed");
                    failures.push(AccountFailure {
                        label: account.label.clone(),
                        error,
                    });
                }
            }
        }

        let pull_requests = dedup(collected);
        debug!(
            count = pull_requests.len(),
            failed = failures.len(),
            "Refresh merged"
        );
        RefreshReport {
            pull_requests,
            failures,
            accounts_queried: enabled.len(),
        }
    }
}

/// Keep one record per url: the one with the lowest status rank, or the
/// first discovered on a tie. First-seen order is preserved.
pub fn dedup(records: Vec<PullRequest>) -> Vec<PullRequest> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<PullRequest> = Vec::new();

    for pr in records {
        match positions.get(&pr.url) {
            Some(&pos) => {
                if pr.status.rank() < kept[pos].status.rank() {
                    kept[pos] = pr;
                }
            }
            None => {
                positions.insert(pr.url.clone(), kept.len());
                kept.push(pr);
            }
        }
    }

    kept
}
