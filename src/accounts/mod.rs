//! Accounts and the credential store the refresh cycle reads from.

use std::fmt;
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::github::auth::resolve_token;
use crate::util::config::AccountConfig;

/// A GitHub token. Debug output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub label: String,
    pub token: Token,
    pub enabled: bool,
}

impl Account {
    pub fn new(label: impl Into<String>, token: Token) -> Self {
        Self {
            label: label.into(),
            token,
            enabled: true,
        }
    }
}

/// Source of credentials. Callers take a snapshot at the start of a cycle
/// and never observe later changes mid-cycle.
pub trait CredentialStore: Send + Sync {
    fn list_all_accounts(&self) -> Vec<Account>;

    fn list_enabled_accounts(&self) -> Vec<Account> {
        self.list_all_accounts()
            .into_iter()
            .filter(|a| a.enabled)
            .collect()
    }
}

/// In-memory, ordered credential store.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: RwLock<Vec<Account>>,
}

impl AccountRegistry {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    /// Build the registry from config entries. Accounts whose token cannot
    /// be resolved are kept but disabled.
    pub fn from_config(entries: &[AccountConfig]) -> Self {
        let accounts = entries
            .iter()
            .map(|entry| match resolve_token(entry) {
                Ok(token) => {
                    debug!(label = %entry.label, "Resolved account token");
                    Account {
                        label: entry.label.clone(),
                        token,
                        enabled: entry.enabled,
                    }
                }
                Err(e) => {
                    warn!(label = %entry.label, error = %e, "Disabling account without a token");
                    Account {
                        label: entry.label.clone(),
                        token: Token::new(""),
                        enabled: false,
                    }
                }
            })
            .collect();
        Self::new(accounts)
    }

    /// Insert an account, replacing any existing one with the same label.
    pub fn upsert(&self, account: Account) {
        let mut accounts = self.write();
        match accounts.iter_mut().find(|a| a.label == account.label) {
            Some(existing) => *existing = account,
            None => accounts.push(account),
        }
    }

    pub fn remove(&self, label: &str) -> bool {
        let mut accounts = self.write();
        let before = accounts.len();
        accounts.retain(|a| a.label != label);
        accounts.len() != before
    }

    /// Returns false when no account has that label. Enabling an account
    /// with an empty token is refused.
    pub fn set_enabled(&self, label: &str, enabled: bool) -> bool {
        let mut accounts = self.write();
        match accounts.iter_mut().find(|a| a.label == label) {
            Some(account) if enabled && account.token.is_empty() => false,
            Some(account) => {
                account.enabled = enabled;
                true
            }
            None => false,
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Account>> {
        self.accounts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for AccountRegistry {
    fn list_all_accounts(&self) -> Vec<Account> {
        self.accounts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
