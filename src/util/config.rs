use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
    /// Upper bound on one account's fetch; 0 disables it.
    #[serde(default = "default_account_timeout")]
    pub account_timeout_secs: u64,
    #[serde(default = "default_debounce_ms")]
    pub account_change_debounce_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_draft_prs: bool,
    #[serde(default = "default_true")]
    pub show_archived: bool,
    #[serde(default = "default_true")]
    pub show_account_labels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub label: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default)]
    pub use_gh_cli: bool,
    #[serde(default)]
    pub gh_host: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_graphql_url() -> String {
    "https://api.github.com/graphql".to_string()
}
fn default_rest_url() -> String {
    "https://api.github.com".to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    300
}
fn default_account_timeout() -> u64 {
    60
}
fn default_debounce_ms() -> u64 {
    1500
}
fn default_true() -> bool {
    true
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            graphql_url: default_graphql_url(),
            rest_url: default_rest_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
            account_timeout_secs: default_account_timeout(),
            account_change_debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_draft_prs: true,
            show_archived: true,
            show_account_labels: true,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::read(path);
        }

        let mut candidates = Vec::new();

        // 1. ~/.config/ghbar/config.toml
        if let Some(home) = std::env::var_os("HOME") {
            candidates.push(PathBuf::from(home).join(".config/ghbar/config.toml"));
        }

        // 2. Platform-specific path (macOS: ~/Library/Application Support/ghbar/)
        if let Some(proj_dirs) = ProjectDirs::from("", "", "ghbar") {
            candidates.push(proj_dirs.config_dir().join("config.toml"));
        }

        for config_path in &candidates {
            if config_path.exists() {
                return Self::read(config_path);
            }
        }

        Ok(AppConfig::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")
    }

    pub fn log_dir(&self) -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "ghbar") {
            return proj_dirs.data_dir().join("logs");
        }
        PathBuf::from(".local/share/ghbar/logs")
    }
}
