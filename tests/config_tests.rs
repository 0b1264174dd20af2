use std::io::Write;
use tempfile::NamedTempFile;

use ghbar::app::scheduler::{MAX_ACCOUNT_CHANGE_DEBOUNCE, MAX_REFRESH_INTERVAL, SchedulerConfig};
use ghbar::util::config::AppConfig;

#[test]
fn test_load_full_config() {
    let toml = r#"
[github]
graphql_url = "https://github.example.com/api/graphql"
rest_url = "https://github.example.com/api/v3"
request_timeout_secs = 15

[refresh]
interval_secs = 120
account_timeout_secs = 45
account_change_debounce_ms = 500

[display]
show_draft_prs = false
show_archived = false
show_account_labels = false

[[accounts]]
label = "work"
token_env = "GHBAR_WORK_TOKEN"

[[accounts]]
label = "personal"
use_gh_cli = true
gh_host = "github.com"
enabled = false
"#;
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(toml.as_bytes()).unwrap();

    let config = AppConfig::load(Some(f.path())).unwrap();
    assert_eq!(
        config.github.graphql_url,
        "https://github.example.com/api/graphql"
    );
    assert_eq!(config.github.rest_url, "https://github.example.com/api/v3");
    assert_eq!(config.github.request_timeout_secs, 15);
    assert_eq!(config.refresh.interval_secs, 120);
    assert_eq!(config.refresh.account_timeout_secs, 45);
    assert_eq!(config.refresh.account_change_debounce_ms, 500);
    assert!(!config.display.show_draft_prs);
    assert!(!config.display.show_archived);
    assert!(!config.display.show_account_labels);

    assert_eq!(config.accounts.len(), 2);
    assert_eq!(config.accounts[0].label, "work");
    assert_eq!(
        config.accounts[0].token_env.as_deref(),
        Some("GHBAR_WORK_TOKEN")
    );
    assert!(config.accounts[0].enabled);
    assert!(!config.accounts[0].use_gh_cli);
    assert_eq!(config.accounts[1].label, "personal");
    assert!(config.accounts[1].use_gh_cli);
    assert_eq!(config.accounts[1].gh_host.as_deref(), Some("github.com"));
    assert!(!config.accounts[1].enabled);
}

#[test]
fn test_load_partial_config_uses_defaults() {
    let toml = r#"
[[accounts]]
label = "work"
token = "abc"
"#;
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(toml.as_bytes()).unwrap();

    let config = AppConfig::load(Some(f.path())).unwrap();
    assert_eq!(config.accounts.len(), 1);
    assert_eq!(config.accounts[0].token.as_deref(), Some("abc"));
    assert_eq!(config.github.graphql_url, "https://api.github.com/graphql");
    assert_eq!(config.github.rest_url, "https://api.github.com");
    assert_eq!(config.github.request_timeout_secs, 30);
    assert_eq!(config.refresh.interval_secs, 300);
    assert_eq!(config.refresh.account_timeout_secs, 60);
    assert!(config.display.show_draft_prs);
}

#[test]
fn test_load_empty_config_uses_all_defaults() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"").unwrap();

    let config = AppConfig::load(Some(f.path())).unwrap();
    assert!(config.accounts.is_empty());
    assert_eq!(config.refresh.interval_secs, 300);
    assert_eq!(config.refresh.account_change_debounce_ms, 1500);
}

#[test]
fn test_account_without_label_fails() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"[[accounts]]\ntoken = \"abc\"\n").unwrap();

    assert!(AppConfig::load(Some(f.path())).is_err());
}

#[test]
fn test_load_nonexistent_file_fails() {
    let result = AppConfig::load(Some(std::path::Path::new("/nonexistent/path/config.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_toml_fails() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"this is not [valid toml {{").unwrap();

    let result = AppConfig::load(Some(f.path()));
    assert!(result.is_err());
}

#[test]
fn test_scheduler_config_clamps_interval() {
    let mut config = AppConfig::default();
    config.refresh.interval_secs = 30;
    config.refresh.account_change_debounce_ms = 250;

    let scheduler = SchedulerConfig::from(&config.refresh);
    assert_eq!(scheduler.interval.as_secs(), 60);
    assert_eq!(scheduler.account_change_debounce.as_millis(), 250);
}

#[test]
fn test_scheduler_config_caps_huge_values() {
    let mut config = AppConfig::default();
    config.refresh.interval_secs = u64::MAX;
    config.refresh.account_change_debounce_ms = u64::MAX;

    let scheduler = SchedulerConfig::from(&config.refresh);
    assert_eq!(scheduler.interval, MAX_REFRESH_INTERVAL);
    assert_eq!(scheduler.account_change_debounce, MAX_ACCOUNT_CHANGE_DEBOUNCE);
}
