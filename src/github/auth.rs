use anyhow::{Result, bail};
use std::process::Command;
use tracing::debug;

use crate::accounts::Token;
use crate::util::config::AccountConfig;

/// Resolve an account's token using, in order:
/// 1. the inline `token` value
/// 2. the environment variable named by `token_env`
/// 3. `gh auth token [--hostname <gh_host>]` when `use_gh_cli` is set
pub fn resolve_token(account: &AccountConfig) -> Result<Token> {
    if let Some(token) = account.token.as_deref()
        && !token.trim().is_empty()
    {
        debug!(label = %account.label, "Token taken from config");
        return Ok(Token::new(token.trim()));
    }

    if let Some(var) = account.token_env.as_deref()
        && let Ok(token) = std::env::var(var)
        && !token.trim().is_empty()
    {
        debug!(label = %account.label, var = var, "Token resolved via env var");
        return Ok(Token::new(token.trim()));
    }

    if account.use_gh_cli {
        let mut cmd = Command::new("gh");
        cmd.args(["auth", "token"]);
        if let Some(host) = account.gh_host.as_deref() {
            cmd.args(["--hostname", host]);
        }
        if let Ok(output) = cmd.output()
            && output.status.success()
        {
            let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !token.is_empty() {
                debug!(label = %account.label, "Token resolved via gh CLI");
                return Ok(Token::new(token));
            }
        }
    }

    bail!(
        "Could not resolve a token for account '{}'. Set `token`, point \
         `token_env` at a non-empty variable, or enable `use_gh_cli`.",
        account.label
    )
}
