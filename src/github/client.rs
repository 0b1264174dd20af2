use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use super::error::FetchError;
use crate::accounts::Token;
use crate::util::config::GithubConfig;

const API_VERSION: &str = "2022-11-28";

/// Thin HTTP layer shared by every account. The token travels with each
/// call so one connection pool serves all accounts.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    graphql_url: String,
    rest_url: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        ensure_secure(&config.graphql_url)?;
        ensure_secure(&config.rest_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .user_agent("ghbar")
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            graphql_url: config.graphql_url.clone(),
            rest_url: config.rest_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST a GraphQL document. GraphQL-level `errors` become a decode error.
    pub async fn graphql(&self, token: &Token, query: &str) -> Result<Value, FetchError> {
        let request = self
            .client
            .post(&self.graphql_url)
            .bearer_auth(token.expose())
            .json(&json!({ "query": query }));
        let data = send(request).await?;

        if let Some(errors) = data.get("errors") {
            let error_msg = errors
                .as_array()
                .and_then(|arr| arr.first())
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown GraphQL error");
            return Err(FetchError::decode(format!("GraphQL error: {error_msg}")));
        }

        Ok(data)
    }

    /// GET a REST path relative to the API root.
    pub async fn rest_get(
        &self,
        token: &Token,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.rest_url, path);
        let request = self
            .client
            .get(&url)
            .bearer_auth(token.expose())
            .query(query);
        send(request).await
    }
}

async fn send(request: RequestBuilder) -> Result<Value, FetchError> {
    let resp = request.send().await?;

    let status = resp.status();
    debug!(status = %status, url = %resp.url(), "GitHub response");
    if status == StatusCode::UNAUTHORIZED {
        let message = resp.text().await.unwrap_or_default();
        return Err(FetchError::Authentication {
            message: github_message(&message).unwrap_or_else(|| status.to_string()),
        });
    }
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(FetchError::transport(format!(
            "GitHub API returned {status}: {}",
            github_message(&text).unwrap_or(text)
        )));
    }

    resp.json()
        .await
        .map_err(|e| FetchError::decode(e.to_string()))
}

fn github_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// HTTPS everywhere, except plain HTTP to a loopback host.
fn ensure_secure(url: &str) -> Result<()> {
    if url.starts_with("https://") {
        return Ok(());
    }
    let loopback = ["http://127.0.0.1", "http://localhost", "http://[::1]"];
    if loopback.iter().any(|prefix| {
        url.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with([':', '/']))
    }) {
        return Ok(());
    }
    bail!("GitHub API URL must use HTTPS: {}", url)
}
