use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::client::GithubClient;
use super::error::FetchError;
use super::models::{AccountFetch, FetchPath, PrStatus, PullRequest};
use super::parse;
use super::queries;
use super::repo_meta::RepoMetadataResolver;
use crate::accounts::Token;

/// Anything that can list the pull requests visible to one token.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn fetch_for_account(&self, token: &Token) -> Result<Vec<PullRequest>, FetchError>;
}

/// Fetches one account's pull requests: GraphQL first, REST search when
/// GraphQL fails or comes back empty.
#[derive(Clone)]
pub struct QueryClient {
    client: GithubClient,
    resolver: RepoMetadataResolver,
}

impl QueryClient {
    pub fn new(client: GithubClient) -> Self {
        let resolver = RepoMetadataResolver::new(client.clone());
        Self { client, resolver }
    }

    pub async fn fetch(&self, token: &Token) -> Result<AccountFetch, FetchError> {
        match self.fetch_graphql(token).await {
            Ok(prs) if !prs.is_empty() => {
                debug!(count = prs.len(), "GraphQL fetch complete");
                return Ok(AccountFetch {
                    path: FetchPath::GraphQl,
                    pull_requests: prs,
                });
            }
            Ok(_) => info!("GraphQL returned no pull requests, falling back to REST"),
            Err(e) => warn!(error = %e, "GraphQL fetch failed, falling back to REST"),
        }

        let prs = self.fetch_rest(token).await?;
        debug!(count = prs.len(), "REST fetch complete");
        Ok(AccountFetch {
            path: FetchPath::Rest,
            pull_requests: prs,
        })
    }

    pub async fn fetch_graphql(&self, token: &Token) -> Result<Vec<PullRequest>, FetchError> {
        let data = self.client.graphql(token, queries::VIEWER_PRS_QUERY).await?;
        parse::parse_graphql_response(&data)
    }

    /// Runs all five category searches, then the archive lookups. Any failed
    /// category fails the whole fetch; a 401 wins over other errors.
    pub async fn fetch_rest(&self, token: &Token) -> Result<Vec<PullRequest>, FetchError> {
        let [needs_review, waiting, yours, assigned, mentioned] = queries::REST_CATEGORIES;
        let results = tokio::join!(
            self.search(token, needs_review),
            self.search(token, waiting),
            self.search(token, yours),
            self.search(token, assigned),
            self.search(token, mentioned),
        );
        let results = [results.0, results.1, results.2, results.3, results.4];

        if let Some(auth) = results
            .iter()
            .find_map(|r| r.as_ref().err().filter(|e| e.is_authentication()))
        {
            return Err(auth.clone());
        }

        let mut prs = Vec::new();
        for result in results {
            prs.extend(result?);
        }

        Ok(self.resolve_archived(token, prs).await)
    }

    async fn search(
        &self,
        token: &Token,
        (status, filter): (PrStatus, &str),
    ) -> Result<Vec<PullRequest>, FetchError> {
        let per_page = queries::PAGE_SIZE.to_string();
        let data = self
            .client
            .rest_get(
                token,
                queries::SEARCH_ISSUES_PATH,
                &[("q", filter), ("per_page", per_page.as_str())],
            )
            .await?;
        let prs = parse::parse_search_response(&data, status)?;
        debug!(?status, count = prs.len(), "Search category complete");
        Ok(prs)
    }

    /// One lookup per distinct repository, run concurrently.
    async fn resolve_archived(&self, token: &Token, prs: Vec<PullRequest>) -> Vec<PullRequest> {
        let mut seen = HashSet::new();
        let repos: Vec<(String, String)> = prs
            .iter()
            .filter(|pr| !pr.repo_owner.is_empty() && !pr.repo_name.is_empty())
            .map(|pr| (pr.repo_owner.clone(), pr.repo_name.clone()))
            .filter(|key| seen.insert(key.clone()))
            .collect();

        let lookups = repos
            .iter()
            .map(|(owner, repo)| self.resolver.is_archived(token, owner, repo));
        let archived: HashMap<&(String, String), bool> =
            repos.iter().zip(join_all(lookups).await).collect();

        prs.into_iter()
            .map(|pr| {
                let key = (pr.repo_owner.clone(), pr.repo_name.clone());
                let is_archived = archived.get(&key).copied().unwrap_or(false);
                pr.with_archived(is_archived)
            })
            .collect()
    }
}

#[async_trait]
impl PullRequestSource for QueryClient {
    async fn fetch_for_account(&self, token: &Token) -> Result<Vec<PullRequest>, FetchError> {
        self.fetch(token).await.map(|fetch| fetch.pull_requests)
    }
}
