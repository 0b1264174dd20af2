use tracing::debug;

use super::client::GithubClient;
use super::queries;
use crate::accounts::Token;

/// Looks up whether a repository is archived. Used by the REST path only;
/// the GraphQL query carries the flag inline.
#[derive(Clone)]
pub struct RepoMetadataResolver {
    client: GithubClient,
}

impl RepoMetadataResolver {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }

    /// Errors count as "not archived".
    pub async fn is_archived(&self, token: &Token, owner: &str, repo: &str) -> bool {
        match self
            .client
            .rest_get(token, &queries::repo_path(owner, repo), &[])
            .await
        {
            Ok(data) => data["archived"].as_bool().unwrap_or(false),
            Err(e) => {
                debug!(owner, repo, error = %e, "Archive lookup failed, assuming active");
                false
            }
        }
    }
}
