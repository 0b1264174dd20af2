//! Normalization of raw GraphQL and REST payloads into [`PullRequest`].
//!
//! Fields are read defensively. A node without a number, title or url is
//! dropped; every other missing field falls back to a neutral default.

use serde_json::Value;
use tracing::debug;

use super::error::FetchError;
use super::models::{CiStatus, DELETED_USER, PrStatus, PullRequest};

/// Split both GraphQL buckets out of a `VIEWER_PRS_QUERY` response.
pub fn parse_graphql_response(data: &Value) -> Result<Vec<PullRequest>, FetchError> {
    let root = data
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| FetchError::decode("GraphQL response has no data"))?;

    let review_nodes = root["reviewRequested"]["nodes"].as_array();
    let authored_nodes = root["viewer"]["pullRequests"]["nodes"].as_array();
    if review_nodes.is_none() && authored_nodes.is_none() {
        return Err(FetchError::decode("GraphQL response is missing both buckets"));
    }

    let review = review_nodes
        .into_iter()
        .flatten()
        .filter_map(|node| parse_graphql_node(node, PrStatus::NeedsReview));
    let authored = authored_nodes
        .into_iter()
        .flatten()
        .filter_map(|node| parse_graphql_node(node, PrStatus::YourPr));

    Ok(review.chain(authored).collect())
}

pub fn parse_graphql_node(node: &Value, status: PrStatus) -> Option<PullRequest> {
    let Some((number, title, url)) = required_fields(node, "url") else {
        debug!(?status, "Dropping GraphQL node without number/title/url");
        return None;
    };

    let (author, author_image_url) = match node["author"]["login"].as_str() {
        Some(login) => (
            login.to_string(),
            node["author"]["avatarUrl"].as_str().unwrap_or("").to_string(),
        ),
        None => (DELETED_USER.to_string(), String::new()),
    };

    let repository = &node["repository"];
    let (repo_owner, repo_name) = match (
        repository["owner"]["login"].as_str(),
        repository["name"].as_str(),
    ) {
        (Some(owner), Some(name)) => (owner.to_string(), name.to_string()),
        _ => repo_from_html_url(url).unwrap_or_default(),
    };

    Some(PullRequest {
        number,
        title: title.to_string(),
        author,
        author_image_url,
        url: url.to_string(),
        repo_owner,
        repo_name,
        status,
        has_merge_conflicts: node["mergeable"].as_str() == Some("CONFLICTING"),
        ci_status: CiStatus::Unknown,
        is_in_archived_repo: repository["isArchived"].as_bool().unwrap_or(false),
        is_draft: node["isDraft"].as_bool().unwrap_or(false),
        account_label: String::new(),
    })
}

/// Items of a `/search/issues` response, tagged with `status`.
pub fn parse_search_response(data: &Value, status: PrStatus) -> Result<Vec<PullRequest>, FetchError> {
    let items = data["items"]
        .as_array()
        .ok_or_else(|| FetchError::decode("search response has no items array"))?;

    Ok(items
        .iter()
        .filter_map(|item| parse_search_item(item, status))
        .collect())
}

pub fn parse_search_item(item: &Value, status: PrStatus) -> Option<PullRequest> {
    let Some((number, title, url)) = required_fields(item, "html_url") else {
        debug!(?status, "Dropping search item without number/title/html_url");
        return None;
    };

    let (author, author_image_url) = match item["user"]["login"].as_str() {
        Some(login) => (
            login.to_string(),
            item["user"]["avatar_url"].as_str().unwrap_or("").to_string(),
        ),
        None => (DELETED_USER.to_string(), String::new()),
    };

    let (repo_owner, repo_name) = item["repository_url"]
        .as_str()
        .and_then(repo_from_api_url)
        .or_else(|| repo_from_html_url(url))
        .unwrap_or_default();

    Some(PullRequest {
        number,
        title: title.to_string(),
        author,
        author_image_url,
        url: url.to_string(),
        repo_owner,
        repo_name,
        status,
        has_merge_conflicts: false,
        ci_status: CiStatus::Unknown,
        is_in_archived_repo: false,
        is_draft: item["draft"].as_bool().unwrap_or(false),
        account_label: String::new(),
    })
}

fn required_fields<'a>(node: &'a Value, url_key: &str) -> Option<(u64, &'a str, &'a str)> {
    let number = node["number"].as_u64()?;
    let title = node["title"].as_str()?;
    let url = node[url_key].as_str().filter(|u| !u.is_empty())?;
    Some((number, title, url))
}

/// `https://host/owner/repo/pull/7` → `(owner, repo)`.
pub fn repo_from_html_url(url: &str) -> Option<(String, String)> {
    let path = url.split_once("://").map_or(url, |(_, rest)| rest);
    let mut segments = path.split('/').skip(1);
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    Some((owner.to_string(), repo.to_string()))
}

/// `https://api.github.com/repos/owner/repo` → `(owner, repo)`.
fn repo_from_api_url(url: &str) -> Option<(String, String)> {
    let (_, tail) = url.split_once("/repos/")?;
    let mut segments = tail.split('/');
    let owner = segments.next().filter(|s| !s.is_empty())?;
    let repo = segments.next().filter(|s| !s.is_empty())?;
    Some((owner.to_string(), repo.to_string()))
}
