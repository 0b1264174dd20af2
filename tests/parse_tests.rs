use serde_json::json;

use ghbar::github::parse::{
    parse_graphql_node, parse_graphql_response, parse_search_item, parse_search_response,
    repo_from_html_url,
};
use ghbar::github::{CiStatus, DELETED_USER, FetchError, PrStatus};

fn graphql_node(number: u64, repo: &str) -> serde_json::Value {
    json!({
        "number": number,
        "title": format!("PR {number}"),
        "url": format!("https://github.com/acme/{repo}/pull/{number}"),
        "isDraft": false,
        "mergeable": "MERGEABLE",
        "author": { "login": "octocat", "avatarUrl": "https://avatars.example/octocat" },
        "repository": { "name": repo, "owner": { "login": "acme" }, "isArchived": false }
    })
}

#[test]
fn test_graphql_response_tags_buckets() {
    let data = json!({
        "data": {
            "reviewRequested": { "nodes": [graphql_node(1, "api")] },
            "viewer": { "pullRequests": { "nodes": [graphql_node(2, "web"), graphql_node(3, "web")] } }
        }
    });

    let prs = parse_graphql_response(&data).unwrap();
    assert_eq!(prs.len(), 3);
    assert_eq!(prs[0].status, PrStatus::NeedsReview);
    assert_eq!(prs[0].repo_full_name(), "acme/api");
    assert_eq!(prs[1].status, PrStatus::YourPr);
    assert_eq!(prs[2].status, PrStatus::YourPr);
    assert!(prs.iter().all(|pr| pr.ci_status == CiStatus::Unknown));
    assert!(prs.iter().all(|pr| pr.account_label.is_empty()));
}

#[test]
fn test_graphql_empty_buckets_is_ok() {
    let data = json!({
        "data": {
            "reviewRequested": { "nodes": [] },
            "viewer": { "pullRequests": { "nodes": [] } }
        }
    });
    assert!(parse_graphql_response(&data).unwrap().is_empty());
}

#[test]
fn test_graphql_without_data_is_decode_error() {
    let err = parse_graphql_response(&json!({ "message": "nope" })).unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[test]
fn test_graphql_node_deleted_author() {
    let mut node = graphql_node(7, "api");
    node["author"] = serde_json::Value::Null;

    let pr = parse_graphql_node(&node, PrStatus::NeedsReview).unwrap();
    assert_eq!(pr.author, DELETED_USER);
    assert_eq!(pr.author_image_url, "");
}

#[test]
fn test_graphql_node_conflicts_and_archive() {
    let mut node = graphql_node(7, "api");
    node["mergeable"] = json!("CONFLICTING");
    node["repository"]["isArchived"] = json!(true);
    node["isDraft"] = json!(true);

    let pr = parse_graphql_node(&node, PrStatus::YourPr).unwrap();
    assert!(pr.has_merge_conflicts);
    assert!(pr.is_in_archived_repo);
    assert!(pr.is_draft);
    assert_eq!(pr.display_status(), PrStatus::DraftPr);
}

#[test]
fn test_graphql_node_unknown_mergeable_is_not_conflict() {
    let mut node = graphql_node(7, "api");
    node["mergeable"] = json!("UNKNOWN");
    let pr = parse_graphql_node(&node, PrStatus::NeedsReview).unwrap();
    assert!(!pr.has_merge_conflicts);
}

#[test]
fn test_graphql_node_missing_repository() {
    let mut node = graphql_node(7, "api");
    node.as_object_mut().unwrap().remove("repository");

    let pr = parse_graphql_node(&node, PrStatus::NeedsReview).unwrap();
    assert!(!pr.is_in_archived_repo);
    assert_eq!(pr.repo_full_name(), "acme/api");
}

#[test]
fn test_graphql_drops_incomplete_nodes() {
    let mut no_title = graphql_node(2, "api");
    no_title.as_object_mut().unwrap().remove("title");
    let data = json!({
        "data": {
            "reviewRequested": { "nodes": [graphql_node(1, "api"), no_title, {}] },
            "viewer": { "pullRequests": { "nodes": [{ "number": "x" }] } }
        }
    });

    let prs = parse_graphql_response(&data).unwrap();
    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].number, 1);
}

#[test]
fn test_search_item_normalization() {
    let item = json!({
        "number": 12,
        "title": "Fix the thing",
        "html_url": "https://github.com/acme/api/pull/12",
        "repository_url": "https://api.github.com/repos/acme/api",
        "draft": true,
        "user": { "login": "alice", "avatar_url": "https://avatars.example/alice" },
        "pull_request": { "url": "https://api.github.com/repos/acme/api/pulls/12" }
    });

    let pr = parse_search_item(&item, PrStatus::Assigned).unwrap();
    assert_eq!(pr.number, 12);
    assert_eq!(pr.url, "https://github.com/acme/api/pull/12");
    assert_eq!(pr.author, "alice");
    assert_eq!(pr.repo_owner, "acme");
    assert_eq!(pr.repo_name, "api");
    assert_eq!(pr.status, PrStatus::Assigned);
    assert!(pr.is_draft);
    assert!(!pr.has_merge_conflicts);
    assert_eq!(pr.ci_status, CiStatus::Unknown);
}

#[test]
fn test_search_item_null_user_is_deleted_user() {
    let item = json!({
        "number": 3,
        "title": "Orphan",
        "html_url": "https://github.com/acme/api/pull/3",
        "user": null
    });

    let pr = parse_search_item(&item, PrStatus::Assigned).unwrap();
    assert_eq!(pr.author, DELETED_USER);
    assert_eq!(pr.author_image_url, "");
    assert_eq!(pr.repo_full_name(), "acme/api");
}

#[test]
fn test_search_response_skips_bad_items() {
    let data = json!({
        "total_count": 3,
        "items": [
            { "number": 1, "title": "ok", "html_url": "https://github.com/a/b/pull/1" },
            { "number": 2, "html_url": "https://github.com/a/b/pull/2" },
            { "number": 3, "title": "no url", "html_url": "" }
        ]
    });

    let prs = parse_search_response(&data, PrStatus::Mentioned).unwrap();
    assert_eq!(prs.len(), 1);
    assert_eq!(prs[0].status, PrStatus::Mentioned);
}

#[test]
fn test_search_response_without_items_fails() {
    let err = parse_search_response(&json!({ "total_count": 0 }), PrStatus::Mentioned).unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[test]
fn test_repo_from_html_url() {
    assert_eq!(
        repo_from_html_url("https://ghe.example.com/team/service/pull/9"),
        Some(("team".to_string(), "service".to_string()))
    );
    assert_eq!(repo_from_html_url("https://github.com/"), None);
}

#[test]
fn test_status_ranks() {
    assert!(PrStatus::NeedsReview.rank() < PrStatus::YourPr.rank());
    assert!(PrStatus::YourPr.rank() < PrStatus::Assigned.rank());
    assert!(PrStatus::Assigned.rank() < PrStatus::Mentioned.rank());
    assert!(PrStatus::Mentioned.rank() < PrStatus::WaitingReview.rank());
    assert!(PrStatus::WaitingReview.rank() < PrStatus::Approved.rank());
    assert_eq!(PrStatus::DraftPr.rank(), ghbar::github::UNRANKED);
}
