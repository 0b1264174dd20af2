use super::models::PrStatus;

/// Largest page requested per category.
pub const PAGE_SIZE: u32 = 30;

pub const VIEWER_PRS_QUERY: &str = r#"
query {
  reviewRequested: search(query: "is:open is:pr review-requested:@me", type: ISSUE, first: 30) {
    nodes {
      ... on PullRequest {
        ...PrFields
      }
    }
  }
  viewer {
    pullRequests(first: 30, states: OPEN, orderBy: {field: UPDATED_AT, direction: DESC}) {
      nodes {
        ...PrFields
      }
    }
  }
}

fragment PrFields on PullRequest {
  number
  title
  url
  isDraft
  mergeable
  author {
    login
    avatarUrl
  }
  repository {
    name
    owner { login }
    isArchived
  }
}
"#;

/// Search filters for the REST path, one per category.
pub const REST_CATEGORIES: [(PrStatus, &str); 5] = [
    (PrStatus::NeedsReview, "is:open is:pr review-requested:@me"),
    (
        PrStatus::WaitingReview,
        "is:open is:pr involves:@me -review-requested:@me -author:@me",
    ),
    (PrStatus::YourPr, "is:open is:pr author:@me"),
    (PrStatus::Assigned, "is:open is:pr assignee:@me -author:@me"),
    (
        PrStatus::Mentioned,
        "is:open is:pr mentions:@me -author:@me -assignee:@me",
    ),
];

pub const SEARCH_ISSUES_PATH: &str = "/search/issues";

pub fn repo_path(owner: &str, repo: &str) -> String {
    format!("/repos/{owner}/{repo}")
}
