use serde::{Deserialize, Serialize};

/// Author shown for pull requests whose account no longer exists.
pub const DELETED_USER: &str = "Deleted User";

/// Rank given to statuses without an explicit dedup priority.
pub const UNRANKED: u32 = 999;

/// Category under which a pull request was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrStatus {
    NeedsReview,
    WaitingReview,
    Assigned,
    Mentioned,
    YourPr,
    DraftPr,
    Approved,
}

impl PrStatus {
    /// Dedup priority: lower wins when one url is discovered more than once.
    pub fn rank(self) -> u32 {
        match self {
            PrStatus::NeedsReview => 1,
            PrStatus::YourPr => 2,
            PrStatus::Assigned => 3,
            PrStatus::Mentioned => 4,
            PrStatus::WaitingReview => 5,
            PrStatus::Approved => 6,
            PrStatus::DraftPr => UNRANKED,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PrStatus::NeedsReview => "Needs Review",
            PrStatus::WaitingReview => "Waiting Review",
            PrStatus::Assigned => "Assigned",
            PrStatus::Mentioned => "Mentioned",
            PrStatus::YourPr => "Your PRs",
            PrStatus::DraftPr => "Drafts",
            PrStatus::Approved => "Approved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CiStatus {
    Passing,
    Failing,
    Running,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub author_image_url: String,
    pub url: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub status: PrStatus,
    pub has_merge_conflicts: bool,
    pub ci_status: CiStatus,
    pub is_in_archived_repo: bool,
    pub is_draft: bool,
    pub account_label: String,
}

impl PullRequest {
    pub fn repo_full_name(&self) -> String {
        format!("{}/{}", self.repo_owner, self.repo_name)
    }

    /// Status used for grouping on screen. Authored drafts are listed apart
    /// from ready pull requests.
    pub fn display_status(&self) -> PrStatus {
        if self.is_draft && self.status == PrStatus::YourPr {
            PrStatus::DraftPr
        } else {
            self.status
        }
    }

    pub fn with_account_label(self, label: &str) -> Self {
        Self {
            account_label: label.to_string(),
            ..self
        }
    }

    pub fn with_archived(self, is_in_archived_repo: bool) -> Self {
        Self {
            is_in_archived_repo,
            ..self
        }
    }
}

/// Which protocol produced an account's records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPath {
    GraphQl,
    Rest,
}

#[derive(Debug, Clone)]
pub struct AccountFetch {
    pub path: FetchPath,
    pub pull_requests: Vec<PullRequest>,
}
