use std::fmt::Write;

use crate::app::state::{Snapshot, SnapshotStatus};
use crate::github::{PrStatus, PullRequest};
use crate::util::config::DisplayConfig;

/// Order of the sections on screen.
pub const SECTION_ORDER: [PrStatus; 7] = [
    PrStatus::NeedsReview,
    PrStatus::YourPr,
    PrStatus::DraftPr,
    PrStatus::Assigned,
    PrStatus::Mentioned,
    PrStatus::WaitingReview,
    PrStatus::Approved,
];

#[derive(Debug)]
pub struct Section<'a> {
    pub status: PrStatus,
    pub pull_requests: Vec<&'a PullRequest>,
}

pub fn is_visible(pr: &PullRequest, display: &DisplayConfig) -> bool {
    (display.show_draft_prs || !pr.is_draft) && (display.show_archived || !pr.is_in_archived_repo)
}

/// Group visible pull requests by display status. Empty sections are left out.
pub fn sections<'a>(prs: &'a [PullRequest], display: &DisplayConfig) -> Vec<Section<'a>> {
    SECTION_ORDER
        .iter()
        .map(|&status| Section {
            status,
            pull_requests: prs
                .iter()
                .filter(|pr| pr.display_status() == status && is_visible(pr, display))
                .collect(),
        })
        .filter(|section| !section.pull_requests.is_empty())
        .collect()
}

pub fn render(snapshot: &Snapshot, display: &DisplayConfig) -> String {
    let mut out = String::new();

    match snapshot.status {
        SnapshotStatus::NotLoaded => {
            out.push_str("Loading pull requests...\n");
            return out;
        }
        SnapshotStatus::AccountsRequired => {
            out.push_str("A GitHub account with a valid token is required.\n");
        }
        SnapshotStatus::Ready => {
            let sections = sections(&snapshot.pull_requests, display);
            if sections.is_empty() {
                out.push_str("No pull requests.\n");
            }
            for section in sections {
                let _ = writeln!(out, "{} ({})", section.status.title(), section.pull_requests.len());
                for pr in section.pull_requests {
                    let _ = writeln!(out, "  {}", render_line(pr, display));
                }
            }
        }
    }

    for failure in &snapshot.failures {
        let _ = writeln!(out, "! {}: {}", failure.label, failure.error);
    }
    out
}

fn render_line(pr: &PullRequest, display: &DisplayConfig) -> String {
    let mut line = format!("{}#{} {} ({})", pr.repo_full_name(), pr.number, pr.title, pr.author);
    if pr.has_merge_conflicts {
        line.push_str(" [conflicts]");
    }
    if pr.is_in_archived_repo {
        line.push_str(" [archived]");
    }
    if display.show_account_labels && !pr.account_label.is_empty() {
        let _ = write!(line, " @{}", pr.account_label);
    }
    line
}
