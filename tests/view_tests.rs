use ghbar::app::state::{AccountFailure, RefreshReport, Snapshot, SnapshotStatus};
use ghbar::app::view::{render, sections};
use ghbar::github::{CiStatus, FetchError, PrStatus, PullRequest};
use ghbar::util::config::DisplayConfig;

fn make_pr(number: u64, status: PrStatus) -> PullRequest {
    PullRequest {
        number,
        title: format!("PR {number}"),
        author: "octocat".into(),
        author_image_url: String::new(),
        url: format!("https://github.com/acme/api/pull/{number}"),
        repo_owner: "acme".into(),
        repo_name: "api".into(),
        status,
        has_merge_conflicts: false,
        ci_status: CiStatus::Unknown,
        is_in_archived_repo: false,
        is_draft: false,
        account_label: "work".into(),
    }
}

fn ready(prs: Vec<PullRequest>) -> Snapshot {
    Snapshot::from_report(RefreshReport {
        pull_requests: prs,
        failures: Vec::new(),
        accounts_queried: 1,
    })
}

#[test]
fn test_sections_follow_display_order() {
    let mut draft = make_pr(3, PrStatus::YourPr);
    draft.is_draft = true;
    let prs = vec![
        make_pr(1, PrStatus::Mentioned),
        draft,
        make_pr(2, PrStatus::NeedsReview),
        make_pr(4, PrStatus::YourPr),
    ];

    let sections = sections(&prs, &DisplayConfig::default());
    let order: Vec<PrStatus> = sections.iter().map(|s| s.status).collect();
    assert_eq!(
        order,
        vec![
            PrStatus::NeedsReview,
            PrStatus::YourPr,
            PrStatus::DraftPr,
            PrStatus::Mentioned
        ]
    );
    assert_eq!(sections[2].pull_requests[0].number, 3);
}

#[test]
fn test_sections_hide_drafts_and_archived() {
    let mut draft = make_pr(1, PrStatus::NeedsReview);
    draft.is_draft = true;
    let mut archived = make_pr(2, PrStatus::NeedsReview);
    archived.is_in_archived_repo = true;
    let prs = vec![draft, archived, make_pr(3, PrStatus::NeedsReview)];

    let display = DisplayConfig {
        show_draft_prs: false,
        show_archived: false,
        show_account_labels: true,
    };
    let sections = sections(&prs, &display);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].pull_requests.len(), 1);
    assert_eq!(sections[0].pull_requests[0].number, 3);
}

#[test]
fn test_render_ready_snapshot() {
    let mut conflicted = make_pr(7, PrStatus::NeedsReview);
    conflicted.has_merge_conflicts = true;
    let out = render(&ready(vec![conflicted]), &DisplayConfig::default());

    assert!(out.starts_with("Needs Review (1)\n"));
    assert!(out.contains("acme/api#7 PR 7 (octocat) [conflicts] @work"));
}

#[test]
fn test_render_hides_account_labels() {
    let display = DisplayConfig {
        show_account_labels: false,
        ..DisplayConfig::default()
    };
    let out = render(&ready(vec![make_pr(1, PrStatus::Assigned)]), &display);
    assert!(!out.contains("@work"));
}

#[test]
fn test_render_distinguishes_empty_from_accounts_required() {
    let empty = render(&ready(Vec::new()), &DisplayConfig::default());
    assert_eq!(empty, "No pull requests.\n");

    let required = render(&Snapshot::accounts_required(Vec::new()), &DisplayConfig::default());
    assert!(required.contains("account with a valid token is required"));

    let loading = render(&Snapshot::not_loaded(), &DisplayConfig::default());
    assert!(loading.contains("Loading"));
}

#[test]
fn test_render_lists_account_failures() {
    let snapshot = Snapshot::from_report(RefreshReport {
        pull_requests: vec![make_pr(1, PrStatus::NeedsReview)],
        failures: vec![AccountFailure {
            label: "personal".into(),
            error: FetchError::Transport {
                message: "timed out".into(),
            },
        }],
        accounts_queried: 2,
    });
    assert_eq!(snapshot.status, SnapshotStatus::Ready);

    let out = render(&snapshot, &DisplayConfig::default());
    assert!(out.contains("! personal: GitHub request failed: timed out"));
}
