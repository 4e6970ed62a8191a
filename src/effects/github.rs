//! GitHub API effect types.
//!
//! These types describe GitHub API operations as data, without executing them.
//! The interpreter in [`crate::github`] executes these effects against the
//! actual GitHub API; tests use an in-memory interpreter instead.

use serde::{Deserialize, Serialize};

use crate::types::{CommentId, Issue, IssueNumber};

/// Filter for listing open issues.
///
/// Mirrors the query parameters of `GET /repos/{owner}/{repo}/issues`: an issue
/// matches when it carries every label in `labels` and, if set, is assigned to
/// `assignee`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueFilter {
    pub labels: Vec<String>,
    pub assignee: Option<String>,
}

impl IssueFilter {
    /// Whether an open issue satisfies this filter.
    pub fn matches(&self, issue: &Issue) -> bool {
        let labels_match = self.labels.iter().all(|label| issue.has_label(label));
        let assignee_match = self
            .assignee
            .as_deref()
            .is_none_or(|login| issue.is_assigned_to(login));
        labels_match && assignee_match
    }
}

/// The fields of an issue to overwrite. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueUpdate {
    /// The complete new label list (GitHub replaces labels wholesale).
    pub labels: Option<Vec<String>>,
    /// The complete new assignee list. `Some(vec![])` clears assignees.
    pub assignees: Option<Vec<String>>,
}

/// A GitHub API effect.
///
/// Each variant describes a GitHub API operation. Effects are repo-scoped:
/// the interpreter is constructed with a `RepoId`, so effects don't include it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    // ─── Issue Queries ────────────────────────────────────────────────────────
    /// Fetch a single issue by number.
    GetIssue { issue: IssueNumber },

    /// List open issues (pull requests excluded) matching a filter.
    ListOpenIssues { filter: IssueFilter },

    /// List the names of all labels defined in the repository.
    ListLabels,

    // ─── Issue Mutations ──────────────────────────────────────────────────────
    /// Overwrite an issue's labels and/or assignees.
    UpdateIssue {
        issue: IssueNumber,
        update: IssueUpdate,
    },

    // ─── Comments ─────────────────────────────────────────────────────────────
    /// Post a new comment on an issue.
    CreateComment { issue: IssueNumber, body: String },
}

impl GitHubEffect {
    /// Short name used in log fields.
    pub fn name(&self) -> &'static str {
        match self {
            GitHubEffect::GetIssue { .. } => "get_issue",
            GitHubEffect::ListOpenIssues { .. } => "list_open_issues",
            GitHubEffect::ListLabels => "list_labels",
            GitHubEffect::UpdateIssue { .. } => "update_issue",
            GitHubEffect::CreateComment { .. } => "create_comment",
        }
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

/// Response from a GitHub effect.
///
/// Each variant corresponds to the response from a particular effect type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `GetIssue`.
    Issue(Issue),

    /// Response to `ListOpenIssues`.
    Issues(Vec<Issue>),

    /// Response to `ListLabels`.
    Labels(Vec<String>),

    /// Response to `UpdateIssue`.
    IssueUpdated,

    /// Response to `CreateComment`.
    CommentCreated {
        /// The ID of the newly created comment.
        id: CommentId,
    },
}
