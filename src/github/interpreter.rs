//! GitHub effect interpreter using octocrab.
//!
//! This module implements the `GitHubInterpreter` trait, executing GitHub effects
//! against the real GitHub API via octocrab.
//!
//! Key implementation details:
//! - Issue listing and label listing go through the raw REST routes so that
//!   query parameters map one-to-one onto [`IssueFilter`]
//! - Lists are paginated at 100 items per page
//! - Pull requests returned by the issues endpoint are dropped
//! - Retry policy is chosen per effect (comments are never retried)

use serde::Serialize;
use tracing::debug;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, IssueFilter, IssueUpdate};
use crate::types::{CommentId, IssueNumber};

use super::client::OctocrabClient;
use super::error::GitHubApiError;
use super::payload::{RawIssue, RawLabel};
use super::retry::{RetryConfig, RetryPolicy, retry_with_backoff};

/// Page size for list endpoints (GitHub's maximum).
const PER_PAGE: u32 = 100;

impl GitHubInterpreter for OctocrabClient {
    type Error = GitHubApiError;

    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
        let policy = RetryPolicy::for_effect(&effect);
        interpret_github_effect(self, effect, RetryConfig::DEFAULT, policy).await
    }
}

/// Interprets a GitHub effect, executing it against the GitHub API.
///
/// # Arguments
///
/// * `client` - The octocrab client scoped to a repository
/// * `effect` - The effect to execute
/// * `retry_config` - Configuration for retry behavior
/// * `retry_policy` - Whether to retry transient errors
pub async fn interpret_github_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
    retry_config: RetryConfig,
    retry_policy: RetryPolicy,
) -> Result<GitHubResponse, GitHubApiError> {
    debug!(repo = %client.repo(), effect = effect.name(), "Executing GitHub effect");

    retry_with_backoff(retry_config, retry_policy, effect.name(), || {
        execute_effect(client, effect.clone())
    })
    .await
}

/// Executes a single effect without retry logic.
async fn execute_effect(
    client: &OctocrabClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, GitHubApiError> {
    match effect {
        GitHubEffect::GetIssue { issue } => get_issue(client, issue).await,
        GitHubEffect::ListOpenIssues { filter } => list_open_issues(client, &filter).await,
        GitHubEffect::ListLabels => list_labels(client).await,
        GitHubEffect::UpdateIssue { issue, update } => update_issue(client, issue, update).await,
        GitHubEffect::CreateComment { issue, body } => create_comment(client, issue, body).await,
    }
}

// ─── Issue Queries ────────────────────────────────────────────────────────────

async fn get_issue(
    client: &OctocrabClient,
    issue: IssueNumber,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/issues/{}",
        client.owner(),
        client.repo_name(),
        issue.0
    );

    let raw: RawIssue = client
        .inner()
        .get(&url, None::<&()>)
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    let issue = raw
        .into_issue()
        .map_err(GitHubApiError::unexpected_response)?;
    Ok(GitHubResponse::Issue(issue))
}

/// Query parameters of `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Serialize)]
struct ListIssuesParams<'a> {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<&'a str>,
    per_page: u32,
    page: u32,
}

async fn list_open_issues(
    client: &OctocrabClient,
    filter: &IssueFilter,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!("/repos/{}/{}/issues", client.owner(), client.repo_name());
    let labels = (!filter.labels.is_empty()).then(|| filter.labels.join(","));

    let mut page = 1u32;
    let mut issues = Vec::new();

    loop {
        let params = ListIssuesParams {
            state: "open",
            labels: labels.clone(),
            assignee: filter.assignee.as_deref(),
            per_page: PER_PAGE,
            page,
        };

        let batch: Vec<RawIssue> = client
            .inner()
            .get(&url, Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        let batch_len = batch.len();

        for raw in batch {
            if raw.is_pull_request() {
                continue;
            }
            issues.push(
                raw.into_issue()
                    .map_err(GitHubApiError::unexpected_response)?,
            );
        }

        if batch_len < PER_PAGE as usize {
            break;
        }
        page += 1;
    }

    Ok(GitHubResponse::Issues(issues))
}

#[derive(Debug, Serialize)]
struct PageParams {
    per_page: u32,
    page: u32,
}

async fn list_labels(client: &OctocrabClient) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!("/repos/{}/{}/labels", client.owner(), client.repo_name());

    let mut page = 1u32;
    let mut names = Vec::new();

    loop {
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };
        let batch: Vec<RawLabel> = client
            .inner()
            .get(&url, Some(&params))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        let batch_len = batch.len();

        names.extend(batch.into_iter().map(|label| label.name));

        if batch_len < PER_PAGE as usize {
            break;
        }
        page += 1;
    }

    Ok(GitHubResponse::Labels(names))
}

// ─── Issue Mutations ──────────────────────────────────────────────────────────

/// Body of `PATCH /repos/{owner}/{repo}/issues/{number}`.
#[derive(Debug, Serialize)]
struct UpdateIssueBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignees: Option<Vec<String>>,
}

async fn update_issue(
    client: &OctocrabClient,
    issue: IssueNumber,
    update: IssueUpdate,
) -> Result<GitHubResponse, GitHubApiError> {
    let url = format!(
        "/repos/{}/{}/issues/{}",
        client.owner(),
        client.repo_name(),
        issue.0
    );
    let body = UpdateIssueBody {
        labels: update.labels,
        assignees: update.assignees,
    };

    let _: serde_json::Value = client
        .inner()
        .patch(&url, Some(&body))
        .await
        .map_err(GitHubApiError::from_octocrab)?;

    Ok(GitHubResponse::IssueUpdated)
}

// ─── Comments ─────────────────────────────────────────────────────────────────

async fn create_comment(
    client: &OctocrabClient,
    issue: IssueNumber,
    body: String,
) -> Result<GitHubResponse, GitHubApiError> {
    let result = client
        .inner()
        .issues(client.owner(), client.repo_name())
        .create_comment(issue.0, body)
        .await;

    match result {
        Ok(comment) => Ok(GitHubResponse::CommentCreated {
            id: CommentId(comment.id.into_inner()),
        }),
        Err(e) => Err(GitHubApiError::from_octocrab(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_omit_empty_filters() {
        let params = ListIssuesParams {
            state: "open",
            labels: None,
            assignee: None,
            per_page: PER_PAGE,
            page: 1,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "open", "per_page": 100, "page": 1})
        );
    }

    #[test]
    fn list_params_join_labels() {
        let params = ListIssuesParams {
            state: "open",
            labels: Some(["CF-20", "Open for Pickup"].join(",")),
            assignee: Some("alice"),
            per_page: PER_PAGE,
            page: 2,
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["labels"], "CF-20,Open for Pickup");
        assert_eq!(json["assignee"], "alice");
        assert_eq!(json["page"], 2);
    }

    #[test]
    fn update_body_only_carries_changed_fields() {
        let body = UpdateIssueBody {
            labels: Some(vec!["Bug".into()]),
            assignees: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"labels": ["Bug"]})
        );

        let clear = UpdateIssueBody {
            labels: None,
            assignees: Some(vec![]),
        };
        assert_eq!(
            serde_json::to_value(&clear).unwrap(),
            serde_json::json!({"assignees": []})
        );
    }
}
