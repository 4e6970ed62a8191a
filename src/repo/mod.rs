//! Repository query service.
//!
//! Typed operations over a [`GitHubInterpreter`]: each function issues one
//! effect and unpacks the matching response. The engine only talks to GitHub
//! through these.

use std::fmt::Display;

use thiserror::Error;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, IssueFilter, IssueUpdate};
use crate::types::{CommentId, Issue, IssueNumber, RepoId};

/// The owner/repo of an issue could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot determine the repo owner or name from {url:?}")]
pub struct ResolutionError {
    pub url: String,
}

/// A repository operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    /// The interpreter reported an error (already retried where allowed).
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    /// The interpreter answered with a response for a different effect.
    #[error("{operation} returned an unexpected response: {response}")]
    UnexpectedResponse {
        operation: &'static str,
        response: String,
    },
}

/// Resolves `owner/repo` from an issue's `repository_url`.
///
/// Takes the last two non-empty path segments, so both the API form
/// (`https://api.github.com/repos/o/r`) and the browser form
/// (`https://github.com/o/r`) resolve.
///
/// # Examples
///
/// ```
/// use bug_helpers::repo::resolve_repository;
/// use bug_helpers::types::RepoId;
///
/// assert_eq!(
///     resolve_repository("https://api.github.com/repos/topcoder-platform/community-app"),
///     Ok(RepoId::new("topcoder-platform", "community-app"))
/// );
/// assert!(resolve_repository("https://api.github.com/").is_err());
/// ```
pub fn resolve_repository(repository_url: &str) -> Result<RepoId, ResolutionError> {
    let err = || ResolutionError {
        url: repository_url.to_string(),
    };

    let path = repository_url
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map_or("", |(_, path)| path))
        .unwrap_or(repository_url);

    let mut segments = path.rsplit('/').filter(|segment| !segment.is_empty());
    let repo = segments.next().ok_or_else(err)?;
    let owner = segments.next().ok_or_else(err)?;

    Ok(RepoId::new(owner, repo))
}

async fn run<G>(
    github: &G,
    operation: &'static str,
    effect: GitHubEffect,
) -> Result<GitHubResponse, RepoError>
where
    G: GitHubInterpreter,
    G::Error: Display,
{
    github
        .interpret(effect)
        .await
        .map_err(|e| RepoError::Api {
            operation,
            message: e.to_string(),
        })
}

fn unexpected(operation: &'static str, response: GitHubResponse) -> RepoError {
    RepoError::UnexpectedResponse {
        operation,
        response: format!("{:?}", response),
    }
}

/// Re-reads a single issue.
pub async fn get_issue<G>(github: &G, issue: IssueNumber) -> Result<Issue, RepoError>
where
    G: GitHubInterpreter,
    G::Error: Display,
{
    const OP: &str = "get_issue";
    match run(github, OP, GitHubEffect::GetIssue { issue }).await? {
        GitHubResponse::Issue(issue) => Ok(issue),
        other => Err(unexpected(OP, other)),
    }
}

/// Lists open issues (never pull requests) matching the filter.
pub async fn list_open_issues<G>(github: &G, filter: IssueFilter) -> Result<Vec<Issue>, RepoError>
where
    G: GitHubInterpreter,
    G::Error: Display,
{
    const OP: &str = "list_open_issues";
    match run(github, OP, GitHubEffect::ListOpenIssues { filter }).await? {
        GitHubResponse::Issues(issues) => Ok(issues),
        other => Err(unexpected(OP, other)),
    }
}

/// Lists the names of the labels defined in the repository.
pub async fn list_labels<G>(github: &G) -> Result<Vec<String>, RepoError>
where
    G: GitHubInterpreter,
    G::Error: Display,
{
    const OP: &str = "list_labels";
    match run(github, OP, GitHubEffect::ListLabels).await? {
        GitHubResponse::Labels(labels) => Ok(labels),
        other => Err(unexpected(OP, other)),
    }
}

pub async fn update_issue<G>(
    github: &G,
    issue: IssueNumber,
    update: IssueUpdate,
) -> Result<(), RepoError>
where
    G: GitHubInterpreter,
    G::Error: Display,
{
    const OP: &str = "update_issue";
    match run(github, OP, GitHubEffect::UpdateIssue { issue, update }).await? {
        GitHubResponse::IssueUpdated => Ok(()),
        other => Err(unexpected(OP, other)),
    }
}

pub async fn create_comment<G>(
    github: &G,
    issue: IssueNumber,
    body: String,
) -> Result<CommentId, RepoError>
where
    G: GitHubInterpreter,
    G::Error: Display,
{
    const OP: &str = "create_comment";
    match run(github, OP, GitHubEffect::CreateComment { issue, body }).await? {
        GitHubResponse::CommentCreated { id } => Ok(id),
        other => Err(unexpected(OP, other)),
    }
}
