//! GitHub webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`CommandEvent`] values.
//! The parser is robust against unknown fields and event types.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types and actions return `Ok(None)` (ignored, not error)
//! 4. Malformed payloads return `Err` with details
//!
//! Comments on pull requests arrive as `issue_comment` too; they are ignored.

use serde::Deserialize;
use thiserror::Error;

use crate::github::payload::{RawIssue, RawUser};
use crate::repo::{ResolutionError, resolve_repository};

use super::events::{CommandEvent, EventKind};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value (e.g., unknown issue state).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    /// The owning repository cannot be derived from the issue.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// Parses a webhook payload into a command event.
///
/// # Arguments
///
/// * `event_type` - The value of the `X-GitHub-Event` header
/// * `payload` - The raw JSON payload bytes
///
/// # Returns
///
/// * `Ok(Some(event))` - An opened issue or a created comment
/// * `Ok(None)` - Anything else (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use bug_helpers::webhooks::{parse_webhook, EventKind};
///
/// let payload = br#"{
///     "action": "created",
///     "comment": {
///         "body": "@bug-bash-helper assign me",
///         "user": { "login": "octocat", "type": "User" }
///     },
///     "issue": {
///         "number": 42,
///         "state": "open",
///         "labels": [{ "name": "CF-20" }],
///         "assignees": [],
///         "user": { "login": "reporter", "type": "User" },
///         "html_url": "https://github.com/owner/repo/issues/42",
///         "repository_url": "https://api.github.com/repos/owner/repo"
///     }
/// }"#;
///
/// let event = parse_webhook("issue_comment", payload).unwrap().unwrap();
/// assert_eq!(event.kind, EventKind::CommentCreated);
/// assert_eq!(event.actor.login, "octocat");
/// assert_eq!(event.repo.to_string(), "owner/repo");
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<CommandEvent>, ParseError> {
    match event_type {
        "issues" => parse_issues(payload),
        "issue_comment" => parse_issue_comment(payload),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

#[derive(Debug, Deserialize)]
struct RawIssuesPayload {
    action: String,
    issue: RawIssue,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    #[serde(default)]
    body: Option<String>,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
}

fn parse_issues(payload: &[u8]) -> Result<Option<CommandEvent>, ParseError> {
    let raw: RawIssuesPayload = serde_json::from_slice(payload)?;
    if raw.action != "opened" {
        return Ok(None);
    }

    let mut issue = raw.issue;
    let body = issue.body.take().unwrap_or_default();
    let actor = issue.user.clone().into_actor();

    build_event(EventKind::IssueOpened, issue, actor, body).map(Some)
}

fn parse_issue_comment(payload: &[u8]) -> Result<Option<CommandEvent>, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;
    if raw.action != "created" || raw.issue.is_pull_request() {
        return Ok(None);
    }

    let body = raw.comment.body.unwrap_or_default();
    let actor = raw.comment.user.into_actor();

    build_event(EventKind::CommentCreated, raw.issue, actor, body).map(Some)
}

fn build_event(
    kind: EventKind,
    issue: RawIssue,
    actor: crate::types::Actor,
    body: String,
) -> Result<CommandEvent, ParseError> {
    let repo = resolve_repository(&issue.repository_url)?;
    let issue = issue.into_issue().map_err(|value| ParseError::InvalidField {
        field: "issue.state",
        value,
    })?;

    Ok(CommandEvent {
        repo,
        kind,
        issue,
        actor,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IssueNumber, RepoId};
    use serde_json::json;

    fn issue_json() -> serde_json::Value {
        json!({
            "number": 42,
            "state": "open",
            "labels": [{"name": "CF-20"}, {"name": "Open for Pickup"}],
            "assignees": [],
            "user": {"login": "reporter", "type": "User"},
            "html_url": "https://github.com/owner/repo/issues/42",
            "repository_url": "https://api.github.com/repos/owner/repo",
            "body": "@bug-hunt-helper add label: Bug"
        })
    }

    fn bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn parse_issue_comment_created() {
        let payload = bytes(json!({
            "action": "created",
            "comment": {
                "id": 1,
                "body": "@bug-bash-helper assign me",
                "user": {"login": "alice", "type": "User"}
            },
            "issue": issue_json(),
        }));

        let event = parse_webhook("issue_comment", &payload).unwrap().unwrap();
        assert_eq!(event.kind, EventKind::CommentCreated);
        assert_eq!(event.repo, RepoId::new("owner", "repo"));
        assert_eq!(event.issue.number, IssueNumber(42));
        assert_eq!(event.actor.login, "alice");
        assert_eq!(event.body, "@bug-bash-helper assign me");
        assert!(event.issue.has_label("Open for Pickup"));
    }

    #[test]
    fn parse_issue_opened_uses_issue_body_and_author() {
        let payload = bytes(json!({"action": "opened", "issue": issue_json()}));

        let event = parse_webhook("issues", &payload).unwrap().unwrap();
        assert_eq!(event.kind, EventKind::IssueOpened);
        assert_eq!(event.actor.login, "reporter");
        assert_eq!(event.body, "@bug-hunt-helper add label: Bug");
    }

    #[test]
    fn other_actions_are_ignored() {
        let edited = bytes(json!({"action": "edited", "issue": issue_json()}));
        assert!(parse_webhook("issues", &edited).unwrap().is_none());

        let deleted = bytes(json!({
            "action": "deleted",
            "comment": {"body": "x", "user": {"login": "alice"}},
            "issue": issue_json(),
        }));
        assert!(parse_webhook("issue_comment", &deleted).unwrap().is_none());
    }

    #[test]
    fn comments_on_pull_requests_are_ignored() {
        let mut issue = issue_json();
        issue["pull_request"] = json!({"url": "https://api.github.com/repos/owner/repo/pulls/42"});
        let payload = bytes(json!({
            "action": "created",
            "comment": {"body": "@bug-bash-helper assign me", "user": {"login": "alice"}},
            "issue": issue,
        }));
        assert!(parse_webhook("issue_comment", &payload).unwrap().is_none());
    }

    #[test]
    fn null_body_becomes_empty() {
        let mut issue = issue_json();
        issue["body"] = serde_json::Value::Null;
        let payload = bytes(json!({"action": "opened", "issue": issue}));
        let event = parse_webhook("issues", &payload).unwrap().unwrap();
        assert_eq!(event.body, "");
    }

    #[test]
    fn bot_comments_are_marked() {
        let payload = bytes(json!({
            "action": "created",
            "comment": {
                "body": "@bug-bash-helper help",
                "user": {"login": "bug-bash-helper[bot]", "type": "Bot"}
            },
            "issue": issue_json(),
        }));
        let event = parse_webhook("issue_comment", &payload).unwrap().unwrap();
        assert!(event.actor.is_bot());
    }

    #[test]
    fn unknown_event_type_returns_none() {
        assert!(parse_webhook("push", b"{}").unwrap().is_none());
        assert!(parse_webhook("pull_request", b"not json").unwrap().is_none());
    }

    #[test]
    fn malformed_json_returns_error() {
        assert!(matches!(
            parse_webhook("issue_comment", b"{not json"),
            Err(ParseError::JsonError(_))
        ));
        assert!(matches!(
            parse_webhook("issues", br#"{"action": "opened"}"#),
            Err(ParseError::JsonError(_))
        ));
    }

    #[test]
    fn unresolvable_repository_is_an_error() {
        let mut issue = issue_json();
        issue["repository_url"] = json!("repo");
        let payload = bytes(json!({"action": "opened", "issue": issue}));
        assert!(matches!(
            parse_webhook("issues", &payload),
            Err(ParseError::Resolution(_))
        ));
    }

    #[test]
    fn invalid_state_returns_error() {
        let mut issue = issue_json();
        issue["state"] = json!("archived");
        let payload = bytes(json!({"action": "opened", "issue": issue}));
        assert!(matches!(
            parse_webhook("issues", &payload),
            Err(ParseError::InvalidField { field: "issue.state", .. })
        ));
    }
}
