//! Wire shapes of GitHub issue JSON.
//!
//! Webhook payloads and REST responses describe issues identically, so both
//! the webhook parser and the API interpreter deserialize through these types.

use serde::Deserialize;

use crate::types::{Actor, ActorKind, Issue, IssueNumber, IssueState};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawUser {
    pub login: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl RawUser {
    pub fn into_actor(self) -> Actor {
        let kind = self
            .kind
            .as_deref()
            .map(ActorKind::from_github_type)
            .unwrap_or(ActorKind::User);
        Actor {
            login: self.login,
            kind,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawIssue {
    pub number: u64,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub assignees: Vec<RawUser>,
    pub user: RawUser,
    pub html_url: String,
    pub repository_url: String,
    #[serde(default)]
    pub body: Option<String>,
    /// Present only when the "issue" is a pull request.
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl RawIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Converts to the domain type. Fails only on an unknown `state`.
    ///
    /// The body is dropped; callers that need it take it first.
    pub fn into_issue(self) -> Result<Issue, String> {
        let state = match self.state.as_str() {
            "open" => IssueState::Open,
            "closed" => IssueState::Closed,
            other => return Err(format!("unknown issue state: {}", other)),
        };

        Ok(Issue {
            number: IssueNumber(self.number),
            state,
            labels: self.labels.into_iter().map(|label| label.name).collect(),
            assignees: self
                .assignees
                .into_iter()
                .map(|assignee| assignee.login)
                .collect(),
            author: self.user.into_actor(),
            html_url: self.html_url,
            repository_url: self.repository_url,
        })
    }
}
