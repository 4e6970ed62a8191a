//! Issue and actor types.
//!
//! An [`Issue`] is always a snapshot: it comes either from the webhook payload
//! or from a fresh read, and it is never cached across events.

use serde::{Deserialize, Serialize};

use super::ids::IssueNumber;
use super::labels::LabelSet;

/// Whether an issue is open or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn is_open(&self) -> bool {
        matches!(self, IssueState::Open)
    }
}

/// What kind of account an actor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    User,
    Bot,
}

impl ActorKind {
    /// Maps GitHub's `user.type` field. Only `"Bot"` is automation.
    pub fn from_github_type(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("bot") {
            ActorKind::Bot
        } else {
            ActorKind::User
        }
    }
}

/// A GitHub account that authored an issue or comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
    pub kind: ActorKind,
}

impl Actor {
    pub fn user(login: impl Into<String>) -> Self {
        Actor {
            login: login.into(),
            kind: ActorKind::User,
        }
    }

    pub fn bot(login: impl Into<String>) -> Self {
        Actor {
            login: login.into(),
            kind: ActorKind::Bot,
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.kind, ActorKind::Bot)
    }
}

/// An issue as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: IssueNumber,
    pub state: IssueState,
    /// Label names in the order GitHub reports them.
    pub labels: LabelSet,
    /// Logins of the current assignees.
    pub assignees: Vec<String>,
    /// The issue creator.
    pub author: Actor,
    /// Browser URL of the issue, used when listing blocking issues.
    pub html_url: String,
    /// API URL of the owning repository (`https://api.github.com/repos/{owner}/{repo}`).
    pub repository_url: String,
}

impl Issue {
    pub fn is_assigned_to(&self, login: &str) -> bool {
        self.assignees
            .iter()
            .any(|assignee| assignee.eq_ignore_ascii_case(login))
    }

    pub fn is_created_by(&self, login: &str) -> bool {
        self.author.login.eq_ignore_ascii_case(login)
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.contains(name)
    }

    /// The first assignee other than `login`, if any.
    pub fn other_assignee(&self, login: &str) -> Option<&str> {
        self.assignees
            .iter()
            .find(|assignee| !assignee.eq_ignore_ascii_case(login))
            .map(String::as_str)
    }
}
