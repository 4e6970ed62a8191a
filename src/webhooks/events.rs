//! Typed webhook events.
//!
//! The helper bots react to two deliveries:
//!
//! - `issues` with action `opened` - the command is in the issue body
//! - `issue_comment` with action `created` - the command is in the comment
//!
//! Both are normalized into a [`CommandEvent`].

use serde::{Deserialize, Serialize};

use crate::types::{Actor, Issue, RepoId};

/// Which delivery produced a command event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `issues` / `opened`
    IssueOpened,
    /// `issue_comment` / `created`
    CommentCreated,
}

/// A piece of user text attached to an issue, with everything needed to
/// interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    /// Resolved from the issue's `repository_url`.
    pub repo: RepoId,
    pub kind: EventKind,
    /// The issue as the payload describes it.
    pub issue: Issue,
    /// The comment author, or the issue author for `IssueOpened`.
    pub actor: Actor,
    /// The comment or issue body. Empty when GitHub sends `null`.
    pub body: String,
}
