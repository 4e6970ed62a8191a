//! Intent types for helper bot commands.
//!
//! These intents are parsed from GitHub issue bodies and issue comments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference to the pull request that fixes an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PullRequestRef {
    /// `#1234` or `PR #1234`
    Number(u64),
    /// A link to the pull request.
    Url(String),
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PullRequestRef::Number(n) => write!(f, "#{}", n),
            PullRequestRef::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A parsed command addressed to a helper bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Claims the issue: `@bot assign me`
    Assign,

    /// Releases the issue: `@bot unassign me`
    Unassign,

    /// Hands the work over for review: `@bot PR #1234 is ready for review`
    Ready { pull_request: Option<PullRequestRef> },

    /// Verification verdict: `@bot mark as pass`
    Pass,

    /// Verification verdict: `@bot mark as fail`
    Fail,

    /// Lists the supported commands: `@bot help`
    Help,

    /// `@bot add label: Bug, Typo`
    AddLabels(Vec<String>),

    /// `@bot remove label: Bug, Typo`
    RemoveLabels(Vec<String>),
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Assign => IntentKind::Assign,
            Intent::Unassign => IntentKind::Unassign,
            Intent::Ready { .. } => IntentKind::Ready,
            Intent::Pass => IntentKind::Pass,
            Intent::Fail => IntentKind::Fail,
            Intent::Help => IntentKind::Help,
            Intent::AddLabels(_) => IntentKind::AddLabels,
            Intent::RemoveLabels(_) => IntentKind::RemoveLabels,
        }
    }
}

/// The verb of an [`Intent`] without its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Assign,
    Unassign,
    Ready,
    Pass,
    Fail,
    Help,
    AddLabels,
    RemoveLabels,
}

impl IntentKind {
    /// The verb as users type it.
    pub fn verb(&self) -> &'static str {
        match self {
            IntentKind::Assign => "assign",
            IntentKind::Unassign => "unassign",
            IntentKind::Ready => "ready",
            IntentKind::Pass => "pass",
            IntentKind::Fail => "fail",
            IntentKind::Help => "help",
            IntentKind::AddLabels => "add label",
            IntentKind::RemoveLabels => "remove label",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// What the parser found in an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Utterance {
    /// The bot was not mentioned. Nothing should happen.
    NotAddressed,

    /// The bot was mentioned. `None` means no known verb followed the mention.
    Addressed(Option<Intent>),
}
