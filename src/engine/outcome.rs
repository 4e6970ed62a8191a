//! What a handler decided. The response composer turns these into replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commands::{IntentKind, PullRequestRef};

/// Why a command was refused. No mutation happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    /// Label commands are reserved to the issue creator.
    NotCreator,
    NotAssignee,
    /// The issue lacks the event label.
    NotIncluded,
    IssueClosed,
    NotOpenForPickup,
    /// Somebody else is assigned.
    AlreadyClaimed { assignee: String },
    AlreadyAccepted,
    /// The actor owns unfinished issues (URLs listed).
    InProgressElsewhere { urls: Vec<String> },
    /// The actor owns issues waiting on fixes (URLs listed).
    FeedbackPending { urls: Vec<String> },
    /// A label command without any label names.
    MissingLabels,
    /// None of the requested labels exist in the repository.
    NoKnownLabels { requested: Vec<String> },
    /// None of the requested labels are on the issue.
    NoAssignedLabels { requested: Vec<String> },
}

/// The result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Help was requested, or the bot cannot handle the verb it was given.
    Help { unsupported: Option<IntentKind> },

    Assigned {
        hours: u32,
        deadline: DateTime<Utc>,
    },

    Unassigned,

    MarkedReady {
        label: String,
        pull_request: Option<PullRequestRef>,
    },

    /// Marked as pass or fail; `label` is the verdict label.
    Verdict { label: String },

    /// `unknown` lists requested labels the repository does not define.
    LabelsAdded {
        added: Vec<String>,
        unknown: Vec<String>,
    },

    /// `ignored` lists requested labels the issue did not carry.
    LabelsRemoved {
        removed: Vec<String>,
        ignored: Vec<String>,
    },

    Rejected(Rejection),

    /// A GitHub call failed. The user is asked to try again.
    Failed { error: String },
}

impl Outcome {
    /// Whether the issue was changed.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::Assigned { .. }
                | Outcome::Unassigned
                | Outcome::MarkedReady { .. }
                | Outcome::Verdict { .. }
                | Outcome::LabelsAdded { .. }
                | Outcome::LabelsRemoved { .. }
        )
    }
}

impl From<Rejection> for Outcome {
    fn from(rejection: Rejection) -> Self {
        Outcome::Rejected(rejection)
    }
}
