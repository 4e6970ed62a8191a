//! Declarative transition rules.
//!
//! Each supported intent maps to one [`TransitionRule`]: the guards that must
//! hold, the label edit, the assignee change and, for `assign`, the
//! cross-issue check. Rules are derived from a [`BotConfig`], so the three
//! bots share one engine and differ only in their label vocabulary.

use crate::commands::{Intent, IntentKind};
use crate::config::BotConfig;
use crate::engine::Rejection;
use crate::types::{Issue, LabelRole};

/// Guards run grouped by stage, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuardStage {
    /// Who is asking.
    Identity,
    /// Whether the command carries what it needs.
    Argument,
    /// Whether the issue is in a state that allows the command.
    IssueState,
}

/// A precondition on the actor, the command or the issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    ActorIsCreator,
    ActorIsAssignee,
    /// Label commands must name at least one label.
    LabelsPresent,
    /// The issue carries the event label.
    InEvent(String),
    IssueOpen,
    /// The issue carries the open-for-pickup label.
    OpenForPickup(String),
    /// Nobody but the actor is assigned.
    Unclaimed,
    /// The issue does not carry the accepted label.
    NotAccepted(String),
}

impl Guard {
    pub fn stage(&self) -> GuardStage {
        match self {
            Guard::ActorIsCreator | Guard::ActorIsAssignee => GuardStage::Identity,
            Guard::LabelsPresent => GuardStage::Argument,
            Guard::InEvent(_)
            | Guard::IssueOpen
            | Guard::OpenForPickup(_)
            | Guard::Unclaimed
            | Guard::NotAccepted(_) => GuardStage::IssueState,
        }
    }

    /// Evaluates the guard, returning the rejection it stands for on failure.
    pub fn check(&self, issue: &Issue, actor: &str, intent: &Intent) -> Result<(), Rejection> {
        let rejection = match self {
            Guard::ActorIsCreator if !issue.is_created_by(actor) => Rejection::NotCreator,
            Guard::ActorIsAssignee if !issue.is_assigned_to(actor) => Rejection::NotAssignee,
            Guard::LabelsPresent => match intent {
                Intent::AddLabels(labels) | Intent::RemoveLabels(labels) if labels.is_empty() => {
                    Rejection::MissingLabels
                }
                _ => return Ok(()),
            },
            Guard::InEvent(label) if !issue.has_label(label) => Rejection::NotIncluded,
            Guard::IssueOpen if !issue.state.is_open() => Rejection::IssueClosed,
            Guard::OpenForPickup(label) if !issue.has_label(label) => Rejection::NotOpenForPickup,
            Guard::Unclaimed => match issue.other_assignee(actor) {
                Some(assignee) => Rejection::AlreadyClaimed {
                    assignee: assignee.to_string(),
                },
                None => return Ok(()),
            },
            Guard::NotAccepted(label) if issue.has_label(label) => Rejection::AlreadyAccepted,
            _ => return Ok(()),
        };
        Err(rejection)
    }
}

/// What happens to the issue's assignees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeChange {
    Keep,
    SetToActor,
    Clear,
}

/// How the issue's labels change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelEdit {
    /// Workflow transition: remove `strip`, then append `add`.
    Stage { strip: Vec<String>, add: Vec<String> },
    /// Append the requested labels the repository defines.
    AddRequested,
    /// Remove the requested labels the issue carries.
    RemoveRequested,
}

/// The "one issue at a time" check run before an assign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossIssueCheck {
    /// Restricts the search for the actor's other issues.
    pub scope_label: Option<String>,
    /// Issues with this label are waiting on fixes.
    pub feedback_label: Option<String>,
    /// Issues with any of these labels are not in progress.
    pub settled_labels: Vec<String>,
    /// Pending feedback is reported ahead of unfinished work.
    pub feedback_blocks: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    pub kind: IntentKind,
    /// Sorted by [`GuardStage`].
    pub guards: Vec<Guard>,
    pub labels: LabelEdit,
    pub assignees: AssigneeChange,
    pub cross_issue: Option<CrossIssueCheck>,
}

impl TransitionRule {
    fn new(
        kind: IntentKind,
        mut guards: Vec<Guard>,
        labels: LabelEdit,
        assignees: AssigneeChange,
        cross_issue: Option<CrossIssueCheck>,
    ) -> Self {
        // Stable: guards of one stage keep their declared order.
        guards.sort_by_key(Guard::stage);
        TransitionRule {
            kind,
            guards,
            labels,
            assignees,
            cross_issue,
        }
    }

    /// The rule for an intent under a bot's configuration.
    ///
    /// `Help` has no rule. Roles missing from the vocabulary drop out of
    /// guards and label edits.
    pub fn for_intent(kind: IntentKind, config: &BotConfig) -> Option<TransitionRule> {
        let vocab = &config.labels;
        let names = |roles: &[LabelRole]| -> Vec<String> {
            vocab.names_for(roles).map(str::to_string).collect()
        };
        let label = |role: LabelRole| vocab.name(role).map(str::to_string);
        let assignee_guards = || {
            let mut guards = vec![Guard::ActorIsAssignee];
            guards.extend(label(LabelRole::Accepted).map(Guard::NotAccepted));
            guards
        };

        let rule = match kind {
            IntentKind::Help => return None,

            IntentKind::Assign => {
                let mut guards = Vec::new();
                guards.extend(config.event_label.clone().map(Guard::InEvent));
                guards.push(Guard::IssueOpen);
                guards.extend(label(LabelRole::OpenForPickup).map(Guard::OpenForPickup));
                guards.push(Guard::Unclaimed);

                let cross_issue = CrossIssueCheck {
                    scope_label: config
                        .event_label
                        .clone()
                        .or_else(|| label(LabelRole::Assigned)),
                    feedback_label: label(LabelRole::Feedback),
                    settled_labels: names(&[
                        LabelRole::Accepted,
                        LabelRole::Feedback,
                        LabelRole::ReadyForReview,
                    ]),
                    feedback_blocks: config.feedback_blocks_pickup,
                };

                TransitionRule::new(
                    kind,
                    guards,
                    LabelEdit::Stage {
                        strip: names(&[LabelRole::OpenForPickup]),
                        add: names(&[LabelRole::Assigned]),
                    },
                    AssigneeChange::SetToActor,
                    Some(cross_issue),
                )
            }

            IntentKind::Unassign => TransitionRule::new(
                kind,
                assignee_guards(),
                LabelEdit::Stage {
                    strip: vocab.stage_names().map(str::to_string).collect(),
                    add: names(&[LabelRole::OpenForPickup]),
                },
                AssigneeChange::Clear,
                None,
            ),

            IntentKind::Ready => TransitionRule::new(
                kind,
                assignee_guards(),
                LabelEdit::Stage {
                    strip: names(&[
                        LabelRole::ReadyForReview,
                        LabelRole::Feedback,
                        LabelRole::OpenForPickup,
                    ]),
                    add: names(&[LabelRole::ReadyForReview]),
                },
                AssigneeChange::Keep,
                None,
            ),

            IntentKind::Pass | IntentKind::Fail => {
                let (verdict, opposite) = if kind == IntentKind::Pass {
                    (LabelRole::Pass, LabelRole::Fail)
                } else {
                    (LabelRole::Fail, LabelRole::Pass)
                };
                TransitionRule::new(
                    kind,
                    assignee_guards(),
                    LabelEdit::Stage {
                        strip: names(&[
                            LabelRole::ReadyForReview,
                            LabelRole::Feedback,
                            LabelRole::OpenForPickup,
                            opposite,
                        ]),
                        add: names(&[LabelRole::ReadyForReview, verdict]),
                    },
                    AssigneeChange::Keep,
                    None,
                )
            }

            IntentKind::AddLabels => TransitionRule::new(
                kind,
                vec![Guard::ActorIsCreator, Guard::LabelsPresent],
                LabelEdit::AddRequested,
                AssigneeChange::Keep,
                None,
            ),

            IntentKind::RemoveLabels => TransitionRule::new(
                kind,
                vec![Guard::ActorIsCreator, Guard::LabelsPresent],
                LabelEdit::RemoveRequested,
                AssigneeChange::Keep,
                None,
            ),
        };

        Some(rule)
    }
}
