//! Executes a [`TransitionRule`] against GitHub.
//!
//! The flow for every state-changing command:
//!
//! 1. Guards on the payload snapshot
//! 2. Cross-issue check (assign only)
//! 3. Repository labels (add label only)
//! 4. Re-read the issue and run the guards again on the fresh copy
//! 5. One update computed from the fresh copy
//!
//! Any GitHub failure ends the command with [`Outcome::Failed`]; nothing is
//! re-run.

use std::fmt::Display;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info};

use crate::commands::Intent;
use crate::config::BotConfig;
use crate::effects::{GitHubInterpreter, IssueFilter, IssueUpdate};
use crate::repo::{self, RepoError};
use crate::types::LabelRole;
use crate::webhooks::CommandEvent;

use super::guards::{check_cross_issue, check_guards};
use super::outcome::{Outcome, Rejection};
use super::rules::{AssigneeChange, LabelEdit, TransitionRule};
use super::transitions::{next_labels, partition_known, partition_present};

/// Everything a rule needs besides GitHub.
pub(crate) struct RuleInput<'a> {
    pub config: &'a BotConfig,
    pub rule: &'a TransitionRule,
    pub event: &'a CommandEvent,
    pub intent: &'a Intent,
    /// Start of the completion window for assignments.
    pub now: DateTime<Utc>,
}

/// Why a rule stopped early.
enum Halt {
    Rejected(Rejection),
    Failed(RepoError),
}

impl From<Rejection> for Halt {
    fn from(rejection: Rejection) -> Self {
        Halt::Rejected(rejection)
    }
}

impl From<RepoError> for Halt {
    fn from(error: RepoError) -> Self {
        Halt::Failed(error)
    }
}

/// Labels resolved before the write, reported back in the outcome.
#[derive(Default)]
struct Resolved {
    /// Add label: the requested labels the repository defines.
    known: Vec<String>,
    unknown: Vec<String>,
    /// Remove label: the requested labels the issue carries.
    present: Vec<String>,
    absent: Vec<String>,
}

pub(crate) async fn apply_rule<G>(github: &G, input: RuleInput<'_>) -> Outcome
where
    G: GitHubInterpreter + Sync,
    G::Error: Display,
{
    let event = input.event;
    let kind = input.rule.kind;

    match try_apply(github, &input).await {
        Ok(outcome) => {
            info!(
                repo = %event.repo,
                issue = %event.issue.number,
                actor = %event.actor.login,
                intent = %kind,
                "Command applied"
            );
            outcome
        }
        Err(Halt::Rejected(rejection)) => {
            debug!(
                repo = %event.repo,
                issue = %event.issue.number,
                actor = %event.actor.login,
                intent = %kind,
                ?rejection,
                "Command rejected"
            );
            Outcome::Rejected(rejection)
        }
        Err(Halt::Failed(e)) => {
            error!(
                repo = %event.repo,
                issue = %event.issue.number,
                actor = %event.actor.login,
                intent = %kind,
                error = %e,
                "Command failed"
            );
            Outcome::Failed {
                error: e.to_string(),
            }
        }
    }
}

async fn try_apply<G>(github: &G, input: &RuleInput<'_>) -> Result<Outcome, Halt>
where
    G: GitHubInterpreter + Sync,
    G::Error: Display,
{
    let RuleInput {
        config,
        rule,
        event,
        intent,
        now,
    } = *input;
    let actor = event.actor.login.as_str();

    check_guards(&rule.guards, &event.issue, actor, intent)?;

    if let Some(check) = &rule.cross_issue {
        let filter = IssueFilter {
            labels: check.scope_label.iter().cloned().collect(),
            assignee: Some(actor.to_string()),
        };
        let assigned = repo::list_open_issues(github, filter).await?;
        check_cross_issue(check, event.issue.number, &assigned)?;
    }

    let mut resolved = Resolved::default();
    if let (LabelEdit::AddRequested, Intent::AddLabels(requested)) = (&rule.labels, intent) {
        let repository = repo::list_labels(github).await?;
        (resolved.known, resolved.unknown) = partition_known(requested, &repository);
        if resolved.known.is_empty() {
            return Err(Rejection::NoKnownLabels {
                requested: requested.clone(),
            }
            .into());
        }
    }

    let fresh = repo::get_issue(github, event.issue.number).await?;
    check_guards(&rule.guards, &fresh, actor, intent)?;

    let labels = match &rule.labels {
        LabelEdit::Stage { strip, add } => next_labels(&fresh.labels, strip, add),
        LabelEdit::AddRequested => next_labels(&fresh.labels, &[], &resolved.known),
        LabelEdit::RemoveRequested => {
            let requested: &[String] = match intent {
                Intent::RemoveLabels(requested) => requested.as_slice(),
                _ => &[],
            };
            (resolved.present, resolved.absent) = partition_present(requested, &fresh.labels);
            if resolved.present.is_empty() {
                return Err(Rejection::NoAssignedLabels {
                    requested: requested.to_vec(),
                }
                .into());
            }
            next_labels(&fresh.labels, &resolved.present, &[])
        }
    };

    let assignees = match rule.assignees {
        AssigneeChange::Keep => None,
        AssigneeChange::SetToActor => Some(vec![actor.to_string()]),
        AssigneeChange::Clear => Some(Vec::new()),
    };

    let update = IssueUpdate {
        labels: Some(labels),
        assignees,
    };
    repo::update_issue(github, fresh.number, update).await?;

    Ok(success(config, intent, now, resolved))
}

fn success(config: &BotConfig, intent: &Intent, now: DateTime<Utc>, resolved: Resolved) -> Outcome {
    let label = |role: LabelRole| config.labels.name(role).unwrap_or_default().to_string();

    match intent {
        Intent::Assign => Outcome::Assigned {
            hours: config.completion_hours,
            deadline: now
                .checked_add_signed(Duration::hours(i64::from(config.completion_hours)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        },
        Intent::Unassign => Outcome::Unassigned,
        Intent::Ready { pull_request } => Outcome::MarkedReady {
            label: label(LabelRole::ReadyForReview),
            pull_request: pull_request.clone(),
        },
        Intent::Pass => Outcome::Verdict {
            label: label(LabelRole::Pass),
        },
        Intent::Fail => Outcome::Verdict {
            label: label(LabelRole::Fail),
        },
        Intent::AddLabels(_) => Outcome::LabelsAdded {
            added: resolved.known,
            unknown: resolved.unknown,
        },
        Intent::RemoveLabels(_) => Outcome::LabelsRemoved {
            removed: resolved.present,
            ignored: resolved.absent,
        },
        // Help has no rule; dispatch answers it directly.
        Intent::Help => Outcome::Help { unsupported: None },
    }
}
