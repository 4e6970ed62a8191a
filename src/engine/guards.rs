//! Guard evaluation.

use crate::commands::Intent;
use crate::types::{Issue, IssueNumber};

use super::Rejection;
use super::rules::{CrossIssueCheck, Guard};

/// Runs `guards` in order; the first failure wins and later guards do not run.
pub fn check_guards(
    guards: &[Guard],
    issue: &Issue,
    actor: &str,
    intent: &Intent,
) -> Result<(), Rejection> {
    guards
        .iter()
        .try_for_each(|guard| guard.check(issue, actor, intent))
}

/// Decides whether the actor's other open issues block an assign.
///
/// `assigned` is every open issue assigned to the actor within the check's
/// scope; `current` is skipped.
pub fn check_cross_issue(
    check: &CrossIssueCheck,
    current: IssueNumber,
    assigned: &[Issue],
) -> Result<(), Rejection> {
    let others: Vec<&Issue> = assigned
        .iter()
        .filter(|issue| issue.number != current)
        .collect();

    let needs_feedback: Vec<String> = check
        .feedback_label
        .as_deref()
        .map(|label| {
            others
                .iter()
                .filter(|issue| issue.has_label(label))
                .map(|issue| issue.html_url.clone())
                .collect()
        })
        .unwrap_or_default();

    let in_progress: Vec<String> = others
        .iter()
        .filter(|issue| {
            !check
                .settled_labels
                .iter()
                .any(|label| issue.has_label(label))
        })
        .map(|issue| issue.html_url.clone())
        .collect();

    if check.feedback_blocks && !needs_feedback.is_empty() {
        return Err(Rejection::FeedbackPending {
            urls: needs_feedback,
        });
    }
    if !in_progress.is_empty() {
        return Err(Rejection::InProgressElsewhere { urls: in_progress });
    }
    Ok(())
}
