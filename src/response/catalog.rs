//! Message templates and help entries.
//!
//! Replies are rendered from `{placeholder}` templates. Every bot shares the
//! same default wording; a catalog carries per-bot overrides, the help
//! entries for the commands the bot supports, and the shared values (event
//! name, support team, tone markers).

use std::collections::BTreeMap;

use crate::commands::IntentKind;
use crate::config::Variant;

/// Identifies one template in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKey {
    AssignSuccess,
    UnassignSuccess,
    ReadySuccess,
    VerdictSuccess,
    LabelsAdded,
    LabelsAddedPartial,
    LabelsRemoved,
    LabelsRemovedPartial,
    PickupRules,
    PickupRulesInEvent,
    NotIncluded,
    IssueClosed,
    NotOpenForPickup,
    AlreadyClaimed,
    AlreadyAccepted,
    InProgressElsewhere,
    FeedbackPending,
    NotAssignee,
    NotCreator,
    MissingLabels,
    NoKnownLabels,
    NoAssignedLabels,
    Failure,
    HelpGreeting,
    UnsupportedNote,
}

/// How a reply reads, used to pick the marker in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTone {
    Success,
    Partial,
    Rejection,
    Failure,
    /// Help and fragments embedded in other messages.
    Neutral,
}

impl MessageKey {
    pub const ALL: [MessageKey; 25] = [
        MessageKey::AssignSuccess,
        MessageKey::UnassignSuccess,
        MessageKey::ReadySuccess,
        MessageKey::VerdictSuccess,
        MessageKey::LabelsAdded,
        MessageKey::LabelsAddedPartial,
        MessageKey::LabelsRemoved,
        MessageKey::LabelsRemovedPartial,
        MessageKey::PickupRules,
        MessageKey::PickupRulesInEvent,
        MessageKey::NotIncluded,
        MessageKey::IssueClosed,
        MessageKey::NotOpenForPickup,
        MessageKey::AlreadyClaimed,
        MessageKey::AlreadyAccepted,
        MessageKey::InProgressElsewhere,
        MessageKey::FeedbackPending,
        MessageKey::NotAssignee,
        MessageKey::NotCreator,
        MessageKey::MissingLabels,
        MessageKey::NoKnownLabels,
        MessageKey::NoAssignedLabels,
        MessageKey::Failure,
        MessageKey::HelpGreeting,
        MessageKey::UnsupportedNote,
    ];

    /// Suffix of the `{PREFIX}_MESSAGE_*` variable overriding this template.
    pub fn env_suffix(&self) -> &'static str {
        use MessageKey::*;
        match self {
            AssignSuccess => "ASSIGN_SUCCESS",
            UnassignSuccess => "UNASSIGN_SUCCESS",
            ReadySuccess => "READY_SUCCESS",
            VerdictSuccess => "VERDICT_SUCCESS",
            LabelsAdded => "LABELS_ADDED",
            LabelsAddedPartial => "LABELS_ADDED_PARTIAL",
            LabelsRemoved => "LABELS_REMOVED",
            LabelsRemovedPartial => "LABELS_REMOVED_PARTIAL",
            PickupRules => "PICKUP_RULES",
            PickupRulesInEvent => "PICKUP_RULES_IN_EVENT",
            NotIncluded => "NOT_INCLUDED",
            IssueClosed => "ISSUE_CLOSED",
            NotOpenForPickup => "NOT_OPEN_FOR_PICKUP",
            AlreadyClaimed => "ALREADY_CLAIMED",
            AlreadyAccepted => "ALREADY_ACCEPTED",
            InProgressElsewhere => "IN_PROGRESS_ELSEWHERE",
            FeedbackPending => "FEEDBACK_PENDING",
            NotAssignee => "NOT_ASSIGNEE",
            NotCreator => "NOT_CREATOR",
            MissingLabels => "MISSING_LABELS",
            NoKnownLabels => "NO_KNOWN_LABELS",
            NoAssignedLabels => "NO_ASSIGNED_LABELS",
            Failure => "FAILURE",
            HelpGreeting => "HELP_GREETING",
            UnsupportedNote => "UNSUPPORTED_NOTE",
        }
    }

    pub fn tone(&self) -> ReplyTone {
        use MessageKey::*;
        match self {
            AssignSuccess | UnassignSuccess | ReadySuccess | VerdictSuccess | LabelsAdded
            | LabelsRemoved => ReplyTone::Success,
            LabelsAddedPartial | LabelsRemovedPartial => ReplyTone::Partial,
            NotIncluded | IssueClosed | NotOpenForPickup | AlreadyClaimed | AlreadyAccepted
            | InProgressElsewhere | FeedbackPending | NotAssignee | NotCreator | MissingLabels
            | NoKnownLabels | NoAssignedLabels => ReplyTone::Rejection,
            Failure => ReplyTone::Failure,
            PickupRules | PickupRulesInEvent | HelpGreeting | UnsupportedNote => {
                ReplyTone::Neutral
            }
        }
    }

    /// The wording used unless a catalog overrides it.
    pub fn default_template(&self) -> &'static str {
        use MessageKey::*;
        match self {
            AssignSuccess => {
                "you are now assigned to this issue and have {hours} hours to complete it \
                 (until {deadline}).\n\n{next_steps}"
            }
            UnassignSuccess => {
                "you have been unassigned from this issue.\n\n\
                 Now you may pick up another issue which is open for pickup if you like to."
            }
            ReadySuccess => {
                "this issue is marked as `{label}`{pull_request}.\n\n\
                 Now you may pick up another issue which is open for pickup if you like to."
            }
            VerdictSuccess => {
                "this issue is marked as `{label}` and is ready for review.\n\n\
                 Now you may pick up another issue which is open for pickup if you like to."
            }
            LabelsAdded => "Labels have been successfully added.",
            LabelsAddedPartial => {
                "Some labels have been successfully added.\n\
                 Though the next labels have not been added, because they are not listed at \
                 this repo: \"{labels}\", see the [list]({labels_url})."
            }
            LabelsRemoved => "Labels have been successfully removed.",
            LabelsRemovedPartial => {
                "Some labels have been removed.\n\
                 Though some labels were ignored, as they are not assigned to this issue: \
                 \"{labels}\"."
            }
            PickupRules => {
                "You may only pickup issues which are open for pick up.\n\
                 Such issues have open status and label `{pickup_label}`."
            }
            PickupRulesInEvent => {
                "You may only pickup issues which are included in this {event_name} and open \
                 for pick up.\n\
                 Such issues have open status and have labels `{event_label}` and \
                 `{pickup_label}`."
            }
            NotIncluded => "this issue is not included in the {event_name}.\n\n{pickup_rules}",
            IssueClosed => "this issue is closed and cannot be picked up.\n\n{pickup_rules}",
            NotOpenForPickup => "this issue is not open for pick up.\n\n{pickup_rules}",
            AlreadyClaimed => {
                "this issue is already assigned to @{assignee} and cannot be picked up.\n\n\
                 {pickup_rules}"
            }
            AlreadyAccepted => {
                "I cannot {action} because it's already \"accepted\".\n\n\
                 Most likely you don't want to change the issue which is already accepted, but \
                 in case you do, please reach to someone from {support_team} to assist you."
            }
            InProgressElsewhere => {
                "you have some issues assigned which are not completed yet, see {issues}.\n\n\
                 As per our {event_name} rules you may work only at one issue at a time.\n\
                 Please, complete other issues first or unassign yourself before picking up a \
                 new issue."
            }
            FeedbackPending => {
                "you have some issues which require fixes, see {issues}.\n\n\
                 As per our {event_name} rules you should give the priority to the issues with \
                 feedback.\n\
                 Please, complete other issues first as per feedback provided or unassign \
                 yourself before picking up a new issue."
            }
            NotAssignee => "I cannot {action} because you are not assigned to this issue.",
            NotCreator => "I cannot {action} because you didn't create this issue.",
            MissingLabels => "Cannot find labels to {verb} in the comment.\n\n{usage}",
            NoKnownLabels => {
                "No labels have been added.\n\
                 You may only add labels listed on the repository, see the [list]({labels_url})."
            }
            NoAssignedLabels => {
                "No labels have been removed.\n\
                 There are no such labels assigned to this issue: \"{labels}\"."
            }
            Failure => {
                "Some error happened when trying to {action}, please try one more time or \
                 contact someone from {support_team} to assist you."
            }
            HelpGreeting => "Hi @{actor}.",
            UnsupportedNote => "I cannot `{verb}` on this issue. Here is what I can do:",
        }
    }
}

/// Markers prepended to replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// No markers.
    Plain,
    /// ✅ for success, ⚠️ for partial success, 🛑 for rejections and failures.
    Emoji,
}

impl Tone {
    pub fn marker(&self, tone: ReplyTone) -> &'static str {
        match (self, tone) {
            (Tone::Plain, _) | (Tone::Emoji, ReplyTone::Neutral) => "",
            (Tone::Emoji, ReplyTone::Success) => "✅ ",
            (Tone::Emoji, ReplyTone::Partial) => "⚠️ ",
            (Tone::Emoji, ReplyTone::Rejection | ReplyTone::Failure) => "🛑 ",
        }
    }
}

/// One section of the help reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHelp {
    /// The intents this section documents.
    pub intents: Vec<IntentKind>,
    pub title: String,
    pub description: String,
    /// Invocations without the mention, e.g. `assign me`.
    pub examples: Vec<String>,
}

impl CommandHelp {
    fn new(intents: &[IntentKind], title: &str, description: &str, examples: &[&str]) -> Self {
        CommandHelp {
            intents: intents.to_vec(),
            title: title.to_string(),
            description: description.to_string(),
            examples: examples.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn documents(&self, kind: IntentKind) -> bool {
        self.intents.contains(&kind)
    }

    /// The description followed by fenced examples addressed to `bot`.
    pub fn usage(&self, bot: &str) -> String {
        let examples = self
            .examples
            .iter()
            .map(|example| format!("```\n@{} {}\n```", bot, example))
            .collect::<Vec<_>>()
            .join("\n\nor\n\n");
        format!("{}\n{}", self.description, examples)
    }

    /// The full help section: title heading plus usage.
    pub fn render(&self, bot: &str) -> String {
        format!("#### {}\n\n{}", self.title, self.usage(bot))
    }
}

/// The messages of one bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    overrides: BTreeMap<MessageKey, String>,
    help: Vec<CommandHelp>,
    pub tone: Tone,
    /// Human name of the event, e.g. "Bug Bash".
    pub event_name: String,
    /// Who users should contact when something goes wrong.
    pub support_team: String,
}

impl MessageCatalog {
    /// The default catalog of a variant.
    pub fn for_variant(variant: Variant, support_team: impl Into<String>) -> Self {
        let (tone, event_name, help) = match variant {
            Variant::BugBash => (Tone::Plain, "Bug Bash", bug_bash_help()),
            Variant::BugHunt => (Tone::Emoji, "Bug Hunt", bug_hunt_help()),
            Variant::BugVerification => (Tone::Emoji, "Bug Verification", verification_help()),
        };

        MessageCatalog {
            overrides: BTreeMap::new(),
            help,
            tone,
            event_name: event_name.to_string(),
            support_team: support_team.into(),
        }
    }

    pub fn template(&self, key: MessageKey) -> &str {
        self.overrides
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_template())
    }

    pub fn set_template(&mut self, key: MessageKey, template: impl Into<String>) {
        self.overrides.insert(key, template.into());
    }

    pub fn help(&self) -> &[CommandHelp] {
        &self.help
    }

    /// The help section documenting `kind`, if any.
    pub fn help_for(&self, kind: IntentKind) -> Option<&CommandHelp> {
        self.help.iter().find(|entry| entry.documents(kind))
    }
}

fn assign_help() -> CommandHelp {
    CommandHelp::new(
        &[IntentKind::Assign],
        "assign",
        "To assign yourself to the issue make a comment:",
        &["assign me"],
    )
}

fn unassign_help() -> CommandHelp {
    CommandHelp::new(
        &[IntentKind::Unassign],
        "unassign",
        "To unassign yourself from the issue make a comment:",
        &["unassign me"],
    )
}

fn help_help() -> CommandHelp {
    CommandHelp::new(
        &[IntentKind::Help],
        "help",
        "To see this message again make a comment:",
        &["help"],
    )
}

fn bug_bash_help() -> Vec<CommandHelp> {
    vec![
        assign_help(),
        unassign_help(),
        CommandHelp::new(
            &[IntentKind::Ready],
            "ready for review",
            "As soon as you are done, please, make a comment like below, including the id or \
             link to the pull request:",
            &["PR #1234 is ready for review", "<link to PR> is ready for review"],
        ),
        help_help(),
    ]
}

fn bug_hunt_help() -> Vec<CommandHelp> {
    vec![
        CommandHelp::new(
            &[IntentKind::AddLabels],
            "add label",
            "To add label to the issue, add comment like below with comma-separated list of \
             labels:",
            &["add label: Label Name 1, Label Name 2, Label Name 3"],
        ),
        CommandHelp::new(
            &[IntentKind::RemoveLabels],
            "remove label",
            "To remove label from the issue, add comment like below with comma-separated list \
             of labels:",
            &["remove label: Label Name 1, Label Name 2, Label Name 3"],
        ),
        help_help(),
    ]
}

fn verification_help() -> Vec<CommandHelp> {
    vec![
        assign_help(),
        unassign_help(),
        CommandHelp::new(
            &[IntentKind::Pass, IntentKind::Fail],
            "pass or fail",
            "Verify the issue. You must attach screenshots/videos of your verification to your \
             comment.\nAs soon as you are ready, add one of the comments below to mark this \
             issue as passed or failed:",
            &["mark as pass", "mark as fail"],
        ),
        help_help(),
    ]
}

/// Substitutes `{name}` placeholders.
///
/// Unknown placeholders are left as written. Substituted values are not
/// scanned again, so user-supplied text (label names) cannot inject
/// placeholders.
///
/// # Examples
///
/// ```
/// use bug_helpers::response::render_template;
///
/// assert_eq!(
///     render_template("@{actor} hi {missing}", &[("actor", "alice")]),
///     "@alice hi {missing}"
/// );
/// ```
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let name = &after[..end];
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
