//! Turns an [`Outcome`] into the reply comment.

use crate::commands::{Intent, IntentKind};
use crate::engine::{Outcome, Rejection};
use crate::types::{LabelRole, LabelVocabulary};

use super::catalog::{MessageCatalog, MessageKey, render_template};

/// Format of the assignment deadline.
const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// The event-specific values a reply may mention.
#[derive(Debug, Clone)]
pub struct ReplyContext<'a> {
    /// Login of the user being answered.
    pub actor: &'a str,
    pub bot: &'a str,
    /// The command being answered, if one was recognized.
    pub intent: Option<&'a Intent>,
    pub labels: &'a LabelVocabulary,
    pub event_label: Option<&'a str>,
    /// The repository's label list page.
    pub labels_url: String,
}

/// Renders the reply for an outcome.
///
/// Every reply addresses the actor. Help replies greet the actor and list
/// every command the bot supports; all other replies are one template from
/// the catalog prefixed with `@actor` and the tone marker.
pub fn compose(outcome: &Outcome, context: &ReplyContext<'_>, catalog: &MessageCatalog) -> String {
    let reply = Reply { context, catalog };

    match outcome {
        Outcome::Help { unsupported } => reply.help(*unsupported),

        Outcome::Assigned { hours, deadline } => {
            let next_steps = catalog
                .help()
                .iter()
                .find(|entry| {
                    entry.documents(IntentKind::Ready) || entry.documents(IntentKind::Pass)
                })
                .map(|entry| entry.usage(context.bot))
                .unwrap_or_default();
            let hours = hours.to_string();
            let deadline = deadline.format(DEADLINE_FORMAT).to_string();
            reply.render(
                MessageKey::AssignSuccess,
                &[
                    ("hours", hours.as_str()),
                    ("deadline", deadline.as_str()),
                    ("next_steps", next_steps.as_str()),
                ],
            )
        }

        Outcome::Unassigned => reply.render(MessageKey::UnassignSuccess, &[]),

        Outcome::MarkedReady {
            label,
            pull_request,
        } => {
            let pull_request = pull_request
                .as_ref()
                .map(|pr| format!(" (pull request {})", pr))
                .unwrap_or_default();
            reply.render(
                MessageKey::ReadySuccess,
                &[("label", label.as_str()), ("pull_request", pull_request.as_str())],
            )
        }

        Outcome::Verdict { label } => {
            reply.render(MessageKey::VerdictSuccess, &[("label", label.as_str())])
        }

        Outcome::LabelsAdded { unknown, .. } if unknown.is_empty() => {
            reply.render(MessageKey::LabelsAdded, &[])
        }
        Outcome::LabelsAdded { unknown, .. } => {
            let unknown = unknown.join(", ");
            reply.render(MessageKey::LabelsAddedPartial, &[("labels", unknown.as_str())])
        }

        Outcome::LabelsRemoved { ignored, .. } if ignored.is_empty() => {
            reply.render(MessageKey::LabelsRemoved, &[])
        }
        Outcome::LabelsRemoved { ignored, .. } => {
            let ignored = ignored.join(", ");
            reply.render(MessageKey::LabelsRemovedPartial, &[("labels", ignored.as_str())])
        }

        Outcome::Rejected(rejection) => reply.rejection(rejection),

        Outcome::Failed { .. } => reply.render(MessageKey::Failure, &[]),
    }
}

struct Reply<'c, 'a> {
    context: &'c ReplyContext<'a>,
    catalog: &'c MessageCatalog,
}

impl Reply<'_, '_> {
    fn label(&self, role: LabelRole) -> &str {
        self.context.labels.name(role).unwrap_or_default()
    }

    /// Renders a template with the shared values plus `extra`, without the
    /// `@actor` prefix.
    fn fragment(&self, key: MessageKey, extra: &[(&str, &str)]) -> String {
        let action = self.action_phrase();
        let event_label = self.context.event_label.unwrap_or_default();
        let shared = [
            ("actor", self.context.actor),
            ("bot", self.context.bot),
            ("event_name", self.catalog.event_name.as_str()),
            ("support_team", self.catalog.support_team.as_str()),
            ("labels_url", self.context.labels_url.as_str()),
            ("event_label", event_label),
            ("pickup_label", self.label(LabelRole::OpenForPickup)),
            ("action", action.as_str()),
        ];

        let vars: Vec<(&str, &str)> = extra.iter().chain(shared.iter()).copied().collect();
        render_template(self.catalog.template(key), &vars)
    }

    fn render(&self, key: MessageKey, extra: &[(&str, &str)]) -> String {
        let body = self.fragment(key, extra);
        let marker = self.catalog.tone.marker(key.tone());
        format!("@{} {}{}", self.context.actor, marker, body)
    }

    /// Renders a pickup rejection, which explains which issues can be picked up.
    fn pickup_rejection(&self, key: MessageKey, extra: &[(&str, &str)]) -> String {
        let rules_key = if self.context.event_label.is_some() {
            MessageKey::PickupRulesInEvent
        } else {
            MessageKey::PickupRules
        };
        let rules = self.fragment(rules_key, &[]);

        let mut vars = vec![("pickup_rules", rules.as_str())];
        vars.extend_from_slice(extra);
        self.render(key, &vars)
    }

    fn rejection(&self, rejection: &Rejection) -> String {
        match rejection {
            Rejection::NotCreator => self.render(MessageKey::NotCreator, &[]),
            Rejection::NotAssignee => self.render(MessageKey::NotAssignee, &[]),
            Rejection::NotIncluded => self.pickup_rejection(MessageKey::NotIncluded, &[]),
            Rejection::IssueClosed => self.pickup_rejection(MessageKey::IssueClosed, &[]),
            Rejection::NotOpenForPickup => {
                self.pickup_rejection(MessageKey::NotOpenForPickup, &[])
            }
            Rejection::AlreadyClaimed { assignee } => {
                self.pickup_rejection(
                    MessageKey::AlreadyClaimed,
                    &[("assignee", assignee.as_str())],
                )
            }
            Rejection::AlreadyAccepted => self.render(MessageKey::AlreadyAccepted, &[]),
            Rejection::InProgressElsewhere { urls } => {
                let issues = link_list(urls);
                self.render(MessageKey::InProgressElsewhere, &[("issues", issues.as_str())])
            }
            Rejection::FeedbackPending { urls } => {
                let issues = link_list(urls);
                self.render(MessageKey::FeedbackPending, &[("issues", issues.as_str())])
            }
            Rejection::MissingLabels => {
                let kind = self.context.intent.map(Intent::kind);
                let verb = match kind {
                    Some(IntentKind::RemoveLabels) => "remove",
                    _ => "add",
                };
                let usage = kind
                    .and_then(|kind| self.catalog.help_for(kind))
                    .map(|entry| entry.usage(self.context.bot))
                    .unwrap_or_default();
                self.render(MessageKey::MissingLabels, &[("verb", verb), ("usage", usage.as_str())])
            }
            Rejection::NoKnownLabels { requested } => {
                let requested = requested.join(", ");
                self.render(MessageKey::NoKnownLabels, &[("labels", requested.as_str())])
            }
            Rejection::NoAssignedLabels { requested } => {
                let requested = requested.join(", ");
                self.render(MessageKey::NoAssignedLabels, &[("labels", requested.as_str())])
            }
        }
    }

    fn help(&self, unsupported: Option<IntentKind>) -> String {
        let mut sections = vec![self.fragment(MessageKey::HelpGreeting, &[])];
        if let Some(kind) = unsupported {
            sections.push(self.fragment(MessageKey::UnsupportedNote, &[("verb", kind.verb())]));
        }
        sections.extend(
            self.catalog
                .help()
                .iter()
                .map(|entry| entry.render(self.context.bot)),
        );
        sections.join("\n\n")
    }

    /// What the actor asked for, phrased to follow "I cannot" or "trying to".
    fn action_phrase(&self) -> String {
        let Some(intent) = self.context.intent else {
            return "handle your request".to_string();
        };

        match intent {
            Intent::Assign => "assign you to this issue".to_string(),
            Intent::Unassign => "unassign you from this issue".to_string(),
            Intent::Ready { .. } => format!(
                "mark this issue as `{}`",
                self.label(LabelRole::ReadyForReview)
            ),
            Intent::Pass => format!("mark this issue as `{}`", self.label(LabelRole::Pass)),
            Intent::Fail => format!("mark this issue as `{}`", self.label(LabelRole::Fail)),
            Intent::Help => "handle your request".to_string(),
            Intent::AddLabels(labels) if labels.is_empty() => {
                "add labels to this issue".to_string()
            }
            Intent::AddLabels(labels) => {
                format!("add labels \"{}\" to this issue", labels.join(", "))
            }
            Intent::RemoveLabels(labels) if labels.is_empty() => {
                "remove labels from this issue".to_string()
            }
            Intent::RemoveLabels(labels) => {
                format!("remove labels \"{}\" from this issue", labels.join(", "))
            }
        }
    }
}

/// `[url](url), [url](url)`
fn link_list(urls: &[String]) -> String {
    urls.iter()
        .map(|url| format!("[{url}]({url})"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::PullRequestRef;
    use crate::config::{BotConfig, Variant};
    use chrono::{TimeZone, Utc};

    fn bash() -> BotConfig {
        BotConfig::defaults(Variant::BugBash, "the Topcoder team")
    }

    fn context<'a>(config: &'a BotConfig, intent: Option<&'a Intent>) -> ReplyContext<'a> {
        ReplyContext {
            actor: "alice",
            bot: &config.bot_name,
            intent,
            labels: &config.labels,
            event_label: config.event_label.as_deref(),
            labels_url: "https://github.com/o/r/labels".to_string(),
        }
    }

    #[test]
    fn assignment_states_window_and_next_steps() {
        let config = bash();
        let deadline = Utc.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap();
        let text = compose(
            &Outcome::Assigned {
                hours: 12,
                deadline,
            },
            &context(&config, Some(&Intent::Assign)),
            &config.catalog,
        );

        assert!(text.starts_with("@alice you are now assigned to this issue and have 12 hours"));
        assert!(text.contains("(until 2024-03-01 22:00 UTC)"));
        assert!(text.contains("@bug-bash-helper PR #1234 is ready for review"));
    }

    #[test]
    fn pickup_rejections_explain_event_rules() {
        let config = bash();
        let text = compose(
            &Outcome::Rejected(Rejection::NotIncluded),
            &context(&config, Some(&Intent::Assign)),
            &config.catalog,
        );
        assert!(text.starts_with("@alice this issue is not included in the Bug Bash."));
        assert!(text.contains("have labels `CF-20` and `Open for Pickup`"));
    }

    #[test]
    fn in_progress_lists_links() {
        let config = bash();
        let text = compose(
            &Outcome::Rejected(Rejection::InProgressElsewhere {
                urls: vec![
                    "https://github.com/o/r/issues/1".into(),
                    "https://github.com/o/r/issues/2".into(),
                ],
            }),
            &context(&config, Some(&Intent::Assign)),
            &config.catalog,
        );
        assert!(text.contains(
            "see [https://github.com/o/r/issues/1](https://github.com/o/r/issues/1), \
             [https://github.com/o/r/issues/2](https://github.com/o/r/issues/2)."
        ));
    }

    #[test]
    fn ready_echoes_pull_request() {
        let config = bash();
        let intent = Intent::Ready {
            pull_request: Some(PullRequestRef::Number(88)),
        };
        let text = compose(
            &Outcome::MarkedReady {
                label: "Ready for Review".into(),
                pull_request: Some(PullRequestRef::Number(88)),
            },
            &context(&config, Some(&intent)),
            &config.catalog,
        );
        assert!(
            text.starts_with(
                "@alice this issue is marked as `Ready for Review` (pull request #88)."
            ),
            "{}",
            text
        );
    }

    #[test]
    fn hunt_replies_use_markers_and_links() {
        let config = BotConfig::defaults(Variant::BugHunt, "the Topcoder team");
        let intent = Intent::AddLabels(vec!["Bug".into(), "NotARealLabel".into()]);
        let text = compose(
            &Outcome::LabelsAdded {
                added: vec!["Bug".into()],
                unknown: vec!["NotARealLabel".into()],
            },
            &context(&config, Some(&intent)),
            &config.catalog,
        );
        assert!(text.starts_with("@alice ⚠️ Some labels have been successfully added."));
        assert!(text.contains("\"NotARealLabel\", see the [list](https://github.com/o/r/labels)."));
    }

    #[test]
    fn not_creator_names_the_action() {
        let config = BotConfig::defaults(Variant::BugHunt, "the Topcoder team");
        let intent = Intent::AddLabels(vec!["Bug".into(), "Typo".into()]);
        let text = compose(
            &Outcome::Rejected(Rejection::NotCreator),
            &context(&config, Some(&intent)),
            &config.catalog,
        );
        assert_eq!(
            text,
            "@alice 🛑 I cannot add labels \"Bug, Typo\" to this issue \
             because you didn't create this issue."
        );
    }

    #[test]
    fn missing_labels_shows_usage() {
        let config = BotConfig::defaults(Variant::BugHunt, "the Topcoder team");
        let intent = Intent::RemoveLabels(vec![]);
        let text = compose(
            &Outcome::Rejected(Rejection::MissingLabels),
            &context(&config, Some(&intent)),
            &config.catalog,
        );
        assert!(text.contains("Cannot find labels to remove in the comment."));
        assert!(text.contains("@bug-hunt-helper remove label: Label Name 1"));
    }

    #[test]
    fn failure_suggests_retry_and_support() {
        let config = bash();
        let text = compose(
            &Outcome::Failed {
                error: "boom".into(),
            },
            &context(&config, Some(&Intent::Unassign)),
            &config.catalog,
        );
        assert_eq!(
            text,
            "@alice Some error happened when trying to unassign you from this issue, please try \
             one more time or contact someone from the Topcoder team to assist you."
        );
    }

    #[test]
    fn help_lists_every_supported_command() {
        let config = BotConfig::defaults(Variant::BugVerification, "the Topcoder team");
        let text = compose(
            &Outcome::Help { unsupported: None },
            &context(&config, None),
            &config.catalog,
        );
        assert!(text.starts_with("Hi @alice.\n\n#### assign"));
        for example in ["assign me", "unassign me", "mark as pass", "mark as fail", "help"] {
            assert!(text.contains(&format!("@bug-verification-helper {}\n", example)));
        }
    }

    #[test]
    fn unsupported_verb_prefixes_help_with_note() {
        let config = BotConfig::defaults(Variant::BugHunt, "the Topcoder team");
        let text = compose(
            &Outcome::Help {
                unsupported: Some(IntentKind::Assign),
            },
            &context(&config, Some(&Intent::Assign)),
            &config.catalog,
        );
        assert!(text.starts_with("Hi @alice.\n\nI cannot `assign` on this issue."));
        assert!(text.contains("#### add label"));
    }
}
