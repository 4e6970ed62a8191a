//! Routes a [`CommandEvent`] to exactly one handler and posts exactly one reply.

use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::commands::{Intent, IntentKind, Utterance, parse_utterance};
use crate::config::BotConfig;
use crate::effects::GitHubInterpreter;
use crate::repo::{self, RepoError};
use crate::response::{ReplyContext, compose};
use crate::types::{CommentId, IssueNumber};
use crate::webhooks::CommandEvent;

use super::handlers::{RuleInput, apply_rule};
use super::outcome::Outcome;
use super::rules::TransitionRule;

/// Why an event was not handled. No comment is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The bot does not process this kind of event.
    NotListening,
    /// Bots never command bots.
    FromBot,
    /// The text does not mention the bot.
    NotAddressed,
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            IgnoreReason::NotListening => "not listening to this event",
            IgnoreReason::FromBot => "sent by a bot",
            IgnoreReason::NotAddressed => "bot not mentioned",
        };
        f.write_str(reason)
    }
}

/// Which handler an event goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Ignore(IgnoreReason),
    /// Help, optionally noting a verb this bot does not handle.
    Help { unsupported: Option<IntentKind> },
    /// A state-changing command this bot supports.
    Command(Intent),
}

impl Route {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Route::Ignore(_))
    }
}

/// What handling an event amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Ignored(IgnoreReason),
    Replied {
        outcome: Outcome,
        comment_id: CommentId,
    },
}

/// The reply could not be posted. The outcome (and any update) stands.
#[derive(Debug, Error)]
#[error("failed to reply on issue {issue} ({outcome})")]
pub struct DispatchError {
    pub issue: IssueNumber,
    /// The outcome the lost reply was about.
    pub outcome: String,
    #[source]
    pub source: RepoError,
}

/// One helper bot.
///
/// Stateless apart from its configuration; events are handled independently.
#[derive(Debug, Clone)]
pub struct Engine {
    config: BotConfig,
}

impl Engine {
    pub fn new(config: BotConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Decides which handler the event goes to, without any I/O.
    pub fn route(&self, event: &CommandEvent) -> Route {
        if !self.config.listens_to(event.kind) {
            return Route::Ignore(IgnoreReason::NotListening);
        }
        if event.actor.is_bot() {
            return Route::Ignore(IgnoreReason::FromBot);
        }

        match parse_utterance(&event.body, &self.config.bot_name) {
            Utterance::NotAddressed => Route::Ignore(IgnoreReason::NotAddressed),
            Utterance::Addressed(None) | Utterance::Addressed(Some(Intent::Help)) => {
                Route::Help { unsupported: None }
            }
            Utterance::Addressed(Some(intent)) if !self.config.variant.supports(intent.kind()) => {
                Route::Help {
                    unsupported: Some(intent.kind()),
                }
            }
            Utterance::Addressed(Some(intent)) => Route::Command(intent),
        }
    }

    /// Handles one event: runs its handler and posts the reply.
    pub async fn handle_event<G>(
        &self,
        github: &G,
        event: &CommandEvent,
    ) -> Result<Dispatch, DispatchError>
    where
        G: GitHubInterpreter + Sync,
        G::Error: Display,
    {
        self.handle_event_at(github, event, Utc::now()).await
    }

    /// [`Engine::handle_event`] with an explicit clock for the assignment deadline.
    pub async fn handle_event_at<G>(
        &self,
        github: &G,
        event: &CommandEvent,
        now: DateTime<Utc>,
    ) -> Result<Dispatch, DispatchError>
    where
        G: GitHubInterpreter + Sync,
        G::Error: Display,
    {
        let (intent, outcome) = match self.route(event) {
            Route::Ignore(reason) => {
                debug!(
                    bot = %self.config.bot_name,
                    repo = %event.repo,
                    issue = %event.issue.number,
                    %reason,
                    "Ignoring event"
                );
                return Ok(Dispatch::Ignored(reason));
            }
            Route::Help { unsupported } => (None, Outcome::Help { unsupported }),
            Route::Command(intent) => {
                let outcome = match TransitionRule::for_intent(intent.kind(), &self.config) {
                    Some(rule) => {
                        let input = RuleInput {
                            config: &self.config,
                            rule: &rule,
                            event,
                            intent: &intent,
                            now,
                        };
                        apply_rule(github, input).await
                    }
                    None => Outcome::Help { unsupported: None },
                };
                (Some(intent), outcome)
            }
        };

        let context = ReplyContext {
            actor: &event.actor.login,
            bot: &self.config.bot_name,
            intent: intent.as_ref(),
            labels: &self.config.labels,
            event_label: self.config.event_label.as_deref(),
            labels_url: event.repo.labels_url(),
        };
        let body = compose(&outcome, &context, &self.config.catalog);

        let comment_id = repo::create_comment(github, event.issue.number, body)
            .await
            .map_err(|source| DispatchError {
                issue: event.issue.number,
                outcome: format!("{:?}", outcome),
                source,
            })?;

        info!(
            bot = %self.config.bot_name,
            repo = %event.repo,
            issue = %event.issue.number,
            actor = %event.actor.login,
            success = outcome.is_success(),
            "Replied"
        );

        Ok(Dispatch::Replied {
            outcome,
            comment_id,
        })
    }
}
