//! The guard & transition engine shared by all helper bots.
//!
//! An [`Engine`] is one bot: a [`BotConfig`](crate::config::BotConfig) plus
//! the machinery to route a [`CommandEvent`](crate::webhooks::CommandEvent)
//! to a handler and answer it.
//!
//! # Architecture
//!
//! - [`rules`] turns an intent and the bot's label vocabulary into a
//!   declarative [`TransitionRule`]
//! - [`guards`] and [`transitions`] are pure functions over issues and labels
//! - the handler executes a rule through the repository query service,
//!   which speaks to GitHub only in effects
//! - [`dispatch`] parses the text, picks the handler, composes the reply and
//!   posts it
//!
//! # Key Invariants
//!
//! 1. **One reply**: every event that is not ignored produces exactly one
//!    comment, including help, rejections and failures.
//!
//! 2. **Guard order**: identity guards run before argument guards, which run
//!    before issue-state guards, which run before the cross-issue check. The
//!    first failure is reported and nothing is written.
//!
//! 3. **Fresh writes**: the issue is re-read and re-checked immediately
//!    before the single update, which is computed from the fresh copy.

pub mod dispatch;
pub mod guards;
mod handlers;
pub mod outcome;
pub mod rules;
pub mod transitions;


pub use dispatch::{Dispatch, DispatchError, Engine, IgnoreReason, Route};
pub use outcome::{Outcome, Rejection};
pub use rules::{AssigneeChange, CrossIssueCheck, Guard, GuardStage, LabelEdit, TransitionRule};
