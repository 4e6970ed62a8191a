//! Bug Helpers - GitHub bots that manage issue labels and assignees for
//! bug bash, bug hunt and bug verification events.
//!
//! Contestants and QA reviewers drive the bots by mentioning them in issue
//! comments (`@bug-bash-helper assign`). Each bot parses the command, checks
//! it against the issue and the actor's other issues, applies one label and
//! assignee update, and answers with exactly one comment.

pub mod commands;
pub mod config;
pub mod effects;
pub mod engine;
pub mod github;
pub mod repo;
pub mod response;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
