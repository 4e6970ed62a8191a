//! Command parsing for helper bot commands.
//!
//! This module provides types and parsing for the commands that users issue via
//! GitHub issue bodies and issue comments.
//!
//! # Supported Commands
//!
//! - `@{bot_name} assign me` - Claims the issue
//! - `@{bot_name} unassign me` - Releases the issue
//! - `@{bot_name} PR #N is ready for review` - Hands the work over for review
//! - `@{bot_name} mark as pass` / `mark as fail` - Verification verdicts
//! - `@{bot_name} add label: A, B` / `remove label: A, B` - Label management
//! - `@{bot_name} help` - Lists the commands the bot supports
//!
//! Which of these a given bot accepts is decided by the dispatcher, not here.
//!
//! # Example
//!
//! ```
//! use bug_helpers::commands::{parse_utterance, Intent, Utterance};
//!
//! let comment = "I'd like to pick this one.\n\n@bug-bash-helper assign me";
//! assert_eq!(
//!     parse_utterance(comment, "bug-bash-helper"),
//!     Utterance::Addressed(Some(Intent::Assign))
//! );
//!
//! let comment = "@bug-hunt-helper add label: Bug, Typo";
//! assert_eq!(
//!     parse_utterance(comment, "bug-hunt-helper"),
//!     Utterance::Addressed(Some(Intent::AddLabels(vec!["Bug".into(), "Typo".into()])))
//! );
//! ```

mod parser;
mod types;

pub use parser::parse_utterance;
pub use types::{Intent, IntentKind, PullRequestRef, Utterance};
