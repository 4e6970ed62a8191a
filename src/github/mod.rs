//! GitHub API client and effect interpreter.
//!
//! This module provides the implementation for executing GitHub effects via the octocrab
//! library. It implements the `GitHubInterpreter` trait defined in the effects module.
//!
//! Key features:
//! - Exponential backoff retry for transient failures
//! - Distinguishes transient vs permanent errors
//! - Comment creation is never retried

mod client;
mod error;
mod interpreter;
pub(crate) mod payload;
mod retry;

pub use client::OctocrabClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_github_effect;
pub use retry::{RetryConfig, RetryPolicy};
