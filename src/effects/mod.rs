//! Effects-as-data for GitHub operations.
//!
//! This module defines effect types that describe operations without executing them.
//! This enables:
//! - Engine logic that can be driven by an in-memory interpreter in tests
//! - Logging/tracing of intended operations
//! - Per-effect retry policies in the production interpreter

pub mod github;
pub mod interpreter;

pub use github::{GitHubEffect, GitHubResponse, IssueFilter, IssueUpdate};
pub use interpreter::GitHubInterpreter;
