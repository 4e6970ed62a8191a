//! Effect interpreter trait.
//!
//! The trait-based design enables:
//! - Mock interpreters for testing
//! - Logging/tracing interpreters

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are constructed with a `RepoId`, so all effects executed
/// through a single interpreter instance are scoped to that repository.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct MockGitHubInterpreter {
///     labels: Vec<String>,
/// }
///
/// impl GitHubInterpreter for MockGitHubInterpreter {
///     type Error = anyhow::Error;
///
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, Self::Error> {
///         match effect {
///             GitHubEffect::ListLabels => Ok(GitHubResponse::Labels(self.labels.clone())),
///             other => Err(anyhow!("unexpected effect: {:?}", other)),
///         }
///     }
/// }
/// ```
pub trait GitHubInterpreter {
    /// The error type returned by this interpreter.
    type Error;

    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send;
}

impl<G> GitHubInterpreter for std::sync::Arc<G>
where
    G: GitHubInterpreter + Send + Sync,
{
    type Error = G::Error;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        G::interpret(self.as_ref(), effect)
    }
}
