//! GitHub API error types.
//!
//! Errors are split into two kinds so the retry loop knows what to do:
//!
//! - **Transient** errors are retriable (5xx, rate limits, network failures)
//! - **Permanent** errors are not (most 4xx: missing issue, bad credentials,
//!   validation failures such as assigning a user without access)

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Safe to retry with backoff.
    ///
    /// Examples:
    /// - HTTP 5xx (server errors)
    /// - HTTP 429 (rate limited)
    /// - HTTP 403 carrying a rate limit message
    /// - Network timeouts and connection resets
    Transient,

    /// Retrying will not help.
    ///
    /// Examples:
    /// - Issue or repository not found (404)
    /// - Authentication failures (401, 403 non-rate-limit)
    /// - Validation failures (422), e.g. an assignee without repository access
    Permanent,
}

impl GitHubErrorKind {
    /// Returns true if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        matches!(self, GitHubErrorKind::Transient)
    }
}

/// A GitHub API error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates a permanent error without an octocrab source.
    ///
    /// Used when GitHub answered successfully but with a body we cannot use.
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a transient error without an octocrab source.
    pub fn transient_without_source(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = status_code_of(&err);
        let message = err.to_string();
        let kind = classify(status_code, &message);

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_retriable()
    }
}

/// Decides the error kind from the status code and message.
fn classify(status_code: Option<u16>, message: &str) -> GitHubErrorKind {
    if is_transient_message(message) {
        return GitHubErrorKind::Transient;
    }

    match status_code {
        Some(429) => GitHubErrorKind::Transient,
        Some(403) if is_rate_limit_error(message) => GitHubErrorKind::Transient,
        Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
        Some(_) => GitHubErrorKind::Permanent,
        None if is_network_error(message) => GitHubErrorKind::Transient,
        None => GitHubErrorKind::Permanent,
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// API errors carry the status structurally. Other variants (transport,
/// serde) only expose a message, which is scanned for a `status: NNN` hint.
fn status_code_of(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }

    let text = err.to_string();
    let idx = text.find("status: ")?;
    let digits: String = text[idx + "status: ".len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// GitHub occasionally answers with a body that asks the caller to retry.
fn is_transient_message(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("try again") || message_lower.contains("server error")
}

fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("timed out")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
}
