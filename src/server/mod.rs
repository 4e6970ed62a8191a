//! HTTP server for the helper bots.
//!
//! Accepts GitHub webhooks, validates signatures, and hands each command to
//! every enabled bot that is addressed. Handling runs on a task tracker after
//! the delivery has been acknowledged, so GitHub never waits on the API calls
//! a command makes.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries
//! - `GET /health` - Returns 200 if server is running

use std::fmt::Display;
use std::sync::Arc;

use octocrab::Octocrab;
use tokio_util::task::TaskTracker;

use crate::effects::GitHubInterpreter;
use crate::engine::Engine;
use crate::github::OctocrabClient;
use crate::types::RepoId;

pub mod webhook;

pub use webhook::webhook_handler;

/// Builds a repository-scoped interpreter for each event.
pub trait InterpreterFactory: Send + Sync + 'static {
    type Interpreter: GitHubInterpreter<Error: Display + Send> + Send + Sync + 'static;

    fn for_repo(&self, repo: &RepoId) -> Self::Interpreter;
}

impl InterpreterFactory for Octocrab {
    type Interpreter = OctocrabClient;

    fn for_repo(&self, repo: &RepoId) -> OctocrabClient {
        OctocrabClient::new(self.clone(), repo.clone())
    }
}

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
pub struct AppState<F> {
    inner: Arc<AppStateInner<F>>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<F> {
    /// Webhook secret for HMAC-SHA256 signature verification.
    webhook_secret: Vec<u8>,

    /// One engine per enabled bot.
    engines: Vec<Engine>,

    github: F,

    /// Event handling spawned after the response was sent.
    tracker: TaskTracker,
}

impl<F: InterpreterFactory> AppState<F> {
    pub fn new(webhook_secret: impl Into<Vec<u8>>, engines: Vec<Engine>, github: F) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.into(),
                engines,
                github,
                tracker: TaskTracker::new(),
            }),
        }
    }

    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    pub fn engines(&self) -> &[Engine] {
        &self.inner.engines
    }

    pub fn github(&self) -> &F {
        &self.inner.github
    }

    /// Close and wait on this during shutdown to let in-flight commands finish.
    pub fn tracker(&self) -> &TaskTracker {
        &self.inner.tracker
    }
}

/// Liveness probe.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Builds the axum Router with all endpoints.
pub fn build_router<F: InterpreterFactory>(app_state: AppState<F>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<F>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BotConfig, Variant};

    struct NoGitHub;

    impl InterpreterFactory for NoGitHub {
        type Interpreter = Arc<crate::test_utils::MockGitHub>;

        fn for_repo(&self, _repo: &RepoId) -> Self::Interpreter {
            Arc::new(crate::test_utils::MockGitHub::new(Vec::<String>::new()))
        }
    }

    #[test]
    fn app_state_accessors_work() {
        let engines = vec![Engine::new(BotConfig::defaults(Variant::BugBash, "us"))];
        let state = AppState::new(b"test-secret".to_vec(), engines, NoGitHub);

        assert_eq!(state.webhook_secret(), b"test-secret");
        assert_eq!(state.engines().len(), 1);
        assert!(!state.tracker().is_closed());
    }

    #[test]
    fn app_state_clones_share_the_tracker() {
        let state = AppState::new(b"secret".to_vec(), Vec::new(), NoGitHub);
        let cloned = state.clone();

        state.tracker().close();
        assert!(cloned.tracker().is_closed());
    }
}
