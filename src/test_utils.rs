//! Shared test utilities: an in-memory GitHub and issue/event builders.

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use proptest::prelude::*;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse, IssueUpdate};
use crate::types::{Actor, CommentId, Issue, IssueNumber, IssueState, RepoId};
use crate::webhooks::{CommandEvent, EventKind};

/// Author of every issue built by [`issue_with`].
pub const CREATOR: &str = "carol";

/// An open issue in `o/r` created by [`CREATOR`].
pub fn issue_with(number: u64, labels: &[&str], assignees: &[&str]) -> Issue {
    Issue {
        number: IssueNumber(number),
        state: IssueState::Open,
        labels: labels.iter().copied().collect(),
        assignees: assignees.iter().map(|login| login.to_string()).collect(),
        author: Actor::user(CREATOR),
        html_url: format!("https://github.com/o/r/issues/{}", number),
        repository_url: "https://api.github.com/repos/o/r".to_string(),
    }
}

/// A comment by `actor` on `issue`.
pub fn comment_event(issue: Issue, actor: &str, body: &str) -> CommandEvent {
    CommandEvent {
        repo: RepoId::new("o", "r"),
        kind: EventKind::CommentCreated,
        issue,
        actor: Actor::user(actor),
        body: body.to_string(),
    }
}

/// `issue` being opened by its author with `body`.
pub fn opened_event(issue: Issue, body: &str) -> CommandEvent {
    CommandEvent {
        repo: RepoId::new("o", "r"),
        kind: EventKind::IssueOpened,
        actor: issue.author.clone(),
        issue,
        body: body.to_string(),
    }
}

#[derive(Debug, Default)]
struct MockState {
    labels: Vec<String>,
    issues: BTreeMap<IssueNumber, Issue>,
    failing: HashSet<&'static str>,
    effects: Vec<GitHubEffect>,
    comments: Vec<(IssueNumber, String)>,
}

/// An in-memory repository behind the [`GitHubInterpreter`] trait.
///
/// Updates are applied to the stored issues, so handlers that re-read see
/// their own writes. Every effect is recorded, including failed ones.
#[derive(Debug, Default)]
pub struct MockGitHub {
    state: Mutex<MockState>,
}

impl MockGitHub {
    /// A repository defining `labels`, with no issues.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockGitHub {
            state: Mutex::new(MockState {
                labels: labels.into_iter().map(Into::into).collect(),
                ..MockState::default()
            }),
        }
    }

    pub fn add_issue(&self, issue: Issue) {
        self.state.lock().unwrap().issues.insert(issue.number, issue);
    }

    /// Makes every effect with this [`GitHubEffect::name`] fail.
    pub fn fail_on(&self, effect: &'static str) {
        self.state.lock().unwrap().failing.insert(effect);
    }

    pub fn issue(&self, number: u64) -> Issue {
        self.state.lock().unwrap().issues[&IssueNumber(number)].clone()
    }

    pub fn comments(&self) -> Vec<(IssueNumber, String)> {
        self.state.lock().unwrap().comments.clone()
    }

    /// The body of the only comment. Panics unless exactly one was posted.
    pub fn only_comment(&self) -> String {
        let comments = self.comments();
        assert_eq!(comments.len(), 1, "expected exactly one comment: {:?}", comments);
        comments[0].1.clone()
    }

    pub fn updates(&self) -> Vec<(IssueNumber, IssueUpdate)> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                GitHubEffect::UpdateIssue { issue, update } => Some((issue, update)),
                _ => None,
            })
            .collect()
    }

    pub fn effects(&self) -> Vec<GitHubEffect> {
        self.state.lock().unwrap().effects.clone()
    }

    pub fn effect_names(&self) -> Vec<&'static str> {
        self.effects().iter().map(GitHubEffect::name).collect()
    }

    fn execute(&self, effect: GitHubEffect) -> Result<GitHubResponse, String> {
        let mut state = self.state.lock().unwrap();
        state.effects.push(effect.clone());

        if state.failing.contains(effect.name()) {
            return Err(format!("{} failed (mock)", effect.name()));
        }

        match effect {
            GitHubEffect::GetIssue { issue } => state
                .issues
                .get(&issue)
                .cloned()
                .map(GitHubResponse::Issue)
                .ok_or_else(|| format!("issue {} not found", issue)),

            GitHubEffect::ListOpenIssues { filter } => Ok(GitHubResponse::Issues(
                state
                    .issues
                    .values()
                    .filter(|issue| issue.state.is_open() && filter.matches(issue))
                    .cloned()
                    .collect(),
            )),

            GitHubEffect::ListLabels => Ok(GitHubResponse::Labels(state.labels.clone())),

            GitHubEffect::UpdateIssue { issue, update } => {
                let stored = state
                    .issues
                    .get_mut(&issue)
                    .ok_or_else(|| format!("issue {} not found", issue))?;
                if let Some(labels) = update.labels {
                    stored.labels = labels.into_iter().collect();
                }
                if let Some(assignees) = update.assignees {
                    stored.assignees = assignees;
                }
                Ok(GitHubResponse::IssueUpdated)
            }

            GitHubEffect::CreateComment { issue, body } => {
                state.comments.push((issue, body));
                let id = CommentId(state.comments.len() as u64);
                Ok(GitHubResponse::CommentCreated { id })
            }
        }
    }
}

impl GitHubInterpreter for MockGitHub {
    type Error = String;

    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, Self::Error>> + Send {
        let result = self.execute(effect);
        async move { result }
    }
}

pub fn arb_login() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,12}".prop_map(String::from)
}

pub fn arb_label() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _-]{0,15}".prop_map(String::from)
}
