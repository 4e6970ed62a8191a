//! Labels, stage roles and the per-bot label vocabulary.
//!
//! Workflow stages are expressed through labels. The engine never refers to a
//! concrete label name directly: it refers to a [`LabelRole`], and the bot's
//! [`LabelVocabulary`] maps roles to the names used in a repository.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The workflow role a label plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRole {
    /// The issue can be claimed.
    OpenForPickup,
    /// Someone has claimed the issue.
    Assigned,
    /// A reviewer asked for changes.
    Feedback,
    /// The work was accepted. Terminal.
    Accepted,
    /// The assignee handed the work over for review.
    ReadyForReview,
    /// Verification verdict: the fix works.
    Pass,
    /// Verification verdict: the fix does not work.
    Fail,
}

impl LabelRole {
    /// Every role, in workflow order.
    pub const ALL: [LabelRole; 7] = [
        LabelRole::OpenForPickup,
        LabelRole::Assigned,
        LabelRole::Feedback,
        LabelRole::Accepted,
        LabelRole::ReadyForReview,
        LabelRole::Pass,
        LabelRole::Fail,
    ];

    /// Suffix used for `{PREFIX}_LABEL_{ROLE}` environment overrides.
    pub fn env_suffix(&self) -> &'static str {
        match self {
            LabelRole::OpenForPickup => "OPEN_FOR_PICKUP",
            LabelRole::Assigned => "ASSIGNED",
            LabelRole::Feedback => "FEEDBACK",
            LabelRole::Accepted => "ACCEPTED",
            LabelRole::ReadyForReview => "READY_FOR_REVIEW",
            LabelRole::Pass => "PASS",
            LabelRole::Fail => "FAIL",
        }
    }
}

/// Maps workflow roles to concrete label names.
///
/// A role without a name is not part of the bot's workflow; rules that
/// mention it skip it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelVocabulary {
    names: BTreeMap<LabelRole, String>,
}

impl LabelVocabulary {
    /// Builds a vocabulary from `(role, name)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (LabelRole, S)>,
        S: Into<String>,
    {
        LabelVocabulary {
            names: entries
                .into_iter()
                .map(|(role, name)| (role, name.into()))
                .collect(),
        }
    }

    /// The label name for a role, if the role is part of this workflow.
    pub fn name(&self, role: LabelRole) -> Option<&str> {
        self.names.get(&role).map(String::as_str)
    }

    /// Sets (or replaces) the name for a role.
    pub fn set(&mut self, role: LabelRole, name: impl Into<String>) {
        self.names.insert(role, name.into());
    }

    /// Names for the given roles, skipping roles outside the workflow.
    pub fn names_for<'a>(&'a self, roles: &'a [LabelRole]) -> impl Iterator<Item = &'a str> + 'a {
        roles.iter().filter_map(|role| self.name(*role))
    }

    /// All stage label names of this workflow.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// The labels of an issue: ordered, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSet(Vec<String>);

impl LabelSet {
    pub fn new() -> Self {
        LabelSet(Vec::new())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|label| label == name)
    }

    /// Case-insensitive lookup, returning the stored spelling.
    pub fn find_ignore_case(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|label| label.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Appends a label unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(set: LabelSet) -> Self {
        set.0
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}
