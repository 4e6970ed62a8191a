//! Core domain types for the helper bots.
//!
//! This module contains the fundamental types used throughout the application,
//! designed to encode invariants via the type system.

pub mod ids;
pub mod issue;
pub mod labels;

// Re-export commonly used types at the module level
pub use ids::{CommentId, DeliveryId, IssueNumber, RepoId};
pub use issue::{Actor, ActorKind, Issue, IssueState};
pub use labels::{LabelRole, LabelSet, LabelVocabulary};
