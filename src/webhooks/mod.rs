//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Parsing of `issues` and `issue_comment` deliveries into [`CommandEvent`]s

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{CommandEvent, EventKind};
pub use parser::{ParseError, parse_webhook};
pub use signature::{SignatureError, sign, verify_signature};
