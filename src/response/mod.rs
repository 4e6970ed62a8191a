//! Reply composition.
//!
//! A handler produces an [`Outcome`](crate::engine::Outcome); [`compose`]
//! renders it into the comment body using the bot's [`MessageCatalog`].

mod catalog;
mod compose;

pub use catalog::{CommandHelp, MessageCatalog, MessageKey, ReplyTone, Tone, render_template};
pub use compose::{ReplyContext, compose};
