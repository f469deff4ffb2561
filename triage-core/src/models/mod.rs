//! Domain models for pull request triage.
//!
//! # Core Concepts
//!
//! - [`BoardLayout`]: the four [`Lane`]s of a triage board, bound to a [`LaneRole`] each.
//! - [`Card`]: one pull request on the board, identified by the URL in its description.
//! - [`WebhookEvent`]: an inbound notification, classified by [`EventKind`] and
//!   normalized into a [`PullRequestRecord`].

mod board;
mod event;

pub use board::*;
pub use event::*;
