//! Core of the pull request triager.
//!
//! Turns webhook payloads into [`models::WebhookEvent`]s, classifies the actor
//! against a [`roster::Roster`], and reconciles the pull request's card on a
//! four-lane board through the [`board::BoardGateway`] port.

pub mod board;
pub mod memory;
pub mod models;
pub mod payload;
pub mod reconciler;
pub mod roster;

pub use board::{BoardError, BoardGateway, BoardResult, LocatorToken};
pub use memory::InMemoryBoard;
pub use reconciler::{Outcome, Plan, Reconciler, SkipReason, Step, TriageContext, TriageError};
pub use roster::Roster;
