//! Webhook service that keeps a kanban board in step with pull request triage.
//!
//! The domain lives in [`triage_core`]; this crate adds the HTTP endpoint,
//! the Trello board client and process configuration.

pub mod api;
pub mod config;
pub mod trello;
