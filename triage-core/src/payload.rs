//! Normalization of inbound webhook payloads.
//!
//! The hosting platform sends several structurally different payloads for the
//! events triage handles. This module turns any of them into a
//! [`WebhookEvent`] so the reconciler never inspects raw JSON.
//!
//! Field resolution never fails: absent values are replaced with placeholder
//! text. Rejected are payloads with no `action`, with neither a `pull_request`
//! nor an `issue` object, or whose subject has no `html_url`: cards are keyed
//! by that URL, so there is then nothing to triage.

use serde::Deserialize;
use thiserror::Error;

use crate::models::{EventKind, PullRequestRecord, Subject, SubjectFields, WebhookEvent};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_BODY: &str = "Unknown PR Contents";
pub const UNKNOWN_CREATED: &str = "Unknown Created Time";
pub const UNKNOWN_USER: &str = "Unknown User";

/// Errors for payloads that carry nothing to triage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload has no action")]
    MissingAction,

    #[error("payload has neither a pull_request nor an issue object")]
    MissingSubject,

    /// Cards are found by URL, so an event without one cannot be reconciled.
    #[error("payload subject has no html_url")]
    MissingUrl,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    pub login: Option<String>,
}

/// The subset of a pull request or issue object triage reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectPayload {
    pub html_url: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPayload {
    pub html_url: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelPayload {
    pub name: Option<String>,
}

/// Raw webhook body. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Payload {
    pub action: Option<String>,
    pub pull_request: Option<SubjectPayload>,
    pub issue: Option<SubjectPayload>,
    pub sender: Option<User>,
    pub comment: Option<CommentPayload>,
    pub label: Option<LabelPayload>,
}

impl Payload {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Build the subject variant, preferring the pull request shape.
    pub fn subject(&self) -> Option<Subject> {
        if let Some(pr) = &self.pull_request {
            Some(Subject::PullRequest(fields(pr)))
        } else {
            self.issue.as_ref().map(|issue| Subject::Issue(fields(issue)))
        }
    }

    /// The acting login: sender, then comment author, then pull request author.
    pub fn actor(&self) -> Option<String> {
        login(self.sender.as_ref())
            .or_else(|| login(self.comment.as_ref().and_then(|c| c.user.as_ref())))
            .or_else(|| login(self.pull_request.as_ref().and_then(|pr| pr.user.as_ref())))
    }
}

fn login(user: Option<&User>) -> Option<String> {
    user.and_then(|u| u.login.clone())
}

fn fields(subject: &SubjectPayload) -> SubjectFields {
    SubjectFields {
        html_url: subject.html_url.clone(),
        title: subject.title.clone(),
        body: subject.body.clone(),
        created_at: subject.created_at.clone(),
    }
}

fn normalize_fields(fields: &SubjectFields, author: &str) -> PullRequestRecord {
    PullRequestRecord {
        url: fields.html_url.clone().unwrap_or_default(),
        title: fields
            .title
            .clone()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        body: fields.body.clone().unwrap_or_else(|| UNKNOWN_BODY.to_string()),
        created_at: fields
            .created_at
            .clone()
            .unwrap_or_else(|| UNKNOWN_CREATED.to_string()),
        author: author.to_string(),
    }
}

/// Normalize whatever the payload carries. Never fails.
pub fn normalize(payload: &Payload) -> PullRequestRecord {
    let actor = payload.actor();
    let author = actor.as_deref().unwrap_or(UNKNOWN_USER);
    match payload.subject() {
        Some(subject) => normalize_fields(subject.fields(), author),
        None => normalize_fields(&SubjectFields::default(), author),
    }
}

impl WebhookEvent {
    pub fn from_payload(payload: Payload) -> Result<Self, PayloadError> {
        let action = payload
            .action
            .as_deref()
            .ok_or(PayloadError::MissingAction)?;
        let subject = payload.subject().ok_or(PayloadError::MissingSubject)?;
        if subject.fields().html_url.as_deref().map_or(true, |url| url.trim().is_empty()) {
            return Err(PayloadError::MissingUrl);
        }
        let record = normalize(&payload);

        Ok(Self {
            kind: EventKind::parse(action),
            subject,
            record,
            actor: payload.actor(),
            comment_url: payload.comment.and_then(|c| c.html_url),
            label: payload.label.and_then(|l| l.name),
        })
    }

    /// The login to attribute actions to in card comments.
    pub fn actor_name(&self) -> &str {
        self.actor.as_deref().unwrap_or(UNKNOWN_USER)
    }
}
