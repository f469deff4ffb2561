//! Triage reconciliation.
//!
//! Each event is handled on its own: the card is located by URL, a [`Plan`]
//! is derived from the event kind and the card's current lane, and the plan's
//! steps are applied through the [`BoardGateway`] in order.
//!
//! # Partial failure
//!
//! Steps are separate remote calls. When one fails, the steps before it stay
//! applied and the rest are not attempted; [`TriageError::Step`] reports both.
//! For example an `edited` event whose create step fails leaves the pull
//! request with no active card until a later event recreates one. Two events
//! for the same pull request handled concurrently are not serialized either,
//! so a duplicate card is possible.

use std::sync::Arc;

use thiserror::Error;

use crate::board::{BoardError, BoardGateway, LocatorToken};
use crate::models::{BoardLayout, Card, EventKind, LaneRole, WebhookEvent};
use crate::roster::Roster;

/// Read-only state built once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct TriageContext {
    pub layout: BoardLayout,
    pub roster: Roster,
}

impl TriageContext {
    pub fn new(layout: BoardLayout, roster: Roster) -> Self {
        Self { layout, roster }
    }

    /// Read the board's lanes and bind them.
    pub async fn load(gateway: &dyn BoardGateway, roster: Roster) -> Result<Self, BoardError> {
        let layout = BoardLayout::from_lanes(gateway.lanes().await?)?;
        Ok(Self::new(layout, roster))
    }
}

/// One board mutation, applied to the plan's current card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Create a new card in the lane; it becomes the current card.
    Create(LaneRole),
    Move(LaneRole),
    /// Archive the current card; there is no current card afterwards.
    Archive,
    Comment(String),
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create(role) => write!(f, "create in {}", role),
            Self::Move(role) => write!(f, "move to {}", role),
            Self::Archive => f.write_str("archive"),
            Self::Comment(_) => f.write_str("comment"),
        }
    }
}

/// Why an event left the board untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The actor is on the roster and the event kind is insider-gated.
    Insider(String),
    UnhandledKind(String),
    /// `opened`/`reopened` for a pull request that already has a card.
    AlreadyTracked,
    /// `closed` for a pull request with no card.
    NoCard,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insider(login) => write!(f, "insider activity by {}", login),
            Self::UnhandledKind(kind) => write!(f, "unhandled action {}", kind),
            Self::AlreadyTracked => f.write_str("card already exists"),
            Self::NoCard => f.write_str("no card to update"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Skip(SkipReason),
    Apply(Vec<Step>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Applied {
        /// The active card after the plan ran, if any.
        card_id: Option<String>,
        steps: Vec<Step>,
    },
}

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("failed to locate card for {url}: {source}")]
    Locate {
        url: String,
        #[source]
        source: BoardError,
    },

    #[error("{failed} failed for {url} after {} completed step(s): {source}", .completed.len())]
    Step {
        url: String,
        failed: Step,
        completed: Vec<Step>,
        #[source]
        source: BoardError,
    },

    #[error("{0} has no card to act on")]
    NoCurrentCard(Step),
}

/// Decisions that need no board state: unhandled kinds and insider activity.
pub fn precheck(event: &WebhookEvent, roster: &Roster) -> Option<SkipReason> {
    if let EventKind::Other(action) = &event.kind {
        return Some(SkipReason::UnhandledKind(action.clone()));
    }
    if event.kind.is_insider_gated() && roster.is_insider(event.actor.as_deref()) {
        return Some(SkipReason::Insider(event.actor_name().to_string()));
    }
    None
}

/// Target lane for a `labeled` event.
pub fn lane_for_label(label: Option<&str>) -> LaneRole {
    match label {
        Some("Triaged") | Some("Merge After Unfreeze") => LaneRole::WaitingOnMaintainers,
        Some("Waiting on Contributor") => LaneRole::WaitingOnContributor,
        Some("Blocked") => LaneRole::NeedsDeepDive,
        _ => LaneRole::OpenPr,
    }
}

/// Derive the steps that bring the board in line with `event`.
///
/// `located` is the card found for the event's URL, if any. [`precheck`] runs
/// here as well so a plan can be derived without a [`Reconciler`];
/// [`Reconciler::handle`] runs it first to skip the card lookup.
pub fn plan(event: &WebhookEvent, located: Option<&Card>, context: &TriageContext) -> Plan {
    if let Some(reason) = precheck(event, &context.roster) {
        return Plan::Skip(reason);
    }

    let user = event.actor_name();
    // Routine activity only bumps cards that are not fresh or escalated.
    let bump = |card: &Card| {
        !context
            .layout
            .role_of(&card.lane_id)
            .is_some_and(|role| role.is_sticky())
    };

    let steps = match (&event.kind, located) {
        (EventKind::Opened | EventKind::Reopened, Some(_)) => {
            return Plan::Skip(SkipReason::AlreadyTracked)
        }
        (EventKind::Opened | EventKind::Reopened, None) => vec![Step::Create(LaneRole::OpenPr)],

        (EventKind::Created, located) => {
            let comment = Step::Comment(format!(
                "Update: New comment from {}: {}",
                user,
                event.comment_url.as_deref().unwrap_or_default()
            ));
            match located {
                Some(card) if bump(card) => {
                    vec![Step::Move(LaneRole::WaitingOnMaintainers), comment]
                }
                Some(_) => vec![comment],
                None => vec![Step::Create(LaneRole::WaitingOnMaintainers), comment],
            }
        }

        (EventKind::Edited, located) => {
            let mut steps = Vec::with_capacity(3);
            if located.is_some() {
                steps.push(Step::Archive);
            }
            steps.push(Step::Create(LaneRole::WaitingOnMaintainers));
            steps.push(Step::Comment(format!(
                "Update: Pull request title updated by {}",
                user
            )));
            steps
        }

        (EventKind::Labeled, Some(_)) => vec![Step::Move(lane_for_label(event.label.as_deref()))],
        (EventKind::Labeled, None) => vec![Step::Create(lane_for_label(event.label.as_deref()))],

        (EventKind::Synchronize, located) => {
            let comment = Step::Comment(format!("Update: force push by {}", user));
            match located {
                Some(card) if bump(card) => {
                    vec![Step::Move(LaneRole::WaitingOnMaintainers), comment]
                }
                Some(_) => vec![comment],
                None => vec![Step::Create(LaneRole::WaitingOnMaintainers), comment],
            }
        }

        (EventKind::Closed, Some(_)) => vec![
            Step::Comment(format!("Pull request closed by {}", user)),
            Step::Archive,
        ],
        (EventKind::Closed, None) => return Plan::Skip(SkipReason::NoCard),

        // Already rejected by precheck.
        (EventKind::Other(action), _) => {
            return Plan::Skip(SkipReason::UnhandledKind(action.clone()))
        }
    };

    Plan::Apply(steps)
}

/// Applies webhook events to the board.
#[derive(Clone)]
pub struct Reconciler {
    gateway: Arc<dyn BoardGateway>,
    context: Arc<TriageContext>,
}

impl Reconciler {
    pub fn new(gateway: Arc<dyn BoardGateway>, context: Arc<TriageContext>) -> Self {
        Self { gateway, context }
    }

    pub fn context(&self) -> &TriageContext {
        &self.context
    }

    /// Locate the card, plan, and apply the plan step by step.
    pub async fn handle(&self, event: &WebhookEvent) -> Result<Outcome, TriageError> {
        let url = &event.record.url;

        if let Some(reason) = precheck(event, &self.context.roster) {
            tracing::info!(action = %event.kind, url = %url, "Skipping event: {}", reason);
            return Ok(Outcome::Skipped(reason));
        }

        let located = self
            .gateway
            .find_card(&LocatorToken::new(url.clone()))
            .await
            .map_err(|source| TriageError::Locate {
                url: url.clone(),
                source,
            })?;

        let steps = match plan(event, located.as_ref(), &self.context) {
            Plan::Skip(reason) => {
                tracing::info!(action = %event.kind, url = %url, "Skipping event: {}", reason);
                return Ok(Outcome::Skipped(reason));
            }
            Plan::Apply(steps) => steps,
        };

        let mut current = located;
        for (index, step) in steps.iter().enumerate() {
            current = self
                .apply(event, step, current)
                .await
                .map_err(|err| match err {
                    StepFailure::Board(source) => {
                        tracing::error!(
                            action = %event.kind,
                            url = %url,
                            step = %step,
                            completed = index,
                            "Board call failed: {}",
                            source
                        );
                        TriageError::Step {
                            url: url.clone(),
                            failed: step.clone(),
                            completed: steps[..index].to_vec(),
                            source,
                        }
                    }
                    StepFailure::NoCurrentCard => TriageError::NoCurrentCard(step.clone()),
                })?;
        }

        tracing::info!(
            action = %event.kind,
            url = %url,
            steps = steps.len(),
            "Reconciled pull request"
        );

        Ok(Outcome::Applied {
            card_id: current.map(|card| card.id),
            steps,
        })
    }

    async fn apply(
        &self,
        event: &WebhookEvent,
        step: &Step,
        current: Option<Card>,
    ) -> Result<Option<Card>, StepFailure> {
        let layout = &self.context.layout;
        match step {
            Step::Create(role) => {
                let card = self
                    .gateway
                    .create_card(
                        layout.lane(*role),
                        &event.record.title,
                        &event.record.card_description(),
                    )
                    .await?;
                tracing::debug!(card = %card.id, lane = %role, "Created card");
                Ok(Some(card))
            }
            Step::Move(role) => {
                let mut card = current.ok_or(StepFailure::NoCurrentCard)?;
                let lane = layout.lane(*role);
                self.gateway.move_card(&card, lane).await?;
                tracing::debug!(card = %card.id, lane = %role, "Moved card");
                card.lane_id = lane.id.clone();
                Ok(Some(card))
            }
            Step::Archive => {
                let card = current.ok_or(StepFailure::NoCurrentCard)?;
                self.gateway.archive_card(&card).await?;
                tracing::debug!(card = %card.id, "Archived card");
                Ok(None)
            }
            Step::Comment(text) => {
                let card = current.ok_or(StepFailure::NoCurrentCard)?;
                self.gateway.add_comment(&card, text).await?;
                Ok(Some(card))
            }
        }
    }
}

enum StepFailure {
    Board(BoardError),
    NoCurrentCard,
}

impl From<BoardError> for StepFailure {
    fn from(err: BoardError) -> Self {
        Self::Board(err)
    }
}
