//! In-memory board for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::board::{BoardError, BoardGateway, BoardResult, LocatorToken};
use crate::models::{Card, Lane};

/// Gateway operations, used to name a call in the log or to inject a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardOperation {
    Find,
    Create,
    Move,
    Archive,
    Comment,
}

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCall {
    Find { token: String },
    Create { card_id: String, lane_id: String },
    Move { card_id: String, lane_id: String },
    Archive { card_id: String },
    Comment { card_id: String, text: String },
}

impl BoardCall {
    pub fn operation(&self) -> BoardOperation {
        match self {
            Self::Find { .. } => BoardOperation::Find,
            Self::Create { .. } => BoardOperation::Create,
            Self::Move { .. } => BoardOperation::Move,
            Self::Archive { .. } => BoardOperation::Archive,
            Self::Comment { .. } => BoardOperation::Comment,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Find { .. })
    }
}

/// Thread-safe in-memory board.
///
/// Cards keep insertion order so lookups are first-match like the remote scan.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoard {
    state: Arc<RwLock<BoardState>>,
}

#[derive(Debug, Default)]
struct BoardState {
    lanes: Vec<Lane>,
    cards: Vec<Card>,
    comments: HashMap<String, Vec<String>>,
    calls: Vec<BoardCall>,
    fail_on: Option<BoardOperation>,
}

impl InMemoryBoard {
    pub fn new(lanes: Vec<Lane>) -> Self {
        Self {
            state: Arc::new(RwLock::new(BoardState {
                lanes,
                ..BoardState::default()
            })),
        }
    }

    /// A board with the four standard triage lists.
    pub fn with_triage_lanes() -> Self {
        let names = [
            "Open Pull Requests",
            "Waiting on Maintainers",
            "Waiting on Contributor",
            "Needs Deep Dive",
        ];
        Self::new(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Lane {
                    id: format!("lane-{}", i),
                    name: name.to_string(),
                })
                .collect(),
        )
    }

    fn read(&self) -> RwLockReadGuard<'_, BoardState> {
        self.state.read().unwrap_or_else(|err| err.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BoardState> {
        self.state.write().unwrap_or_else(|err| err.into_inner())
    }

    /// Places a card on the board without recording a call.
    pub fn seed_card(&self, lane_id: &str, title: &str, description: &str) -> Card {
        let card = Card {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            lane_id: lane_id.to_string(),
            archived: false,
        };
        self.write().cards.push(card.clone());
        card
    }

    /// Makes every subsequent call of `operation` fail with a server error.
    pub fn fail_on(&self, operation: BoardOperation) {
        self.write().fail_on = Some(operation);
    }

    pub fn clear_failure(&self) {
        self.write().fail_on = None;
    }

    /// Every card ever placed on the board, archived ones included.
    pub fn cards(&self) -> Vec<Card> {
        self.read().cards.clone()
    }

    pub fn active_cards(&self) -> Vec<Card> {
        self.read()
            .cards
            .iter()
            .filter(|card| !card.archived)
            .cloned()
            .collect()
    }

    pub fn card(&self, id: &str) -> Option<Card> {
        self.read().cards.iter().find(|card| card.id == id).cloned()
    }

    pub fn comments(&self, card_id: &str) -> Vec<String> {
        self.read()
            .comments
            .get(card_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<BoardCall> {
        self.read().calls.clone()
    }

    /// Recorded calls that changed the board, in order.
    pub fn mutations(&self) -> Vec<BoardCall> {
        self.read()
            .calls
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.write().calls.clear();
    }
}

impl BoardState {
    fn check(&self, operation: BoardOperation) -> BoardResult<()> {
        if self.fail_on == Some(operation) {
            Err(BoardError::Server(format!("injected {:?} failure", operation)))
        } else {
            Ok(())
        }
    }

    fn lane_exists(&self, lane: &Lane) -> BoardResult<()> {
        if self.lanes.iter().any(|l| l.id == lane.id) {
            Ok(())
        } else {
            Err(BoardError::NotFound(format!("list {}", lane.id)))
        }
    }

    fn active_card_mut(&mut self, id: &str) -> BoardResult<&mut Card> {
        self.cards
            .iter_mut()
            .find(|card| card.id == id && !card.archived)
            .ok_or_else(|| BoardError::NotFound(format!("card {}", id)))
    }
}

#[async_trait]
impl BoardGateway for InMemoryBoard {
    async fn lanes(&self) -> BoardResult<Vec<Lane>> {
        Ok(self.read().lanes.clone())
    }

    async fn find_card(&self, token: &LocatorToken) -> BoardResult<Option<Card>> {
        let mut state = self.write();
        state.check(BoardOperation::Find)?;
        state.calls.push(BoardCall::Find {
            token: token.to_string(),
        });
        Ok(state
            .cards
            .iter()
            .find(|card| !card.archived && token.matches(&card.description))
            .cloned())
    }

    async fn create_card(&self, lane: &Lane, title: &str, description: &str) -> BoardResult<Card> {
        let mut state = self.write();
        state.check(BoardOperation::Create)?;
        state.lane_exists(lane)?;
        let card = Card {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: description.to_string(),
            lane_id: lane.id.clone(),
            archived: false,
        };
        state.cards.push(card.clone());
        state.calls.push(BoardCall::Create {
            card_id: card.id.clone(),
            lane_id: lane.id.clone(),
        });
        Ok(card)
    }

    async fn move_card(&self, card: &Card, lane: &Lane) -> BoardResult<()> {
        let mut state = self.write();
        state.check(BoardOperation::Move)?;
        state.lane_exists(lane)?;
        state.active_card_mut(&card.id)?.lane_id = lane.id.clone();
        state.calls.push(BoardCall::Move {
            card_id: card.id.clone(),
            lane_id: lane.id.clone(),
        });
        Ok(())
    }

    async fn archive_card(&self, card: &Card) -> BoardResult<()> {
        let mut state = self.write();
        state.check(BoardOperation::Archive)?;
        state.active_card_mut(&card.id)?.archived = true;
        state.calls.push(BoardCall::Archive {
            card_id: card.id.clone(),
        });
        Ok(())
    }

    async fn add_comment(&self, card: &Card, text: &str) -> BoardResult<()> {
        let mut state = self.write();
        state.check(BoardOperation::Comment)?;
        state.active_card_mut(&card.id)?;
        state
            .comments
            .entry(card.id.clone())
            .or_default()
            .push(text.to_string());
        state.calls.push(BoardCall::Comment {
            card_id: card.id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}
