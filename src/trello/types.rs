//! Wire types for the Trello REST API.

use serde::Deserialize;
use triage_core::models::{Card, Lane};

#[derive(Debug, Clone, Deserialize)]
pub struct TrelloList {
    pub id: String,
    pub name: String,
}

impl From<TrelloList> for Lane {
    fn from(list: TrelloList) -> Self {
        Lane {
            id: list.id,
            name: list.name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrelloCard {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: String,
    pub id_list: String,
    #[serde(default)]
    pub closed: bool,
}

impl From<TrelloCard> for Card {
    fn from(card: TrelloCard) -> Self {
        Card {
            id: card.id,
            title: card.name,
            description: card.desc,
            lane_id: card.id_list,
            archived: card.closed,
        }
    }
}
