//! HTTP client for the Trello board API.
//!
//! Implements [`BoardGateway`] for a single board. Credentials are the
//! developer key and member token, sent as query parameters on every request.
//! Write payloads travel as JSON bodies, since card descriptions carry the
//! whole pull request body.

mod types;

pub use types::*;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use triage_core::board::{BoardError, BoardGateway, BoardResult, LocatorToken};
use triage_core::models::{Card, Lane};

/// Default URL of the public Trello API.
pub const DEFAULT_URL: &str = "https://api.trello.com/1";

const CARD_FIELDS: &str = "id,name,desc,idList,closed";

/// Trello client bound to one board.
#[derive(Debug, Clone)]
pub struct TrelloClient {
    base_url: String,
    board_id: String,
    api_key: String,
    token: String,
    client: Client,
}

impl TrelloClient {
    pub fn new(
        base_url: impl Into<String>,
        board_id: impl Into<String>,
        api_key: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            board_id: board_id.into(),
            api_key: api_key.into(),
            token: token.into(),
            client: Client::new(),
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    /// Build a request carrying the auth query parameters.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .query(&[("key", self.api_key.as_str()), ("token", self.token.as_str())])
    }

    /// Handle response, converting HTTP errors to BoardError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> BoardResult<T> {
        let response = check_status(response).await?;
        response.json().await.map_err(http_error)
    }

    /// Handle response whose body is not needed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> BoardResult<()> {
        check_status(response).await.map(|_| ())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> BoardResult<reqwest::Response> {
        request.send().await.map_err(http_error)
    }

    /// All open cards on the board, in board order.
    pub async fn open_cards(&self) -> BoardResult<Vec<Card>> {
        let response = self
            .send(
                self.request(
                    reqwest::Method::GET,
                    &format!("/boards/{}/cards", self.board_id),
                )
                .query(&[("filter", "open"), ("fields", CARD_FIELDS)]),
            )
            .await?;
        let cards: Vec<TrelloCard> = self.handle_response(response).await?;
        Ok(cards.into_iter().map(Card::from).collect())
    }
}

fn http_error(err: reqwest::Error) -> BoardError {
    BoardError::Http(err.to_string())
}

async fn check_status(response: reqwest::Response) -> BoardResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => Err(BoardError::Unauthorized),
        StatusCode::NOT_FOUND => Err(BoardError::NotFound(body)),
        _ => Err(BoardError::Server(format!("{}: {}", status, body))),
    }
}

#[async_trait]
impl BoardGateway for TrelloClient {
    async fn lanes(&self) -> BoardResult<Vec<Lane>> {
        let response = self
            .send(
                self.request(
                    reqwest::Method::GET,
                    &format!("/boards/{}/lists", self.board_id),
                )
                .query(&[("filter", "open"), ("fields", "id,name")]),
            )
            .await?;
        let lists: Vec<TrelloList> = self.handle_response(response).await?;
        Ok(lists.into_iter().map(Lane::from).collect())
    }

    async fn find_card(&self, token: &LocatorToken) -> BoardResult<Option<Card>> {
        let cards = self.open_cards().await?;
        tracing::debug!(cards = cards.len(), token = %token, "Scanning board for card");
        Ok(cards
            .into_iter()
            .find(|card| !card.archived && token.matches(&card.description)))
    }

    async fn create_card(&self, lane: &Lane, title: &str, description: &str) -> BoardResult<Card> {
        let response = self
            .send(self.request(reqwest::Method::POST, "/cards").json(&json!({
                "idList": lane.id,
                "name": title,
                "desc": description,
                "pos": "bottom",
            })))
            .await?;
        let card: TrelloCard = self.handle_response(response).await?;
        Ok(card.into())
    }

    async fn move_card(&self, card: &Card, lane: &Lane) -> BoardResult<()> {
        let response = self
            .send(
                self.request(reqwest::Method::PUT, &format!("/cards/{}", card.id))
                    .json(&json!({ "idList": lane.id })),
            )
            .await?;
        self.handle_empty_response(response).await
    }

    async fn archive_card(&self, card: &Card) -> BoardResult<()> {
        let response = self
            .send(
                self.request(reqwest::Method::PUT, &format!("/cards/{}", card.id))
                    .json(&json!({ "closed": true })),
            )
            .await?;
        self.handle_empty_response(response).await
    }

    async fn add_comment(&self, card: &Card, text: &str) -> BoardResult<()> {
        let response = self
            .send(
                self.request(
                    reqwest::Method::POST,
                    &format!("/cards/{}/actions/comments", card.id),
                )
                .json(&json!({ "text": text })),
            )
            .await?;
        self.handle_empty_response(response).await
    }
}
