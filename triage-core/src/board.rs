//! Board gateway port.
//!
//! The reconciler talks to the remote board only through [`BoardGateway`].
//! Calls are independent remote operations: the board offers no transactions,
//! so a multi-step change can stop half way.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Card, Lane, LINK_PREFIX};

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors returned by board gateway implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board request failed: {0}")]
    Http(String),

    #[error("board rejected credentials")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("board server error: {0}")]
    Server(String),

    #[error("invalid board configuration: {0}")]
    InvalidLayout(String),
}

/// The key a card is found by: the pull request URL embedded in its description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatorToken(String);

impl LocatorToken {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `description` is the card for this URL.
    ///
    /// Only the template's `Link:` line counts. The body comes before it and
    /// may itself contain `Link:` lines, so the last one wins.
    pub fn matches(&self, description: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        description
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(LINK_PREFIX))
            .is_some_and(|url| url.trim_end() == self.0)
    }
}

impl std::fmt::Display for LocatorToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Card operations on the remote triage board.
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Lists on the board, in board order. Read once at startup.
    async fn lanes(&self) -> BoardResult<Vec<Lane>>;

    /// First non-archived card whose description carries the token.
    ///
    /// Implementations scan every card; there is no index.
    async fn find_card(&self, token: &LocatorToken) -> BoardResult<Option<Card>>;

    /// Creates a card at the bottom of `lane`.
    async fn create_card(&self, lane: &Lane, title: &str, description: &str) -> BoardResult<Card>;

    async fn move_card(&self, card: &Card, lane: &Lane) -> BoardResult<()>;

    /// Archives the card. Archived cards are never returned by [`Self::find_card`].
    async fn archive_card(&self, card: &Card) -> BoardResult<()>;

    async fn add_comment(&self, card: &Card, text: &str) -> BoardResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://github.com/acme/widgets/pull/1";

    #[test]
    fn matches_url_in_card_template() {
        let token = LocatorToken::new(URL);
        let description = format!("Body\n\nOpened by: someone\nLink: {}\nCreated: now", URL);
        assert!(token.matches(&description));
    }

    #[test]
    fn matches_url_at_end_of_description() {
        assert!(LocatorToken::new(URL).matches(&format!("Link: {}", URL)));
    }

    #[test]
    fn does_not_match_longer_pull_request_number() {
        let token = LocatorToken::new(URL);
        let description = "Link: https://github.com/acme/widgets/pull/12\nCreated: now";
        assert!(!token.matches(description));
    }

    #[test]
    fn does_not_match_sub_path_of_pull_request() {
        let token = LocatorToken::new(URL);
        assert!(!token.matches("Link: https://github.com/acme/widgets/pull/1/files"));
    }

    #[test]
    fn ignores_mentions_in_the_body() {
        let token = LocatorToken::new(URL);
        let description = format!(
            "Supersedes {}\n\nOpened by: someone\nLink: https://github.com/acme/widgets/pull/12\nCreated: now",
            URL
        );
        assert!(!token.matches(&description));
    }

    #[test]
    fn ignores_link_lines_quoted_in_the_body() {
        let token = LocatorToken::new(URL);
        let description = format!(
            "Link: {}\n\nOpened by: someone\nLink: https://github.com/acme/widgets/pull/12\nCreated: now",
            URL
        );
        assert!(!token.matches(&description));
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let token = LocatorToken::new(URL);
        assert!(token.matches(&format!("Body\r\nLink: {}\r\nCreated: now", URL)));
    }

    #[test]
    fn url_with_regex_metacharacters_is_literal() {
        let token = LocatorToken::new("https://example.test/a+b/pull/1");
        assert!(!token.matches("Link: https://example.test/aab/pull/1"));
        assert!(token.matches("Link: https://example.test/a+b/pull/1"));
    }

    #[test]
    fn empty_token_matches_nothing() {
        assert!(!LocatorToken::new("").matches("anything"));
    }
}
