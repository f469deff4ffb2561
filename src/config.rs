//! Process configuration.
//!
//! Board credentials and the webhook secret come from command-line flags or
//! environment variables. The insider roster lives in a YAML file:
//!
//! ```yaml
//! employees:
//!   - octocat
//!   - hubot
//! ```

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;
use thiserror::Error;
use triage_core::Roster;

use crate::trello::{TrelloClient, DEFAULT_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Remote board settings.
#[derive(Debug, Clone, Args)]
pub struct BoardArgs {
    /// Identifier of the triage board
    #[arg(long, env = "TRELLO_BOARD_ID")]
    pub board_id: String,

    /// Developer API key for the board API
    #[arg(long, env = "PUBLIC_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Member token for the board API
    #[arg(long, env = "MEMBER_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Base URL of the board API
    #[arg(long, env = "TRELLO_API_URL", default_value = DEFAULT_URL)]
    pub api_url: String,
}

impl BoardArgs {
    pub fn client(&self) -> TrelloClient {
        TrelloClient::new(
            self.api_url.clone(),
            self.board_id.clone(),
            self.api_key.clone(),
            self.token.clone(),
        )
    }
}

/// Contents of the YAML config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub employees: Option<Vec<String>>,
}

impl ConfigFile {
    /// Load the config file. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using empty roster");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    pub fn roster(&self) -> Roster {
        Roster::new(self.employees.iter().flatten().cloned())
    }
}

/// Shared secret for webhook signatures. No secret disables verification.
#[derive(Debug, Clone, Default)]
pub struct WebhookSecret(Option<String>);

impl WebhookSecret {
    pub fn new(secret: Option<String>) -> Self {
        Self(secret.filter(|s| !s.is_empty()))
    }

    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn key(&self) -> Option<&[u8]> {
        self.0.as_deref().map(str::as_bytes)
    }
}
