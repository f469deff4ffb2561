use serde::{Deserialize, Serialize};

/// The `action` of an inbound webhook, as far as triage cares about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Opened,
    Reopened,
    /// A comment was created on the pull request.
    Created,
    Edited,
    Labeled,
    /// The pull request branch was force pushed.
    Synchronize,
    Closed,
    /// Any action triage does not act on.
    Other(String),
}

impl EventKind {
    pub fn parse(action: &str) -> Self {
        match action {
            "opened" => Self::Opened,
            "reopened" => Self::Reopened,
            "created" => Self::Created,
            "edited" => Self::Edited,
            "labeled" => Self::Labeled,
            "synchronize" => Self::Synchronize,
            "closed" => Self::Closed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Reopened => "reopened",
            Self::Created => "created",
            Self::Edited => "edited",
            Self::Labeled => "labeled",
            Self::Synchronize => "synchronize",
            Self::Closed => "closed",
            Self::Other(action) => action,
        }
    }

    /// Whether an insider performing this action leaves the board untouched.
    ///
    /// Labels, force pushes and closes are honoured from anyone.
    pub fn is_insider_gated(&self) -> bool {
        matches!(
            self,
            Self::Opened | Self::Reopened | Self::Created | Self::Edited
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields shared by both subject shapes a webhook can carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectFields {
    pub html_url: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_at: Option<String>,
}

/// What the webhook is about: a pull request object, or an issue object
/// (comment events on pull requests arrive issue-shaped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "fields", rename_all = "snake_case")]
pub enum Subject {
    PullRequest(SubjectFields),
    Issue(SubjectFields),
}

impl Subject {
    pub fn fields(&self) -> &SubjectFields {
        match self {
            Self::PullRequest(fields) | Self::Issue(fields) => fields,
        }
    }

    pub fn is_pull_request(&self) -> bool {
        matches!(self, Self::PullRequest(_))
    }
}

/// Prefix of the description line that carries the pull request URL.
pub const LINK_PREFIX: &str = "Link: ";

/// Normalized view of the pull request an event refers to.
///
/// Every field is populated; missing values carry placeholder text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub url: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub author: String,
}

impl PullRequestRecord {
    /// The card description. The `Link:` line is what later lookups key on.
    pub fn card_description(&self) -> String {
        format!(
            "{}\n\nOpened by: {}\n{}{}\nCreated: {}",
            self.body, self.author, LINK_PREFIX, self.url, self.created_at
        )
    }
}

/// A classified, normalized webhook event ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub kind: EventKind,
    pub subject: Subject,
    pub record: PullRequestRecord,
    /// The raw acting login, if the payload named one.
    pub actor: Option<String>,
    pub comment_url: Option<String>,
    pub label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_actions_and_keeps_unknown_ones() {
        assert_eq!(EventKind::parse("synchronize"), EventKind::Synchronize);
        assert_eq!(
            EventKind::parse("assigned"),
            EventKind::Other("assigned".to_string())
        );
        assert_eq!(EventKind::parse("assigned").as_str(), "assigned");
    }

    #[test]
    fn only_contributor_activity_is_insider_gated() {
        assert!(EventKind::Opened.is_insider_gated());
        assert!(EventKind::Edited.is_insider_gated());
        assert!(!EventKind::Labeled.is_insider_gated());
        assert!(!EventKind::Synchronize.is_insider_gated());
        assert!(!EventKind::Closed.is_insider_gated());
    }

    #[test]
    fn card_description_uses_fixed_template() {
        let record = PullRequestRecord {
            url: "https://github.com/acme/widgets/pull/7".to_string(),
            title: "Fix".to_string(),
            body: "Fixes the thing".to_string(),
            created_at: "2016-10-01T00:00:00Z".to_string(),
            author: "octocat".to_string(),
        };
        assert_eq!(
            record.card_description(),
            "Fixes the thing\n\nOpened by: octocat\nLink: https://github.com/acme/widgets/pull/7\nCreated: 2016-10-01T00:00:00Z"
        );
    }
}
