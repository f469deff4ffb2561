use std::collections::HashSet;

/// The logins whose own activity on a pull request does not move its card.
///
/// Loaded once at startup and shared read-only for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    insiders: HashSet<String>,
}

impl Roster {
    pub fn new<I, S>(logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            insiders: logins.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive lookup. An absent login is never an insider.
    pub fn is_insider(&self, login: Option<&str>) -> bool {
        login.is_some_and(|login| self.insiders.contains(login))
    }

    pub fn len(&self) -> usize {
        self.insiders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insiders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_members_and_strangers() {
        let roster = Roster::new(["alice", "bob"]);
        assert!(roster.is_insider(Some("alice")));
        assert!(roster.is_insider(Some("bob")));
        assert!(!roster.is_insider(Some("mallory")));
        assert!(!roster.is_insider(Some("Alice")));
        assert!(!roster.is_insider(None));
    }

    #[test]
    fn repeated_lookups_do_not_change_the_roster() {
        let roster = Roster::new(vec!["alice".to_string()]);
        for _ in 0..3 {
            assert!(roster.is_insider(Some("alice")));
        }
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn empty_roster_has_no_insiders() {
        let roster = Roster::default();
        assert!(roster.is_empty());
        assert!(!roster.is_insider(Some("anyone")));
    }
}
