use serde::{Deserialize, Serialize};

use crate::board::BoardError;

/// The semantic role of one of the four triage lanes.
///
/// Roles are bound positionally: the first lane on the board is always
/// `OpenPr`, the second `WaitingOnMaintainers`, and so on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LaneRole {
    OpenPr,
    WaitingOnMaintainers,
    WaitingOnContributor,
    NeedsDeepDive,
}

impl LaneRole {
    /// All roles in board order.
    pub const ALL: [LaneRole; 4] = [
        Self::OpenPr,
        Self::WaitingOnMaintainers,
        Self::WaitingOnContributor,
        Self::NeedsDeepDive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenPr => "open_pr",
            Self::WaitingOnMaintainers => "waiting_on_maintainers",
            Self::WaitingOnContributor => "waiting_on_contributor",
            Self::NeedsDeepDive => "needs_deep_dive",
        }
    }

    /// Lanes that routine activity (comments, force pushes) must not move a card out of.
    pub fn is_sticky(&self) -> bool {
        matches!(self, Self::OpenPr | Self::NeedsDeepDive)
    }
}

impl std::fmt::Display for LaneRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A list on the remote board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lane {
    pub id: String,
    pub name: String,
}

/// A card on the remote board representing one pull request.
///
/// The card has no foreign key to the pull request; it is found again by the
/// pull request URL embedded in `description`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub description: String,
    pub lane_id: String,
    #[serde(default)]
    pub archived: bool,
}

/// The four lanes a triage board is made of, bound to their roles.
///
/// Built once at startup from the board's lane metadata and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardLayout {
    lanes: [Lane; 4],
}

impl BoardLayout {
    /// Bind the first four lanes, in order, to [`LaneRole::ALL`].
    ///
    /// Extra lanes are ignored. Fewer than four is an invalid board.
    pub fn from_lanes(lanes: Vec<Lane>) -> Result<Self, BoardError> {
        let found = lanes.len();
        let mut iter = lanes.into_iter();
        match (iter.next(), iter.next(), iter.next(), iter.next()) {
            (Some(open), Some(maintainers), Some(contributor), Some(deep_dive)) => Ok(Self {
                lanes: [open, maintainers, contributor, deep_dive],
            }),
            _ => Err(BoardError::InvalidLayout(format!(
                "board has {} lists, at least 4 are required",
                found
            ))),
        }
    }

    pub fn lane(&self, role: LaneRole) -> &Lane {
        match role {
            LaneRole::OpenPr => &self.lanes[0],
            LaneRole::WaitingOnMaintainers => &self.lanes[1],
            LaneRole::WaitingOnContributor => &self.lanes[2],
            LaneRole::NeedsDeepDive => &self.lanes[3],
        }
    }

    /// The role of the lane with the given id, if it is one of the bound four.
    pub fn role_of(&self, lane_id: &str) -> Option<LaneRole> {
        LaneRole::ALL
            .into_iter()
            .find(|role| self.lane(*role).id == lane_id)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (LaneRole, &Lane)> {
        LaneRole::ALL.into_iter().map(|role| (role, self.lane(role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lanes(n: usize) -> Vec<Lane> {
        (0..n)
            .map(|i| Lane {
                id: format!("lane-{}", i),
                name: format!("Lane {}", i),
            })
            .collect()
    }

    #[test]
    fn binds_first_four_lanes_in_order() {
        let layout = BoardLayout::from_lanes(lanes(5)).unwrap();
        assert_eq!(layout.lane(LaneRole::OpenPr).id, "lane-0");
        assert_eq!(layout.lane(LaneRole::NeedsDeepDive).id, "lane-3");
        assert_eq!(layout.role_of("lane-1"), Some(LaneRole::WaitingOnMaintainers));
        assert_eq!(layout.role_of("lane-4"), None);
    }

    #[test]
    fn rejects_board_with_too_few_lanes() {
        let err = BoardLayout::from_lanes(lanes(3)).unwrap_err();
        assert!(matches!(err, BoardError::InvalidLayout(_)));
    }

    #[test]
    fn sticky_lanes_are_open_and_deep_dive() {
        assert!(LaneRole::OpenPr.is_sticky());
        assert!(LaneRole::NeedsDeepDive.is_sticky());
        assert!(!LaneRole::WaitingOnMaintainers.is_sticky());
        assert!(!LaneRole::WaitingOnContributor.is_sticky());
    }
}
