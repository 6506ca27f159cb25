//! Per-seat status lifecycle within a hand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::actions::ActionKind;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    /// In the hand, has not acted this street.
    Waiting,
    /// Currently to act.
    Active,
    Acted,
    Folded,
    AllIn,
    SittingOut,
    /// Out of chips for good. Terminal.
    Eliminated,
}

impl PlayerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerStatus::Waiting => "waiting",
            PlayerStatus::Active => "active",
            PlayerStatus::Acted => "acted",
            PlayerStatus::Folded => "folded",
            PlayerStatus::AllIn => "all_in",
            PlayerStatus::SittingOut => "sitting_out",
            PlayerStatus::Eliminated => "eliminated",
        }
    }

    /// Still holding cards in the current hand.
    pub fn is_in_hand(self) -> bool {
        !matches!(
            self,
            PlayerStatus::Folded | PlayerStatus::SittingOut | PlayerStatus::Eliminated
        )
    }

    /// Status allows a betting decision (stack permitting).
    pub fn may_act(self) -> bool {
        matches!(
            self,
            PlayerStatus::Waiting | PlayerStatus::Active | PlayerStatus::Acted
        )
    }

    /// Eligible to receive cards when a hand starts (stack permitting).
    pub fn is_dealt_in(self) -> bool {
        !matches!(self, PlayerStatus::SittingOut | PlayerStatus::Eliminated)
    }

    pub fn is_terminal(self) -> bool {
        self == PlayerStatus::Eliminated
    }

    /// A new betting round: acted/active go back to waiting, everything else is kept.
    pub fn reset_for_new_round(self) -> Self {
        match self {
            PlayerStatus::Acted | PlayerStatus::Active => PlayerStatus::Waiting,
            other => other,
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "waiting" => PlayerStatus::Waiting,
            "active" => PlayerStatus::Active,
            "acted" => PlayerStatus::Acted,
            "folded" => PlayerStatus::Folded,
            "all_in" => PlayerStatus::AllIn,
            "sitting_out" => PlayerStatus::SittingOut,
            "eliminated" => PlayerStatus::Eliminated,
            other => {
                return Err(DomainError::data_corruption(format!(
                    "unknown player status '{other}'"
                )))
            }
        })
    }
}

/// Status after a seat's action, given the stack left once chips moved.
pub fn status_after_action(
    current: PlayerStatus,
    kind: ActionKind,
    stack_after: i64,
) -> PlayerStatus {
    match kind {
        ActionKind::Fold => PlayerStatus::Folded,
        ActionKind::UncalledReturn => current,
        _ if stack_after == 0 => PlayerStatus::AllIn,
        // Antes are not a decision; the seat still has to act this street.
        ActionKind::PostAnte => current,
        ActionKind::Check
        | ActionKind::Call
        | ActionKind::Bet
        | ActionKind::Raise
        | ActionKind::AllIn
        | ActionKind::PostSmallBlind
        | ActionKind::PostBigBlind => PlayerStatus::Acted,
    }
}
