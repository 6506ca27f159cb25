//! Hand phase state machine and the "betting is over, what next" policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::player_status::PlayerStatus;
use super::turn_order::{needs_to_act, SeatView};
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPhase {
    /// Created, blinds and hole cards not yet in place.
    Dealing,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Awarding,
    Complete,
}

impl HandPhase {
    pub const ALL: [HandPhase; 8] = [
        HandPhase::Dealing,
        HandPhase::Preflop,
        HandPhase::Flop,
        HandPhase::Turn,
        HandPhase::River,
        HandPhase::Showdown,
        HandPhase::Awarding,
        HandPhase::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HandPhase::Dealing => "dealing",
            HandPhase::Preflop => "preflop",
            HandPhase::Flop => "flop",
            HandPhase::Turn => "turn",
            HandPhase::River => "river",
            HandPhase::Showdown => "showdown",
            HandPhase::Awarding => "awarding",
            HandPhase::Complete => "complete",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == HandPhase::Complete
    }

    pub fn is_betting_street(self) -> bool {
        matches!(
            self,
            HandPhase::Preflop | HandPhase::Flop | HandPhase::Turn | HandPhase::River
        )
    }

    /// Community cards on the board once this phase is fully dealt.
    pub fn community_target(self) -> usize {
        match self {
            HandPhase::Dealing | HandPhase::Preflop => 0,
            HandPhase::Flop => 3,
            HandPhase::Turn => 4,
            HandPhase::River | HandPhase::Showdown | HandPhase::Awarding | HandPhase::Complete => 5,
        }
    }

    /// Next street in sequence; the river leads to showdown.
    pub fn next_street(self) -> Option<HandPhase> {
        match self {
            HandPhase::Preflop => Some(HandPhase::Flop),
            HandPhase::Flop => Some(HandPhase::Turn),
            HandPhase::Turn => Some(HandPhase::River),
            HandPhase::River => Some(HandPhase::Showdown),
            _ => None,
        }
    }

    pub fn can_transition_to(self, to: HandPhase) -> bool {
        use HandPhase::*;
        matches!(
            (self, to),
            (Dealing, Preflop)
                | (Preflop, Flop | Showdown | Awarding)
                | (Flop, Turn | Showdown | Awarding)
                | (Turn, River | Showdown | Awarding)
                | (River, Showdown | Awarding)
                | (Showdown, Awarding | Complete)
                | (Awarding, Complete)
        )
    }

    /// Checked transition; anything outside the table is a bug signal.
    pub fn transition(self, to: HandPhase) -> Result<HandPhase, DomainError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(DomainError::invalid_transition(self, to))
        }
    }
}

impl fmt::Display for HandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandPhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HandPhase::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::data_corruption(format!("unknown hand phase '{s}'")))
    }
}

fn in_hand(seats: &[SeatView]) -> impl Iterator<Item = &SeatView> {
    seats.iter().filter(|s| s.status.is_in_hand())
}

/// True when nobody owes a decision at the current bet.
pub fn is_betting_complete(seats: &[SeatView], current_bet: i64) -> bool {
    if in_hand(seats).count() <= 1 {
        return true;
    }
    in_hand(seats).all(|s| {
        s.status == PlayerStatus::AllIn
            || s.stack == 0
            || (s.status == PlayerStatus::Acted && s.bet >= current_bet)
    }) && !seats.iter().any(|s| needs_to_act(s, current_bet))
}

/// Phase to enter once a betting street closes.
///
/// All-in confrontations go straight to showdown from any street.
pub fn phase_after_betting(phase: HandPhase, seats: &[SeatView], current_bet: i64) -> HandPhase {
    let live: Vec<&SeatView> = in_hand(seats).collect();
    if live.len() <= 1 {
        return HandPhase::Awarding;
    }

    let not_all_in: Vec<&&SeatView> = live
        .iter()
        .filter(|s| s.status != PlayerStatus::AllIn && s.stack > 0)
        .collect();
    match not_all_in.as_slice() {
        [] => return HandPhase::Showdown,
        [only] if only.bet >= current_bet => return HandPhase::Showdown,
        _ => {}
    }

    phase.next_street().unwrap_or(HandPhase::Showdown)
}
