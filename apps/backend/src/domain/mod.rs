//! Domain layer: pure table rules. No database, no async.

pub mod actions;
pub mod betting;
pub mod cards;
pub mod cards_serde;
pub mod evaluator;
pub mod hand_phase;
pub mod player_status;
pub mod pots;
pub mod seed_derivation;
pub mod showdown;
pub mod turn_order;

#[cfg(test)]
mod tests_props_turn_order;

// Re-exports for ergonomics
pub use actions::ActionKind;
pub use betting::{legal_actions, validate_action, BettingInput, LegalActions, ValidatedAction};
pub use cards::{Card, Rank, Suit};
pub use evaluator::{HandEvaluator, RankCategory, SolvedHand, StandardEvaluator};
pub use hand_phase::HandPhase;
pub use player_status::PlayerStatus;
pub use pots::{Contribution, PotLayer};
pub use turn_order::{SeatView, SeatingShape};
