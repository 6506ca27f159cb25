//! Action kinds recorded in the per-hand action log.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    /// Declared shove; resolved to a call, bet or raise for the whole stack.
    AllIn,
    PostSmallBlind,
    PostBigBlind,
    PostAnte,
    /// Chips a bettor gets back because nobody could match them.
    UncalledReturn,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call => "call",
            ActionKind::Bet => "bet",
            ActionKind::Raise => "raise",
            ActionKind::AllIn => "all_in",
            ActionKind::PostSmallBlind => "post_small_blind",
            ActionKind::PostBigBlind => "post_big_blind",
            ActionKind::PostAnte => "post_ante",
            ActionKind::UncalledReturn => "uncalled_return",
        }
    }

    /// Kinds a player may submit; the rest are posted by the engine.
    pub fn is_player_declared(self) -> bool {
        matches!(
            self,
            ActionKind::Fold
                | ActionKind::Check
                | ActionKind::Call
                | ActionKind::Bet
                | ActionKind::Raise
                | ActionKind::AllIn
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "fold" => ActionKind::Fold,
            "check" => ActionKind::Check,
            "call" => ActionKind::Call,
            "bet" => ActionKind::Bet,
            "raise" => ActionKind::Raise,
            "all_in" => ActionKind::AllIn,
            "post_small_blind" => ActionKind::PostSmallBlind,
            "post_big_blind" => ActionKind::PostBigBlind,
            "post_ante" => ActionKind::PostAnte,
            "uncalled_return" => ActionKind::UncalledReturn,
            other => {
                return Err(DomainError::validation(
                    ValidationKind::IllegalAction,
                    format!("unknown action kind '{other}'"),
                ))
            }
        };
        Ok(kind)
    }
}
