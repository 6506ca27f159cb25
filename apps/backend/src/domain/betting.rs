//! Legal actions and server-side re-validation of a submitted action.
//!
//! Every bound is an absolute street total ("raise to 60"), never a delta.

use serde::Serialize;

use super::actions::ActionKind;
use super::player_status::PlayerStatus;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BettingInput {
    pub status: PlayerStatus,
    pub current_bet: i64,
    pub player_bet: i64,
    pub stack: i64,
    pub min_raise_increment: i64,
    pub big_blind: i64,
}

impl BettingInput {
    fn to_call(&self) -> i64 {
        (self.current_bet - self.player_bet).max(0)
    }

    /// Street total if the whole stack goes in.
    fn shove_total(&self) -> i64 {
        self.player_bet + self.stack
    }

    fn is_to_act(&self) -> bool {
        self.status.may_act() && self.stack > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LegalActions {
    pub can_fold: bool,
    pub can_check: bool,
    pub can_call: bool,
    /// Chips a call adds, capped at the stack.
    pub call_amount: i64,
    pub can_bet: bool,
    pub min_bet: i64,
    pub max_bet: i64,
    pub can_raise: bool,
    pub min_raise: i64,
    pub max_raise: i64,
}

/// Legal actions for the seat to act. A seat that is not to act has none.
pub fn legal_actions(input: &BettingInput) -> LegalActions {
    if !input.is_to_act() {
        return LegalActions::default();
    }

    let to_call = input.to_call();
    let shove = input.shove_total();
    let mut legal = LegalActions {
        can_fold: true,
        can_check: to_call == 0,
        ..LegalActions::default()
    };

    if to_call > 0 {
        legal.can_call = true;
        legal.call_amount = to_call.min(input.stack);
    }

    if input.current_bet == 0 {
        legal.can_bet = true;
        legal.min_bet = input.big_blind.min(shove);
        legal.max_bet = shove;
    } else {
        let min_raise = input.current_bet + input.min_raise_increment;
        if min_raise <= shove {
            legal.can_raise = true;
            legal.min_raise = min_raise;
            legal.max_raise = shove;
        }
    }

    legal
}

/// A submission after re-validation, with the chip movement it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedAction {
    /// Normalized kind (a declared all-in resolves to call, bet or raise).
    pub kind: ActionKind,
    /// Seat's street total after the action.
    pub target: i64,
    pub chips_added: i64,
    pub all_in: bool,
    /// Hand-level current bet after the action.
    pub new_current_bet: i64,
    /// Hand-level minimum raise increment after the action.
    pub new_min_raise_increment: i64,
}

fn illegal(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::IllegalAction, detail)
}

fn bad_amount(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidAmount, detail)
}

fn normalize(declared: ActionKind, input: &BettingInput) -> ActionKind {
    match declared {
        ActionKind::Raise if input.current_bet == 0 => ActionKind::Bet,
        ActionKind::Bet if input.current_bet > 0 => ActionKind::Raise,
        ActionKind::Call if input.to_call() == 0 => ActionKind::Check,
        other => other,
    }
}

/// Re-validate a declared action against current state.
///
/// Tolerates caller drift: a raise with no bet to raise becomes a bet and a call
/// with nothing to call becomes a check. `amount` is the absolute street total for
/// bets and raises and is ignored otherwise.
pub fn validate_action(
    input: &BettingInput,
    declared: ActionKind,
    amount: Option<i64>,
) -> Result<ValidatedAction, DomainError> {
    if !declared.is_player_declared() {
        return Err(illegal(format!("{declared} cannot be submitted")));
    }
    if !input.is_to_act() {
        return Err(illegal(format!(
            "seat with status {} cannot act",
            input.status
        )));
    }

    let legal = legal_actions(input);
    let kind = normalize(declared, input);
    let shove = input.shove_total();

    let target = match kind {
        ActionKind::Fold => input.player_bet,
        ActionKind::Check => {
            if !legal.can_check {
                return Err(illegal(format!(
                    "cannot check facing {} to call",
                    input.to_call()
                )));
            }
            input.player_bet
        }
        ActionKind::Call => input.player_bet + legal.call_amount,
        ActionKind::Bet => {
            let amount = amount.ok_or_else(|| bad_amount("bet requires an amount"))?;
            if amount < legal.min_bet || amount > legal.max_bet {
                return Err(bad_amount(format!(
                    "bet to {amount} outside [{}, {}]",
                    legal.min_bet, legal.max_bet
                )));
            }
            amount
        }
        ActionKind::Raise => {
            if !legal.can_raise {
                return Err(illegal(format!(
                    "raise needs at least {} but stack allows {shove}",
                    input.current_bet + input.min_raise_increment
                )));
            }
            let amount = amount.ok_or_else(|| bad_amount("raise requires an amount"))?;
            if amount < legal.min_raise || amount > legal.max_raise {
                return Err(bad_amount(format!(
                    "raise to {amount} outside [{}, {}]",
                    legal.min_raise, legal.max_raise
                )));
            }
            amount
        }
        ActionKind::AllIn => shove,
        _ => return Err(illegal(format!("{kind} cannot be submitted"))),
    };

    let chips_added = target - input.player_bet;
    let all_in = kind != ActionKind::Fold && chips_added == input.stack;

    // Resolve a declared shove to what it amounts to.
    let kind = if kind == ActionKind::AllIn {
        if target <= input.current_bet {
            ActionKind::Call
        } else if input.current_bet == 0 {
            ActionKind::Bet
        } else {
            ActionKind::Raise
        }
    } else {
        kind
    };

    let new_current_bet = input.current_bet.max(target);
    let raise_size = new_current_bet - input.current_bet;
    // Only a full raise reopens sizing; a short all-in leaves the increment alone.
    let new_min_raise_increment = if raise_size >= input.min_raise_increment {
        raise_size
    } else {
        input.min_raise_increment
    };

    Ok(ValidatedAction {
        kind,
        target,
        chips_added,
        all_in,
        new_current_bet,
        new_min_raise_increment,
    })
}
