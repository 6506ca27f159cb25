//! Board run-out and showdown resolution over the pot engine.

use std::collections::{BTreeMap, BTreeSet};

use super::cards::Card;
use super::evaluator::{HandEvaluator, SolvedHand};
use super::pots::{award_pots, PotLayer};
use crate::errors::domain::DomainError;

/// Burn one card, then deal until the board holds `target` cards.
///
/// No-op when the board is already at or past `target`.
pub fn deal_street(
    board: &mut Vec<Card>,
    deck: &mut Vec<Card>,
    target: usize,
) -> Result<(), DomainError> {
    if board.len() >= target {
        return Ok(());
    }
    let needed = target - board.len() + 1;
    if deck.len() < needed {
        return Err(DomainError::data_corruption(format!(
            "deck has {} cards, street needs {needed}",
            deck.len()
        )));
    }
    let count = target - board.len();
    deck.remove(0);
    board.extend(deck.drain(..count));
    Ok(())
}

/// Community-card total after the next street is dealt.
pub fn next_street_target(board_len: usize) -> usize {
    match board_len {
        0..=2 => 3,
        3 => 4,
        _ => 5,
    }
}

/// Deal every missing street street by street.
pub fn run_out_board(board: &mut Vec<Card>, deck: &mut Vec<Card>) -> Result<(), DomainError> {
    while board.len() < 5 {
        let target = next_street_target(board.len());
        deal_street(board, deck, target)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowdownOutcome {
    pub solved: BTreeMap<u8, SolvedHand>,
    pub awards: BTreeMap<u8, i64>,
}

impl ShowdownOutcome {
    pub fn winning_seats(&self) -> BTreeSet<u8> {
        self.awards
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(seat, _)| *seat)
            .collect()
    }
}

/// Rank every contender once and split each layer among its best hands.
pub fn resolve_showdown(
    evaluator: &dyn HandEvaluator,
    board: &[Card],
    hands: &[(u8, [Card; 2])],
    layers: &[PotLayer],
    dealer_seat: u8,
) -> Result<ShowdownOutcome, DomainError> {
    let board: [Card; 5] = board.try_into().map_err(|_| {
        DomainError::data_corruption(format!("showdown with {} board cards", board.len()))
    })?;

    let mut solved: BTreeMap<u8, SolvedHand> = BTreeMap::new();
    for (seat, hole) in hands {
        let seven = [
            hole[0], hole[1], board[0], board[1], board[2], board[3], board[4],
        ];
        solved.insert(*seat, evaluator.solve(&seven));
    }

    let awards = award_pots(layers, dealer_seat, |eligible| {
        let contenders: Vec<(u8, SolvedHand)> = eligible
            .iter()
            .filter_map(|seat| solved.get(seat).map(|h| (*seat, h.clone())))
            .collect();
        let hands: Vec<SolvedHand> = contenders.iter().map(|(_, h)| h.clone()).collect();
        evaluator
            .winners(&hands)
            .into_iter()
            .filter_map(|i| contenders.get(i).map(|(seat, _)| *seat))
            .collect()
    });

    Ok(ShowdownOutcome { solved, awards })
}
