//! Pot engine: side-pot layering over hand contributions and award splitting.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::turn_order::clockwise_from;

/// Chips one seat has committed this hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub seat: u8,
    pub amount: i64,
    pub folded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PotLayer {
    pub amount: i64,
    pub eligible: BTreeSet<u8>,
}

/// Partition committed chips into a main pot and side pots.
///
/// Levels come from live (non-folded) contributions. Folded chips count toward
/// layer amounts but never toward eligibility. `carried` is dead money with no
/// owning seat (antes): it forms the base layer, open to every live seat
/// including one whose whole stack went in as the ante.
pub fn calculate_pots(contributions: &[Contribution], carried: i64) -> Vec<PotLayer> {
    let live: BTreeSet<u8> = contributions
        .iter()
        .filter(|c| !c.folded)
        .map(|c| c.seat)
        .collect();
    let mut levels: Vec<i64> = contributions
        .iter()
        .filter(|c| !c.folded && c.amount > 0)
        .map(|c| c.amount)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut layers: Vec<PotLayer> = Vec::new();
    if carried > 0 {
        layers.push(PotLayer {
            amount: carried,
            eligible: live.clone(),
        });
    }

    let mut prev = 0i64;
    for level in levels {
        let amount: i64 = contributions
            .iter()
            .map(|c| c.amount.min(level) - c.amount.min(prev))
            .sum();
        let eligible: BTreeSet<u8> = contributions
            .iter()
            .filter(|c| !c.folded && c.amount >= level)
            .map(|c| c.seat)
            .collect();
        prev = level;

        match layers.last_mut() {
            Some(last) if last.eligible == eligible => last.amount += amount,
            _ => layers.push(PotLayer { amount, eligible }),
        }
    }

    // Folded chips above the highest live level.
    let leftover: i64 = contributions
        .iter()
        .map(|c| c.amount - c.amount.min(prev))
        .sum();

    match layers.last_mut() {
        Some(last) => last.amount += leftover,
        None if leftover > 0 || !live.is_empty() => layers.push(PotLayer {
            amount: leftover,
            eligible: live,
        }),
        None => {}
    }
    layers
}

/// Chips the top live contributor put in that nobody else matched.
pub fn uncalled_excess(contributions: &[Contribution]) -> Option<(u8, i64)> {
    let top = contributions
        .iter()
        .filter(|c| !c.folded)
        .max_by_key(|c| c.amount)?;
    let second = contributions
        .iter()
        .filter(|c| c.seat != top.seat)
        .map(|c| c.amount)
        .max()
        .unwrap_or(0);
    let excess = top.amount - second;
    (excess > 0).then_some((top.seat, excess))
}

/// Split every layer among its winners.
///
/// `winners_of` returns the best-ranked seats within an eligible set. An uneven
/// split gives the whole remainder to the winner nearest the button going
/// clockwise.
pub fn award_pots<F>(layers: &[PotLayer], dealer_seat: u8, mut winners_of: F) -> BTreeMap<u8, i64>
where
    F: FnMut(&BTreeSet<u8>) -> Vec<u8>,
{
    let mut awards: BTreeMap<u8, i64> = BTreeMap::new();
    for layer in layers {
        if layer.amount == 0 || layer.eligible.is_empty() {
            continue;
        }
        let winners: Vec<u8> = winners_of(&layer.eligible)
            .into_iter()
            .filter(|s| layer.eligible.contains(s))
            .collect();
        let Some(first_left) = clockwise_from(winners.iter().copied(), dealer_seat)
            .first()
            .copied()
        else {
            continue;
        };

        let share = layer.amount / winners.len() as i64;
        let remainder = layer.amount % winners.len() as i64;
        for seat in &winners {
            *awards.entry(*seat).or_default() += share;
        }
        if remainder > 0 {
            *awards.entry(first_left).or_default() += remainder;
        }
    }
    awards
}
