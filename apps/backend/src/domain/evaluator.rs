//! Seven-card hand ranking behind the `HandEvaluator` capability.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cards::{Card, Rank};
use crate::errors::domain::DomainError;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RankCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl RankCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RankCategory::HighCard => "high_card",
            RankCategory::OnePair => "one_pair",
            RankCategory::TwoPair => "two_pair",
            RankCategory::ThreeOfAKind => "three_of_a_kind",
            RankCategory::Straight => "straight",
            RankCategory::Flush => "flush",
            RankCategory::FullHouse => "full_house",
            RankCategory::FourOfAKind => "four_of_a_kind",
            RankCategory::StraightFlush => "straight_flush",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankCategory::HighCard => "High Card",
            RankCategory::OnePair => "Pair",
            RankCategory::TwoPair => "Two Pair",
            RankCategory::ThreeOfAKind => "Three of a Kind",
            RankCategory::Straight => "Straight",
            RankCategory::Flush => "Flush",
            RankCategory::FullHouse => "Full House",
            RankCategory::FourOfAKind => "Four of a Kind",
            RankCategory::StraightFlush => "Straight Flush",
        }
    }
}

impl fmt::Display for RankCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "high_card" => RankCategory::HighCard,
            "one_pair" => RankCategory::OnePair,
            "two_pair" => RankCategory::TwoPair,
            "three_of_a_kind" => RankCategory::ThreeOfAKind,
            "straight" => RankCategory::Straight,
            "flush" => RankCategory::Flush,
            "full_house" => RankCategory::FullHouse,
            "four_of_a_kind" => RankCategory::FourOfAKind,
            "straight_flush" => RankCategory::StraightFlush,
            other => {
                return Err(DomainError::data_corruption(format!(
                    "unknown rank category '{other}'"
                )))
            }
        })
    }
}

/// Comparable strength: category first, then tiebreak ranks high to low.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HandStrength {
    pub category: RankCategory,
    pub kickers: [u8; 5],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolvedHand {
    pub category: RankCategory,
    pub description: String,
    pub best_five: Vec<Card>,
    #[serde(skip)]
    pub strength: HandStrength,
}

/// Ranking capability consumed by showdown. Implementations must be pure.
pub trait HandEvaluator: Send + Sync {
    fn solve(&self, cards: &[Card; 7]) -> SolvedHand;

    /// Indices of the maximal-strength subset of `hands`.
    fn winners(&self, hands: &[SolvedHand]) -> Vec<usize> {
        let Some(best) = hands.iter().map(|h| h.strength).max() else {
            return Vec::new();
        };
        hands
            .iter()
            .enumerate()
            .filter(|(_, h)| h.strength == best)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Exhaustive best-of-21 evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEvaluator;

impl HandEvaluator for StandardEvaluator {
    fn solve(&self, cards: &[Card; 7]) -> SolvedHand {
        let mut best: Option<([Card; 5], HandStrength)> = None;
        for skip_a in 0..7 {
            for skip_b in (skip_a + 1)..7 {
                let mut five = [cards[0]; 5];
                let mut n = 0;
                for (i, card) in cards.iter().enumerate() {
                    if i != skip_a && i != skip_b {
                        five[n] = *card;
                        n += 1;
                    }
                }
                let strength = evaluate_five(&five);
                if best.as_ref().is_none_or(|(_, s)| strength > *s) {
                    best = Some((five, strength));
                }
            }
        }

        // 21 subsets always produce a candidate.
        let (five, strength) = best.unwrap_or_else(|| {
            let five = [cards[0], cards[1], cards[2], cards[3], cards[4]];
            (five, evaluate_five(&five))
        });
        SolvedHand {
            category: strength.category,
            description: describe(&strength),
            best_five: order_best_five(&five, &strength),
            strength,
        }
    }
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    a.cmp(b)
}

fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let mut counts = [0u8; 15];
    for c in cards {
        counts[c.rank.value() as usize] += 1;
    }
    let flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = straight_high(&counts);

    // Ranks grouped by multiplicity, larger groups first, then higher rank.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|r| counts[*r as usize] > 0)
        .map(|r| (counts[r as usize], r))
        .collect();
    groups.sort_by(|a, b| b.cmp(a));
    let mut kickers = [0u8; 5];
    for (slot, (_, rank)) in kickers.iter_mut().zip(groups.iter()) {
        *slot = *rank;
    }

    let category = match (flush, straight_high, groups[0].0, groups.get(1).map(|g| g.0)) {
        (true, Some(_), _, _) => RankCategory::StraightFlush,
        (_, _, 4, _) => RankCategory::FourOfAKind,
        (_, _, 3, Some(2)) => RankCategory::FullHouse,
        (true, None, _, _) => RankCategory::Flush,
        (false, Some(_), _, _) => RankCategory::Straight,
        (_, _, 3, _) => RankCategory::ThreeOfAKind,
        (_, _, 2, Some(2)) => RankCategory::TwoPair,
        (_, _, 2, _) => RankCategory::OnePair,
        _ => RankCategory::HighCard,
    };

    if let Some(high) = straight_high {
        if matches!(
            category,
            RankCategory::Straight | RankCategory::StraightFlush
        ) {
            kickers = [high, 0, 0, 0, 0];
        }
    }

    HandStrength { category, kickers }
}

/// High card of a five-rank run; the wheel (A-2-3-4-5) plays as five-high.
fn straight_high(counts: &[u8; 15]) -> Option<u8> {
    let distinct = (2..=14).filter(|r| counts[*r as usize] > 0).count();
    if distinct != 5 {
        return None;
    }
    for high in (6..=14u8).rev() {
        if (high - 4..=high).all(|r| counts[r as usize] == 1) {
            return Some(high);
        }
    }
    let wheel = [14u8, 2, 3, 4, 5];
    wheel
        .iter()
        .all(|r| counts[*r as usize] == 1)
        .then_some(5)
}

fn rank_name(value: u8) -> &'static str {
    Rank::from_value(value).map(Rank::name).unwrap_or("?")
}

fn rank_plural(value: u8) -> &'static str {
    Rank::from_value(value).map(Rank::plural).unwrap_or("?")
}

fn describe(strength: &HandStrength) -> String {
    let k = strength.kickers;
    match strength.category {
        RankCategory::HighCard => format!("{} High", rank_name(k[0])),
        RankCategory::OnePair => format!("Pair, {}", rank_plural(k[0])),
        RankCategory::TwoPair => {
            format!("Two Pair, {} & {}", rank_plural(k[0]), rank_plural(k[1]))
        }
        RankCategory::ThreeOfAKind => format!("Three of a Kind, {}", rank_plural(k[0])),
        RankCategory::Straight => format!("Straight, {} High", rank_name(k[0])),
        RankCategory::Flush => format!("Flush, {} High", rank_name(k[0])),
        RankCategory::FullHouse => format!(
            "Full House, {} over {}",
            rank_plural(k[0]),
            rank_plural(k[1])
        ),
        RankCategory::FourOfAKind => format!("Four of a Kind, {}", rank_plural(k[0])),
        RankCategory::StraightFlush if k[0] == 14 => "Royal Flush".to_string(),
        RankCategory::StraightFlush => format!("Straight Flush, {} High", rank_name(k[0])),
    }
}

/// Best five in display order: made cards first, then kickers; straights high to low.
fn order_best_five(five: &[Card; 5], strength: &HandStrength) -> Vec<Card> {
    let mut cards = five.to_vec();
    match strength.category {
        RankCategory::Straight | RankCategory::StraightFlush if strength.kickers[0] == 5 => {
            // Ace plays low in the wheel.
            cards.sort_by_key(|c| {
                std::cmp::Reverse(if c.rank == Rank::Ace { 1 } else { c.rank.value() })
            });
        }
        _ => {
            let position = |c: &Card| {
                strength
                    .kickers
                    .iter()
                    .position(|k| *k == c.rank.value())
                    .unwrap_or(usize::MAX)
            };
            cards.sort_by(|a, b| position(a).cmp(&position(b)).then(b.cmp(a)));
        }
    }
    cards
}
