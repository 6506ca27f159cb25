//! Showdown result rows, one per winning seat.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use super::seat_from_db;
use crate::adapters::showdown_sea as showdown_adapter;
use crate::domain::cards::Card;
use crate::domain::cards_serde::{decode_cards, encode_cards};
use crate::domain::evaluator::{RankCategory, SolvedHand};
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowdownRecord {
    pub hand_id: i64,
    pub seat_index: u8,
    pub rank_category: RankCategory,
    pub description: String,
    pub best_five: Vec<Card>,
    pub amount_won: i64,
}

pub async fn insert_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
    seat_index: u8,
    solved: &SolvedHand,
    amount_won: i64,
) -> Result<ShowdownRecord, DomainError> {
    let dto = showdown_adapter::ShowdownResultCreate {
        hand_id,
        seat_index,
        rank_category: solved.category.as_str().to_string(),
        description: solved.description.clone(),
        best_five: encode_cards(&solved.best_five),
        amount_won,
    };
    let row = showdown_adapter::insert(conn, dto).await?;
    Ok(ShowdownRecord {
        hand_id: row.hand_id,
        seat_index: seat_from_db(row.seat_index)?,
        rank_category: solved.category,
        description: row.description,
        best_five: solved.best_five.clone(),
        amount_won: row.amount_won,
    })
}

pub async fn find_all_by_hand<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    hand_id: i64,
) -> Result<Vec<ShowdownRecord>, DomainError> {
    showdown_adapter::find_all_by_hand(conn, hand_id)
        .await?
        .into_iter()
        .map(|row| {
            Ok(ShowdownRecord {
                hand_id: row.hand_id,
                seat_index: seat_from_db(row.seat_index)?,
                rank_category: row.rank_category.parse()?,
                description: row.description,
                best_five: decode_cards(&row.best_five)?,
                amount_won: row.amount_won,
            })
        })
        .collect()
}
