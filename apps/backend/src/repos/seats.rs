//! Seat repository functions for domain layer.

use sea_orm::ConnectionTrait;

use super::seat_from_db;
use crate::adapters::seats_sea as seats_adapter;
use crate::domain::cards::Card;
use crate::domain::cards_serde::{decode_cards, encode_cards};
use crate::domain::player_status::PlayerStatus;
use crate::domain::turn_order::SeatView;
use crate::entities::table_seats;
use crate::errors::domain::DomainError;

/// Seat domain model. `hole_cards` is `Some` only for seats dealt into the live hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Seat {
    pub id: i64,
    pub table_id: i64,
    pub seat_index: u8,
    pub player_id: i64,
    pub stack: i64,
    pub status: PlayerStatus,
    pub current_bet: i64,
    pub total_contributed: i64,
    pub hole_cards: Option<[Card; 2]>,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
    pub version: i32,
}

impl Seat {
    pub fn view(&self) -> SeatView {
        SeatView {
            seat: self.seat_index,
            status: self.status,
            stack: self.stack,
            bet: self.current_bet,
        }
    }

    pub fn is_dealt_in(&self) -> bool {
        self.hole_cards.is_some()
    }

    /// Can be dealt into the next hand.
    pub fn is_eligible(&self) -> bool {
        self.status.is_dealt_in() && self.stack > 0
    }

    /// Clear every per-hand field.
    pub fn reset_hand_state(&mut self) {
        self.current_bet = 0;
        self.total_contributed = 0;
        self.hole_cards = None;
    }
}

impl TryFrom<table_seats::Model> for Seat {
    type Error = DomainError;

    fn try_from(model: table_seats::Model) -> Result<Self, Self::Error> {
        let hole_cards = match model.hole_cards {
            None => None,
            Some(doc) => {
                let cards = decode_cards(&doc)?;
                let pair: [Card; 2] = cards.try_into().map_err(|cards: Vec<Card>| {
                    DomainError::data_corruption(format!(
                        "seat {} holds {} hole cards",
                        model.id,
                        cards.len()
                    ))
                })?;
                Some(pair)
            }
        };
        Ok(Self {
            id: model.id,
            table_id: model.table_id,
            seat_index: seat_from_db(model.seat_index)?,
            player_id: model.player_id,
            stack: model.stack,
            status: model.status.parse()?,
            current_bet: model.current_bet,
            total_contributed: model.total_contributed,
            hole_cards,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        })
    }
}

pub fn views(seats: &[Seat]) -> Vec<SeatView> {
    seats.iter().map(Seat::view).collect()
}

pub async fn find_all_by_table<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
) -> Result<Vec<Seat>, DomainError> {
    seats_adapter::find_all_by_table(conn, table_id)
        .await?
        .into_iter()
        .map(Seat::try_from)
        .collect()
}

pub async fn find_by_seat<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
    seat_index: u8,
) -> Result<Option<Seat>, DomainError> {
    seats_adapter::find_by_seat(conn, table_id, seat_index)
        .await?
        .map(Seat::try_from)
        .transpose()
}

pub async fn require_by_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
    player_id: i64,
) -> Result<Seat, DomainError> {
    Seat::try_from(seats_adapter::require_by_player(conn, table_id, player_id).await?)
}

pub async fn create_seat<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
    seat_index: u8,
    player_id: i64,
    stack: i64,
) -> Result<Seat, DomainError> {
    let dto = seats_adapter::SeatCreate {
        table_id,
        seat_index,
        player_id,
        stack,
        status: PlayerStatus::Waiting.as_str().to_string(),
    };
    Seat::try_from(seats_adapter::create_seat(conn, dto).await?)
}

/// Persist the per-hand columns, checked against `seat.version`.
pub async fn write_seat<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seat: &Seat,
) -> Result<Seat, DomainError> {
    let dto = seats_adapter::SeatWrite {
        id: seat.id,
        expected_version: seat.version,
        stack: seat.stack,
        status: seat.status.as_str().to_string(),
        current_bet: seat.current_bet,
        total_contributed: seat.total_contributed,
        hole_cards: seat.hole_cards.map(|cards| encode_cards(&cards)),
    };
    Seat::try_from(seats_adapter::write_seat(conn, dto).await?)
}
