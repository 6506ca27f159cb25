//! Table and seat management: create a table, seat a player, sit out and back in.

use sea_orm::ConnectionTrait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::db::txn::with_txn;
use crate::domain::player_status::PlayerStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::events::EventRecord;
use crate::repos::seats::{self, Seat};
use crate::repos::tables::{self, PokerTable, TableCreate};
use crate::repos::hands;
use crate::services::hand_flow::{publish, HandFlowService};
use crate::services::sync;
use crate::state::app_state::AppState;

pub const MIN_SEATS: u8 = 2;
pub const MAX_SEATS: u8 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTable {
    pub name: String,
    pub seat_capacity: u8,
    pub small_blind: i64,
    pub big_blind: i64,
    #[serde(default)]
    pub ante: i64,
    /// `None` means no turn clock.
    pub turn_timeout_secs: Option<i32>,
    /// Fixed seed for reproducible decks; random when absent.
    pub rng_seed: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeatPlayer {
    pub player_id: i64,
    pub seat_index: u8,
    pub buy_in: i64,
}

fn invalid_config(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidTableConfig, detail)
}

/// Reject stakes and sizes the engine cannot run.
pub fn validate_config(cmd: &CreateTable) -> Result<(), DomainError> {
    if cmd.name.trim().is_empty() {
        return Err(invalid_config("table name is empty"));
    }
    if !(MIN_SEATS..=MAX_SEATS).contains(&cmd.seat_capacity) {
        return Err(invalid_config(format!(
            "seat capacity {} outside {MIN_SEATS}..={MAX_SEATS}",
            cmd.seat_capacity
        )));
    }
    if cmd.small_blind <= 0 || cmd.big_blind <= 0 {
        return Err(invalid_config("blinds must be positive"));
    }
    if cmd.small_blind > cmd.big_blind {
        return Err(invalid_config(format!(
            "small blind {} exceeds big blind {}",
            cmd.small_blind, cmd.big_blind
        )));
    }
    if cmd.ante < 0 {
        return Err(invalid_config("ante cannot be negative"));
    }
    if cmd.turn_timeout_secs.is_some_and(|secs| secs <= 0) {
        return Err(invalid_config("turn timeout must be positive"));
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TableService;

impl TableService {
    pub async fn create_table(
        &self,
        state: &AppState,
        cmd: CreateTable,
    ) -> Result<PokerTable, AppError> {
        validate_config(&cmd)?;
        let (table, events) = with_txn(state, move |txn| {
            Box::pin(async move {
                let mut table = tables::create_table(
                    txn,
                    TableCreate {
                        name: cmd.name.trim().to_string(),
                        seat_capacity: cmd.seat_capacity,
                        small_blind: cmd.small_blind,
                        big_blind: cmd.big_blind,
                        ante: cmd.ante,
                        turn_timeout_secs: cmd.turn_timeout_secs,
                        rng_seed: cmd.rng_seed.unwrap_or_else(rand::random),
                    },
                )
                .await?;
                let update = table.touch();
                let data = json!({
                    "name": table.name,
                    "seat_capacity": table.seat_capacity,
                    "small_blind": table.small_blind,
                    "big_blind": table.big_blind,
                    "ante": table.ante,
                    "turn_timeout_secs": table.turn_timeout_secs,
                });
                let event = sync::emit(txn, &mut table, update, "table_created", data).await?;
                Ok((table, vec![event]))
            })
        })
        .await?;
        publish(state, table.id, &events).await;
        info!(table_id = table.id, name = %table.name, "table created");
        Ok(table)
    }

    /// Seat a player with a buy-in, then let the table start a hand if it can.
    pub async fn seat_player(
        &self,
        state: &AppState,
        table_id: i64,
        cmd: SeatPlayer,
    ) -> Result<Seat, AppError> {
        let (seat, events) = with_txn(state, move |txn| {
            Box::pin(async move {
                let mut table = tables::require_table(txn, table_id).await?;
                if table.is_complete() {
                    return Err(DomainError::conflict(
                        ConflictKind::TableComplete,
                        format!("table {table_id} is complete"),
                    )
                    .into());
                }
                if cmd.seat_index >= table.seat_capacity {
                    return Err(DomainError::validation(
                        ValidationKind::InvalidSeat,
                        format!(
                            "seat {} does not exist at a {}-seat table",
                            cmd.seat_index, table.seat_capacity
                        ),
                    )
                    .into());
                }
                if cmd.buy_in <= 0 {
                    return Err(DomainError::validation(
                        ValidationKind::InvalidAmount,
                        "buy-in must be positive",
                    )
                    .into());
                }
                let taken = seats::find_all_by_table(txn, table_id).await?;
                if taken.iter().any(|s| s.seat_index == cmd.seat_index) {
                    return Err(DomainError::conflict(
                        ConflictKind::SeatTaken,
                        format!("seat {} is taken", cmd.seat_index),
                    )
                    .into());
                }
                if taken.iter().any(|s| s.player_id == cmd.player_id) {
                    return Err(DomainError::conflict(
                        ConflictKind::PlayerAlreadySeated,
                        format!("player {} already has a seat", cmd.player_id),
                    )
                    .into());
                }

                let seat =
                    seats::create_seat(txn, table_id, cmd.seat_index, cmd.player_id, cmd.buy_in)
                        .await?;
                let update = table.touch();
                let data = json!({
                    "seat": seat.seat_index,
                    "player_id": seat.player_id,
                    "stack": seat.stack,
                });
                let event = sync::emit(txn, &mut table, update, "player_seated", data).await?;
                Ok((seat, vec![event]))
            })
        })
        .await?;
        publish(state, table_id, &events).await;
        info!(table_id, seat = seat.seat_index, player_id = seat.player_id, "player seated");
        self.advance_after(state, table_id).await;
        Ok(seat)
    }

    /// Skip future hands. Refused while the seat holds cards in the live hand.
    pub async fn sit_out(
        &self,
        state: &AppState,
        table_id: i64,
        player_id: i64,
    ) -> Result<Seat, AppError> {
        self.change_status(state, table_id, player_id, PlayerStatus::SittingOut)
            .await
    }

    pub async fn sit_in(
        &self,
        state: &AppState,
        table_id: i64,
        player_id: i64,
    ) -> Result<Seat, AppError> {
        self.change_status(state, table_id, player_id, PlayerStatus::Waiting)
            .await
    }

    async fn change_status(
        &self,
        state: &AppState,
        table_id: i64,
        player_id: i64,
        to: PlayerStatus,
    ) -> Result<Seat, AppError> {
        let (seat, events) = with_txn(state, move |txn| {
            Box::pin(async move { set_seat_status(txn, table_id, player_id, to).await })
        })
        .await?;
        publish(state, table_id, &events).await;
        self.advance_after(state, table_id).await;
        Ok(seat)
    }

    async fn advance_after(&self, state: &AppState, table_id: i64) {
        if let Err(err) = HandFlowService.advance(state, table_id).await {
            warn!(table_id, error = %err, "advance after seat change failed");
        }
    }
}

async fn set_seat_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table_id: i64,
    player_id: i64,
    to: PlayerStatus,
) -> Result<(Seat, Vec<EventRecord>), AppError> {
    let mut table = tables::require_table(conn, table_id).await?;
    let mut seat = seats::require_by_player(conn, table_id, player_id).await?;
    if seat.status == PlayerStatus::Eliminated {
        return Err(DomainError::validation(
            ValidationKind::InvalidSeat,
            format!("seat {} is eliminated", seat.seat_index),
        )
        .into());
    }
    let live = hands::find_live_for_table(conn, table_id).await?;
    if live.is_some() && seat.is_dealt_in() {
        return Err(DomainError::conflict(
            ConflictKind::HandInProgress,
            format!("seat {} is in the current hand", seat.seat_index),
        )
        .into());
    }
    if seat.status == to {
        return Ok((seat, Vec::new()));
    }

    let from = seat.status;
    seat.status = to;
    let seat = seats::write_seat(conn, &seat).await?;
    let update = table.touch();
    let data = json!({ "seat": seat.seat_index, "from": from, "to": to });
    let event = sync::emit(conn, &mut table, update, "seat_status_changed", data).await?;
    info!(table_id, seat = seat.seat_index, from = %from, to = %to, "seat status changed");
    Ok((seat, vec![event]))
}
