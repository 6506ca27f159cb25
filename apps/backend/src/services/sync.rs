//! Event emission and the reconnect/sync protocol.
//!
//! Every table mutation goes through [`emit`], which bumps the table version with a
//! version-checked update and appends one event at that version. The per-table event
//! log is therefore gapless, and a client holding version `v` can catch up by
//! replaying events `v+1..=current` or fall back to a snapshot.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::domain::betting::{legal_actions, BettingInput, LegalActions};
use crate::domain::cards::Card;
use crate::domain::hand_phase::HandPhase;
use crate::domain::player_status::PlayerStatus;
use crate::domain::pots::PotLayer;
use crate::entities::poker_tables::TableStatus;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::repos::events::{self, EventRecord};
use crate::repos::hands::{self, Hand};
use crate::repos::pots;
use crate::repos::seats::{self, Seat};
use crate::repos::showdown::{self, ShowdownRecord};
use crate::repos::tables::{self, PokerTable, TableUpdate};
use crate::state::app_state::AppState;

pub const TABLE_ENTITY: &str = "table";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub id: i64,
    pub name: String,
    pub seat_capacity: u8,
    pub small_blind: i64,
    pub big_blind: i64,
    pub ante: i64,
    pub dealer_seat: Option<u8>,
    pub turn_timeout_secs: Option<i32>,
    pub status: TableStatus,
    pub winner_seat: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatSnapshot {
    pub seat_index: u8,
    pub player_id: i64,
    pub stack: i64,
    pub status: PlayerStatus,
    pub current_bet: i64,
    pub total_contributed: i64,
    pub dealt_in: bool,
    /// Present only when this viewer may see the cards.
    pub hole_cards: Option<Vec<Card>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandSnapshot {
    pub id: i64,
    pub hand_no: i32,
    pub phase: HandPhase,
    pub dealer_seat: u8,
    pub small_blind_seat: u8,
    pub big_blind_seat: u8,
    pub current_actor: Option<u8>,
    pub current_bet: i64,
    pub min_raise_increment: i64,
    pub pot: i64,
    pub community: Vec<Card>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub action_deadline: Option<time::OffsetDateTime>,
    pub showdown: Vec<ShowdownRecord>,
}

/// What only the viewing player may know.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrivateView {
    pub seat_index: u8,
    pub hole_cards: Option<Vec<Card>>,
    pub legal_actions: LegalActions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub table: TableView,
    pub seats: Vec<SeatSnapshot>,
    pub current_hand: Option<HandSnapshot>,
    pub pots: Vec<PotLayer>,
    pub viewer: Option<PrivateView>,
    pub version: i32,
    pub last_event_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncResponse {
    UpToDate {
        version: i32,
        last_event_id: Option<i64>,
    },
    Incremental {
        events: Vec<EventRecord>,
        version: i32,
        last_event_id: Option<i64>,
        viewer: Option<PrivateView>,
    },
    Snapshot(TableSnapshot),
}

impl From<&PokerTable> for TableView {
    fn from(table: &PokerTable) -> Self {
        Self {
            id: table.id,
            name: table.name.clone(),
            seat_capacity: table.seat_capacity,
            small_blind: table.small_blind,
            big_blind: table.big_blind,
            ante: table.ante,
            dealer_seat: table.dealer_seat,
            turn_timeout_secs: table.turn_timeout_secs,
            status: table.status,
            winner_seat: table.winner_seat,
        }
    }
}

/// Hole cards are visible to their owner, and to everyone at showdown for seats
/// still contesting the pot.
fn hole_cards_visible(seat: &Seat, hand: Option<&Hand>, viewer: Option<i64>) -> bool {
    if viewer == Some(seat.player_id) {
        return true;
    }
    matches!(hand, Some(h) if h.phase == HandPhase::Showdown && seat.status.is_in_hand())
}

fn private_view(
    table: &PokerTable,
    hand: Option<&Hand>,
    seats: &[Seat],
    viewer: Option<i64>,
) -> Option<PrivateView> {
    let seat = seats.iter().find(|s| Some(s.player_id) == viewer)?;
    let legal_actions = match hand {
        Some(h) if h.phase.is_betting_street() && h.current_actor == Some(seat.seat_index) => {
            legal_actions(&BettingInput {
                status: seat.status,
                current_bet: h.current_bet,
                player_bet: seat.current_bet,
                stack: seat.stack,
                min_raise_increment: h.min_raise_increment,
                big_blind: table.big_blind,
            })
        }
        _ => LegalActions::default(),
    };
    Some(PrivateView {
        seat_index: seat.seat_index,
        hole_cards: seat.hole_cards.map(|c| c.to_vec()),
        legal_actions,
    })
}

/// Build the table state as seen by `viewer` (`None` = public observer).
pub async fn build_snapshot<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &PokerTable,
    viewer: Option<i64>,
) -> Result<TableSnapshot, DomainError> {
    let all_seats = seats::find_all_by_table(conn, table.id).await?;
    let hand = hands::find_live_for_table(conn, table.id).await?;

    let (current_hand, pot_layers) = match &hand {
        Some(h) => {
            let results = showdown::find_all_by_hand(conn, h.id).await?;
            let layers = pots::find_all_by_hand(conn, h.id).await?;
            let snapshot = HandSnapshot {
                id: h.id,
                hand_no: h.hand_no,
                phase: h.phase,
                dealer_seat: h.dealer_seat,
                small_blind_seat: h.small_blind_seat,
                big_blind_seat: h.big_blind_seat,
                current_actor: h.current_actor,
                current_bet: h.current_bet,
                min_raise_increment: h.min_raise_increment,
                pot: h.pot,
                community: h.community.clone(),
                action_deadline: h.action_deadline,
                showdown: results,
            };
            (Some(snapshot), layers)
        }
        None => (None, Vec::new()),
    };

    let seat_snapshots = all_seats
        .iter()
        .map(|s| SeatSnapshot {
            seat_index: s.seat_index,
            player_id: s.player_id,
            stack: s.stack,
            status: s.status,
            current_bet: s.current_bet,
            total_contributed: s.total_contributed,
            dealt_in: s.is_dealt_in(),
            hole_cards: s
                .hole_cards
                .filter(|_| hole_cards_visible(s, hand.as_ref(), viewer))
                .map(|c| c.to_vec()),
        })
        .collect();

    Ok(TableSnapshot {
        table: TableView::from(table),
        seats: seat_snapshots,
        current_hand,
        pots: pot_layers,
        viewer: private_view(table, hand.as_ref(), &all_seats, viewer),
        version: table.version,
        last_event_id: None,
    })
}

/// Bump the table version with `update` and record one event at the new version.
///
/// The payload carries the event data plus the public table state after the change,
/// so replaying the last event reproduces what a fresh snapshot shows.
pub async fn emit<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &mut PokerTable,
    update: TableUpdate,
    event_type: &str,
    data: Value,
) -> Result<EventRecord, DomainError> {
    let updated = tables::update_table(conn, update).await?;
    let state = build_snapshot(conn, &updated, None).await?;
    let payload = json!({
        "data": data,
        "state": serde_json::to_value(&state)
            .map_err(|e| DomainError::data_corruption(format!("snapshot encode: {e}")))?,
    });
    let event = events::append(
        conn,
        TABLE_ENTITY,
        updated.id,
        event_type,
        payload,
        updated.version,
    )
    .await?;
    debug!(
        table_id = updated.id,
        version = updated.version,
        event_type,
        "event emitted"
    );
    *table = updated;
    Ok(event)
}

/// Events with versions `after+1..=current`, or `None` when the log cannot bridge
/// the gap within `limit` events.
fn contiguous(events: Vec<EventRecord>, after: i32, current: i32) -> Option<Vec<EventRecord>> {
    let consecutive = events
        .iter()
        .enumerate()
        .all(|(i, e)| i64::from(e.entity_version) == i64::from(after) + 1 + i as i64);
    let reaches_current = events.last().map(|e| e.entity_version) == Some(current);
    (consecutive && reaches_current).then_some(events)
}

async fn snapshot_response<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    table: &PokerTable,
    viewer: Option<i64>,
    last_event_id: Option<i64>,
) -> Result<SyncResponse, AppError> {
    let mut snap = build_snapshot(conn, table, viewer).await?;
    snap.last_event_id = last_event_id;
    Ok(SyncResponse::Snapshot(snap))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncService;

impl SyncService {
    /// Answer a polling client.
    ///
    /// `UpToDate` when the client already holds the current version, `Incremental`
    /// when a gapless run of at most `sync_event_limit` events bridges the gap, and
    /// a full snapshot otherwise (first connect, stale client, unknown version).
    pub async fn poll(
        &self,
        state: &AppState,
        table_id: i64,
        viewer: Option<i64>,
        client_version: Option<i32>,
        client_last_event_id: Option<i64>,
    ) -> Result<SyncResponse, AppError> {
        let conn = state.db();
        let table = tables::require_table(conn, table_id).await?;
        let latest = events::latest_for_entity(conn, TABLE_ENTITY, table_id).await?;
        let last_event_id = latest.as_ref().map(|e| e.id);

        let Some(client_version) = client_version else {
            return snapshot_response(conn, &table, viewer, last_event_id).await;
        };

        if client_version == table.version {
            let consistent = match (client_last_event_id, last_event_id) {
                (Some(client), Some(server)) => client == server,
                _ => true,
            };
            if consistent {
                return Ok(SyncResponse::UpToDate {
                    version: table.version,
                    last_event_id,
                });
            }
            return snapshot_response(conn, &table, viewer, last_event_id).await;
        }

        if client_version > table.version {
            return snapshot_response(conn, &table, viewer, last_event_id).await;
        }

        let gap = u64::try_from(table.version - client_version).unwrap_or(u64::MAX);
        if gap > state.engine.sync_event_limit {
            return snapshot_response(conn, &table, viewer, last_event_id).await;
        }

        let events = events::find_after_version(
            conn,
            TABLE_ENTITY,
            table_id,
            client_version,
            state.engine.sync_event_limit,
        )
        .await?;
        match contiguous(events, client_version, table.version) {
            Some(events) => {
                let all_seats = seats::find_all_by_table(conn, table_id).await?;
                let hand = hands::find_live_for_table(conn, table_id).await?;
                Ok(SyncResponse::Incremental {
                    events,
                    version: table.version,
                    last_event_id,
                    viewer: private_view(&table, hand.as_ref(), &all_seats, viewer),
                })
            }
            None => snapshot_response(conn, &table, viewer, last_event_id).await,
        }
    }
}
