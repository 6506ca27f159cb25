//! Table fixtures: in-memory state, quiet seating and rigged decks.

use std::sync::Arc;

use holdem_backend::config::db::DbProfile;
use holdem_backend::config::engine::EngineConfig;
use holdem_backend::db::txn::with_txn;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::cards::{full_deck, parse_cards, Card};
use holdem_backend::error::AppError;
use holdem_backend::errors::ErrorCode;
use holdem_backend::infra::state::build_state;
use holdem_backend::repos::hands::{self, Hand};
use holdem_backend::repos::seats::{self, Seat};
use holdem_backend::repos::tables::{self, PokerTable};
use holdem_backend::services::hand_flow::{ActionOutcome, HandFlowService, SubmitAction};
use holdem_backend::services::notifications::InMemorySink;
use holdem_backend::services::tables::{CreateTable, TableService};
use holdem_backend::state::app_state::AppState;
use time::OffsetDateTime;

pub struct TestTable {
    pub state: AppState,
    pub sink: Arc<InMemorySink>,
    pub table_id: i64,
}

/// Current time truncated to whole seconds, so stored timestamps compare exactly.
pub fn clock() -> OffsetDateTime {
    OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .expect("zero nanoseconds is in range")
}

/// Player id for a seat; tests seat player `100 + i` at seat `i`.
pub fn player(seat_index: u8) -> i64 {
    100 + i64::from(seat_index)
}

pub fn config(seats: u8, small_blind: i64, big_blind: i64) -> CreateTable {
    CreateTable {
        name: "test table".to_string(),
        seat_capacity: seats,
        small_blind,
        big_blind,
        ante: 0,
        turn_timeout_secs: None,
        rng_seed: Some(42),
    }
}

pub async fn test_state(engine: EngineConfig) -> Result<(AppState, Arc<InMemorySink>), AppError> {
    let sink = Arc::new(InMemorySink::new());
    let state = build_state()
        .with_db(DbProfile::InMemory)
        .with_engine(engine)
        .with_sink(sink.clone())
        .build()
        .await?;
    Ok((state, sink))
}

/// Create a table and seat one player per stack, without starting a hand.
pub async fn setup_table(
    engine: EngineConfig,
    cfg: CreateTable,
    stacks: &[i64],
) -> Result<TestTable, AppError> {
    let (state, sink) = test_state(engine).await?;
    let table = TableService.create_table(&state, cfg).await?;
    for (i, stack) in stacks.iter().enumerate() {
        seat_quietly(&state, table.id, i as u8, *stack).await?;
    }
    Ok(TestTable {
        state,
        sink,
        table_id: table.id,
    })
}

/// Seat a player straight through the repository, so no advance runs.
pub async fn seat_quietly(
    state: &AppState,
    table_id: i64,
    seat_index: u8,
    stack: i64,
) -> Result<Seat, AppError> {
    with_txn(state, move |txn| {
        Box::pin(async move {
            Ok(seats::create_seat(txn, table_id, seat_index, player(seat_index), stack).await?)
        })
    })
    .await
}

/// `prefix` first, then every other card in standard order.
pub fn rigged_deck(prefix: &str) -> Vec<Card> {
    let mut deck = parse_cards(prefix).expect("valid rigged prefix");
    let rest: Vec<Card> = full_deck()
        .into_iter()
        .filter(|c| !deck.contains(c))
        .collect();
    deck.extend(rest);
    deck
}

/// Create the next hand, swap in `deck`, and deal it.
pub async fn start_rigged_hand(
    state: &AppState,
    table_id: i64,
    deck: Vec<Card>,
    now: OffsetDateTime,
) -> Result<Hand, AppError> {
    with_txn(state, move |txn| {
        Box::pin(async move {
            let mut hand = HandFlowService.create_hand(txn, table_id, now).await?;
            hand.deck = deck;
            hands::write_hand(txn, &hand).await?;
            HandFlowService.deal_hand(txn, table_id, now).await
        })
    })
    .await
}

pub async fn live_hand(state: &AppState, table_id: i64) -> Result<Hand, AppError> {
    hands::find_live_for_table(state.db(), table_id)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::HandNotFound, "no live hand"))
}

pub async fn table(state: &AppState, table_id: i64) -> Result<PokerTable, AppError> {
    Ok(tables::require_table(state.db(), table_id).await?)
}

pub async fn seats_of(state: &AppState, table_id: i64) -> Result<Vec<Seat>, AppError> {
    Ok(seats::find_all_by_table(state.db(), table_id).await?)
}

pub fn stacks(seats: &[Seat]) -> Vec<i64> {
    seats.iter().map(|s| s.stack).collect()
}

/// Chips on the table: every stack plus the live pot.
pub async fn chips_in_play(state: &AppState, table_id: i64) -> Result<i64, AppError> {
    let stacks: i64 = seats_of(state, table_id).await?.iter().map(|s| s.stack).sum();
    let pot = hands::find_live_for_table(state.db(), table_id)
        .await?
        .map_or(0, |h| h.pot);
    Ok(stacks + pot)
}

pub async fn act(
    state: &AppState,
    table_id: i64,
    seat_index: u8,
    action: ActionKind,
    amount: Option<i64>,
    now: OffsetDateTime,
) -> Result<ActionOutcome, AppError> {
    HandFlowService
        .submit_action_at(
            state,
            SubmitAction {
                table_id,
                player_id: player(seat_index),
                action,
                amount,
                expected_version: None,
            },
            now,
        )
        .await
}
