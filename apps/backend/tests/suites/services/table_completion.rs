use std::time::Duration;

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::hand_phase::HandPhase;
use holdem_backend::domain::player_status::PlayerStatus;
use holdem_backend::error::AppError;
use holdem_backend::repos::hands;
use holdem_backend::services::hand_flow::HandFlowService;
use holdem_backend::services::tables::{SeatPlayer, TableService};

use crate::support::tables::{
    act, clock, config, player, rigged_deck, seats_of, setup_table, stacks, start_rigged_hand,
    table,
};

// Seat 0 (button) is dealt Ah Ad against 7c 2d.
const DECK: &str = "7c Ah 2d Ad 3s Kh 9s 4c 5s Jd 6s Qc";

#[tokio::test]
async fn last_player_standing_wins_the_table() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(2, 10, 20), &[1000, 100]).await?;
    let now = clock();
    start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), now).await?;

    act(&t.state, t.table_id, 0, ActionKind::Call, None, now).await?;
    act(&t.state, t.table_id, 1, ActionKind::AllIn, None, now).await?;
    let out = act(&t.state, t.table_id, 0, ActionKind::Call, None, now).await?;
    assert!(out.hand_complete);
    assert_eq!(out.hand.phase, HandPhase::Complete);

    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(stacks(&seats), vec![1100, 0]);
    assert_eq!(seats[1].status, PlayerStatus::Eliminated);

    let done = table(&t.state, t.table_id).await?;
    assert!(done.is_complete());
    assert_eq!(done.winner_seat, Some(0));
    let types = t.sink.event_types(&format!("table:{}", t.table_id)).await;
    assert_eq!(types.last().map(String::as_str), Some("table_completed"));

    // Nothing left to deal, and the table stays closed.
    let report = HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    assert!(!report.changed());
    assert!(hands::find_live_for_table(t.state.db(), t.table_id).await?.is_none());

    let sweep = HandFlowService.sweep_at(&t.state, now).await?;
    assert!(sweep.tables.iter().all(|s| s.table_id != t.table_id));

    let err = TableService
        .seat_player(
            &t.state,
            t.table_id,
            SeatPlayer {
                player_id: 900,
                seat_index: 1,
                buy_in: 500,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "TABLE_COMPLETE");
    Ok(())
}

#[tokio::test]
async fn surviving_short_stack_keeps_the_table_open() -> Result<(), AppError> {
    // Same hand with the cards swapped: the short stack doubles up.
    let deck = "Ah 7c Ad 2d 3s Kh 9s 4c 5s Jd 6s Qc";
    let t = setup_table(EngineConfig::immediate(), config(2, 10, 20), &[1000, 100]).await?;
    let now = clock();
    start_rigged_hand(&t.state, t.table_id, rigged_deck(deck), now).await?;

    act(&t.state, t.table_id, 0, ActionKind::Call, None, now).await?;
    act(&t.state, t.table_id, 1, ActionKind::AllIn, None, now).await?;
    act(&t.state, t.table_id, 0, ActionKind::Call, None, now).await?;

    let open = table(&t.state, t.table_id).await?;
    assert!(!open.is_complete());
    assert_eq!(open.winner_seat, None);
    let next = hands::find_live_for_table(t.state.db(), t.table_id)
        .await?
        .expect("the next hand is dealt");
    assert_eq!(next.hand_no, 2);
    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(stacks(&seats).iter().sum::<i64>() + next.pot, 1100);
    Ok(())
}

#[tokio::test]
async fn sitting_out_stack_keeps_the_table_open() -> Result<(), AppError> {
    let engine = EngineConfig::immediate().with_inter_hand_delay(Duration::from_secs(60));
    let t = setup_table(engine, config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = clock();
    HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    act(&t.state, t.table_id, 0, ActionKind::Fold, None, now).await?;
    let out = act(&t.state, t.table_id, 1, ActionKind::Fold, None, now).await?;
    assert!(out.hand_complete);

    TableService.sit_out(&t.state, t.table_id, player(1)).await?;
    TableService.sit_out(&t.state, t.table_id, player(2)).await?;

    // One seat can play, but two more still hold chips: no hand and no winner.
    let later = now + time::Duration::seconds(61);
    let report = HandFlowService.advance_at(&t.state, t.table_id, later).await?;
    assert!(!report.changed());
    let open = table(&t.state, t.table_id).await?;
    assert!(!open.is_complete());
    assert_eq!(open.winner_seat, None);
    assert!(hands::find_live_for_table(t.state.db(), t.table_id).await?.is_none());

    TableService.sit_in(&t.state, t.table_id, player(1)).await?;
    HandFlowService.advance_at(&t.state, t.table_id, later).await?;
    let next = hands::find_live_for_table(t.state.db(), t.table_id)
        .await?
        .expect("sitting back in deals the next hand");
    assert_eq!(next.hand_no, 2);
    Ok(())
}
