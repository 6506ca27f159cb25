//! Paced all-in run-out: one street per tick, a display hold, then the next hand.

use std::time::Duration as StdDuration;

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::hand_phase::HandPhase;
use holdem_backend::error::AppError;
use holdem_backend::repos::{hands, showdown};
use holdem_backend::services::hand_flow::HandFlowService;
use time::Duration;

use crate::support::tables::{
    act, clock, config, live_hand, rigged_deck, seats_of, setup_table, stacks, start_rigged_hand,
};

// Seat 1 is dealt Ah Ad, seat 0 7c 2d. Burns: 3s, 5s, 6s.
const DECK: &str = "Ah 7c Ad 2d 3s Kh 9s 4c 5s Jd 6s Qc";

fn paced() -> EngineConfig {
    EngineConfig::immediate()
        .with_runout_street_delay(StdDuration::from_millis(1500))
        .with_showdown_display(StdDuration::from_secs(5))
        .with_inter_hand_delay(StdDuration::from_secs(60))
}

#[tokio::test]
async fn all_in_board_is_dealt_one_street_per_tick() -> Result<(), AppError> {
    let t = setup_table(paced(), config(2, 10, 20), &[1000, 500]).await?;
    let t0 = clock();
    let at = |ms: i64| t0 + Duration::milliseconds(ms);
    start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), t0).await?;

    act(&t.state, t.table_id, 0, ActionKind::Call, None, t0).await?;
    act(&t.state, t.table_id, 1, ActionKind::AllIn, None, t0).await?;
    let out = act(&t.state, t.table_id, 0, ActionKind::Call, None, t0).await?;
    assert_eq!(out.hand.phase, HandPhase::Showdown);
    assert!(out.hand.community.is_empty(), "the first street waits one delay");
    assert_eq!(out.hand.pot, 1000);

    let report = HandFlowService.advance_at(&t.state, t.table_id, at(1000)).await?;
    assert!(!report.changed());
    assert_eq!(report.wake_after_ms, Some(500));

    let mut boards = Vec::new();
    for ms in [1500, 3000, 4500] {
        let report = HandFlowService.advance_at(&t.state, t.table_id, at(ms)).await?;
        assert_eq!(report.steps, vec!["heal_actor"]);
        assert_eq!(report.wake_after_ms, Some(1500));
        boards.push(live_hand(&t.state, t.table_id).await?.community.len());
    }
    assert_eq!(boards, vec![3, 4, 5]);

    // Full board, one more delay, then evaluation.
    let report = HandFlowService.advance_at(&t.state, t.table_id, at(6000)).await?;
    assert_eq!(report.steps, vec!["heal_actor"]);
    assert_eq!(report.wake_after_ms, Some(5000));
    let hand = live_hand(&t.state, t.table_id).await?;
    assert_eq!(hand.phase, HandPhase::Showdown);
    assert_eq!(hand.showdown_started_at, Some(at(6000)));
    assert_eq!(stacks(&seats_of(&t.state, t.table_id).await?), vec![500, 1000]);
    let records = showdown::find_all_by_hand(t.state.db(), hand.id).await?;
    assert!(records.iter().any(|r| r.seat_index == 1 && r.amount_won == 1000));

    let report = HandFlowService.advance_at(&t.state, t.table_id, at(8000)).await?;
    assert!(!report.changed(), "the result stays on display");
    assert_eq!(report.wake_after_ms, Some(3000));

    let report = HandFlowService.advance_at(&t.state, t.table_id, at(11_000)).await?;
    assert_eq!(report.steps, vec!["complete_stale_showdown"]);
    assert_eq!(report.wake_after_ms, Some(60_000));
    let done = hands::find_latest_for_table(t.state.db(), t.table_id)
        .await?
        .expect("hand exists");
    assert_eq!(done.id, hand.id);
    assert_eq!(done.phase, HandPhase::Complete);
    assert!(hands::find_live_for_table(t.state.db(), t.table_id).await?.is_none());

    let report = HandFlowService.advance_at(&t.state, t.table_id, at(71_000)).await?;
    assert!(report.steps.contains(&"start_or_finish_table"));
    assert_eq!(live_hand(&t.state, t.table_id).await?.hand_no, 2);
    Ok(())
}

#[tokio::test]
async fn zero_delay_runs_out_and_resolves_at_once() -> Result<(), AppError> {
    let engine = paced().with_runout_street_delay(StdDuration::ZERO);
    let t = setup_table(engine, config(2, 10, 20), &[1000, 500]).await?;
    let t0 = clock();
    start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), t0).await?;

    act(&t.state, t.table_id, 0, ActionKind::Call, None, t0).await?;
    act(&t.state, t.table_id, 1, ActionKind::AllIn, None, t0).await?;
    act(&t.state, t.table_id, 0, ActionKind::Call, None, t0).await?;

    let hand = live_hand(&t.state, t.table_id).await?;
    assert_eq!(hand.community.len(), 5);
    assert_eq!(hand.showdown_started_at, Some(t0));
    assert_eq!(stacks(&seats_of(&t.state, t.table_id).await?), vec![500, 1000]);
    Ok(())
}
