//! `advance` converges: a settled table does not move on a second call.

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::hand_phase::HandPhase;
use holdem_backend::error::AppError;
use holdem_backend::repos::hands;
use holdem_backend::services::hand_flow::HandFlowService;

use crate::support::tables::{act, clock, config, live_hand, seats_of, setup_table, stacks, table};

#[tokio::test]
async fn first_advance_deals_second_is_a_no_op() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = clock();

    let first = HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    assert!(first.settled);
    assert_eq!(first.steps, vec!["start_or_finish_table", "heal_actor"]);
    assert!(first.events >= 2);

    let hand = live_hand(&t.state, t.table_id).await?;
    assert_eq!(hand.hand_no, 1);
    assert_eq!(hand.phase, HandPhase::Preflop);
    let version = table(&t.state, t.table_id).await?.version;

    let second = HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    assert!(!second.changed());
    assert!(second.settled);
    assert_eq!(second.events, 0);
    assert_eq!(table(&t.state, t.table_id).await?.version, version);
    assert_eq!(live_hand(&t.state, t.table_id).await?, hand);
    Ok(())
}

#[tokio::test]
async fn lone_player_never_gets_a_hand() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(6, 10, 20), &[1000]).await?;

    let report = HandFlowService.advance_at(&t.state, t.table_id, clock()).await?;
    assert!(!report.changed());
    assert!(hands::find_latest_for_table(t.state.db(), t.table_id)
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn folded_out_hand_rolls_into_the_next() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = clock();
    HandFlowService.advance_at(&t.state, t.table_id, now).await?;

    act(&t.state, t.table_id, 0, ActionKind::Fold, None, now).await?;
    let out = act(&t.state, t.table_id, 1, ActionKind::Fold, None, now).await?;
    assert!(out.hand_complete);
    assert_eq!(out.hand.phase, HandPhase::Complete);

    let seats = seats_of(&t.state, t.table_id).await?;
    let next = live_hand(&t.state, t.table_id).await?;
    assert_eq!(next.hand_no, 2);
    assert_eq!(next.dealer_seat, 1, "the button moves one seat");
    // Seat 2 took the blinds, then posted the new small blind; seat 0 posts the big.
    assert_eq!(stacks(&seats), vec![980, 990, 1000]);
    assert_eq!(stacks(&seats).iter().sum::<i64>() + next.pot, 3000);

    let again = HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    assert!(!again.changed());
    Ok(())
}
