//! A live hand whose recorded actor is missing or can no longer act gets a new one.

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::db::txn::with_txn;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::error::AppError;
use holdem_backend::repos::hands;
use holdem_backend::services::hand_flow::HandFlowService;

use crate::support::tables::{act, clock, config, live_hand, setup_table, table, TestTable};

async fn three_handed() -> Result<TestTable, AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 200, 1000]).await?;
    HandFlowService.advance_at(&t.state, t.table_id, clock()).await?;
    Ok(t)
}

/// Overwrite the live hand's actor as if a crash left it behind.
async fn corrupt_actor(t: &TestTable, actor: Option<u8>) -> Result<(), AppError> {
    let mut hand = live_hand(&t.state, t.table_id).await?;
    hand.current_actor = actor;
    with_txn(&t.state, move |txn| {
        Box::pin(async move {
            hands::write_hand(txn, &hand).await?;
            Ok(())
        })
    })
    .await
}

async fn healed_count(t: &TestTable) -> usize {
    t.sink
        .event_types(&format!("table:{}", t.table_id))
        .await
        .iter()
        .filter(|e| *e == "actor_healed")
        .count()
}

/// Heal once, then confirm a second pass has nothing left to do.
async fn heal_and_settle(t: &TestTable) -> Result<Option<u8>, AppError> {
    let now = clock();
    let report = HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    assert_eq!(report.steps, vec!["heal_actor"]);
    assert_eq!(healed_count(t).await, 1);

    let hand = live_hand(&t.state, t.table_id).await?;
    let version = table(&t.state, t.table_id).await?.version;
    let again = HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    assert!(!again.changed());
    assert_eq!(healed_count(t).await, 1);
    assert_eq!(table(&t.state, t.table_id).await?.version, version);
    assert_eq!(live_hand(&t.state, t.table_id).await?, hand);
    Ok(hand.current_actor)
}

#[tokio::test]
async fn missing_preflop_actor_goes_to_the_seat_after_the_big_blind() -> Result<(), AppError> {
    let t = three_handed().await?;
    assert_eq!(live_hand(&t.state, t.table_id).await?.current_actor, Some(0));

    corrupt_actor(&t, None).await?;
    assert_eq!(heal_and_settle(&t).await?, Some(0));
    Ok(())
}

#[tokio::test]
async fn folded_actor_hands_the_turn_to_the_next_seat() -> Result<(), AppError> {
    let t = three_handed().await?;
    act(&t.state, t.table_id, 0, ActionKind::Fold, None, clock()).await?;

    corrupt_actor(&t, Some(0)).await?;
    assert_eq!(heal_and_settle(&t).await?, Some(1));
    Ok(())
}

#[tokio::test]
async fn all_in_actor_hands_the_turn_to_the_next_seat() -> Result<(), AppError> {
    let t = three_handed().await?;
    act(&t.state, t.table_id, 0, ActionKind::Call, None, clock()).await?;
    // Seat 1 shoves its 200; seat 2 still owes a decision.
    act(&t.state, t.table_id, 1, ActionKind::AllIn, None, clock()).await?;

    corrupt_actor(&t, Some(1)).await?;
    assert_eq!(heal_and_settle(&t).await?, Some(2));
    Ok(())
}
