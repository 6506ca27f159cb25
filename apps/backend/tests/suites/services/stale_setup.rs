//! A hand left in `dealing` by a crashed setup is rolled back and refunded.

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::db::txn::with_txn;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::hand_phase::HandPhase;
use holdem_backend::error::AppError;
use holdem_backend::repos::actions::{self, NewAction};
use holdem_backend::repos::hands::{self, Hand};
use holdem_backend::repos::seats;
use holdem_backend::services::hand_flow::HandFlowService;
use time::{Duration, OffsetDateTime};

use crate::support::tables::{
    chips_in_play, clock, config, live_hand, seats_of, setup_table, stacks, TestTable,
};

/// Create a hand and post one ante, then stop as if the process died.
async fn abandon_setup(t: &TestTable, now: OffsetDateTime) -> Result<Hand, AppError> {
    let table_id = t.table_id;
    with_txn(&t.state, move |txn| {
        Box::pin(async move {
            let hand = HandFlowService.create_hand(txn, table_id, now).await?;
            let mut seat = seats::find_by_seat(txn, table_id, 1)
                .await?
                .expect("seat 1 is taken");
            seat.stack -= 5;
            seats::write_seat(txn, &seat).await?;
            actions::append(
                txn,
                hand.id,
                NewAction {
                    seat_index: 1,
                    kind: ActionKind::PostAnte,
                    amount: 5,
                    chips_added: 5,
                    phase: HandPhase::Dealing,
                },
                now,
            )
            .await?;
            Ok(hand)
        })
    })
    .await
}

#[tokio::test]
async fn stale_setup_is_refunded_and_replaced() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = clock();
    let stuck = abandon_setup(&t, now).await?;
    assert_eq!(stacks(&seats_of(&t.state, t.table_id).await?), vec![1000, 995, 1000]);

    let report = HandFlowService
        .advance_at(&t.state, t.table_id, now + Duration::seconds(31))
        .await?;
    assert_eq!(report.steps.first(), Some(&"cleanup_stale_setup"));
    assert!(t
        .sink
        .event_types(&format!("table:{}", t.table_id))
        .await
        .contains(&"hand_aborted".to_string()));

    assert!(hands::require_hand(t.state.db(), stuck.id).await.is_err());
    assert!(actions::find_all_by_hand(t.state.db(), stuck.id).await?.is_empty());

    // The replacement deals from the same button with the ante back in seat 1's stack.
    let next = live_hand(&t.state, t.table_id).await?;
    assert_ne!(next.id, stuck.id);
    assert_eq!(next.phase, HandPhase::Preflop);
    assert_eq!(next.dealer_seat, stuck.dealer_seat);
    assert_eq!(stacks(&seats_of(&t.state, t.table_id).await?), vec![1000, 990, 980]);
    assert_eq!(chips_in_play(&t.state, t.table_id).await?, 3000);
    Ok(())
}

#[tokio::test]
async fn young_setup_is_finished_not_aborted() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = clock();
    let hand = abandon_setup(&t, now).await?;

    let report = HandFlowService
        .advance_at(&t.state, t.table_id, now + Duration::seconds(5))
        .await?;
    assert!(!report.steps.contains(&"cleanup_stale_setup"));
    assert!(report.steps.contains(&"heal_actor"));

    let dealt = live_hand(&t.state, t.table_id).await?;
    assert_eq!(dealt.id, hand.id);
    assert_eq!(dealt.phase, HandPhase::Preflop);
    Ok(())
}
