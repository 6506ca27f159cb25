use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::player_status::PlayerStatus;
use holdem_backend::error::AppError;
use holdem_backend::repos::actions;
use holdem_backend::services::hand_flow::{HandFlowService, SubmitAction};
use time::{Duration, OffsetDateTime};

use crate::support::tables::{
    act, clock, config, live_hand, player, rigged_deck, seats_of, setup_table, start_rigged_hand,
    table, TestTable,
};

const DECK: &str = "2c 3c 4c 5d 6d 7d 8h 9h Th Jh 2s";

async fn timed_table(now: OffsetDateTime) -> Result<TestTable, AppError> {
    let mut cfg = config(3, 10, 20);
    cfg.turn_timeout_secs = Some(30);
    let t = setup_table(EngineConfig::immediate(), cfg, &[1000, 1000, 1000]).await?;
    start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), now).await?;
    Ok(t)
}

#[tokio::test]
async fn actor_gets_a_deadline() -> Result<(), AppError> {
    let now = clock();
    let t = timed_table(now).await?;
    let hand = live_hand(&t.state, t.table_id).await?;
    assert_eq!(hand.current_actor, Some(0));
    assert_eq!(hand.action_deadline, Some(now + Duration::seconds(30)));

    let later = now + Duration::seconds(5);
    let out = act(&t.state, t.table_id, 0, ActionKind::Call, None, later).await?;
    assert_eq!(
        out.hand.action_deadline,
        Some(now + Duration::seconds(35)),
        "the next actor's clock starts when the turn passes"
    );
    Ok(())
}

#[tokio::test]
async fn advance_before_deadline_only_schedules_a_wake() -> Result<(), AppError> {
    let now = clock();
    let t = timed_table(now).await?;

    let report = HandFlowService
        .advance_at(&t.state, t.table_id, now + Duration::seconds(29))
        .await?;
    assert!(!report.changed());
    assert!(report.settled);
    assert_eq!(report.wake_after_ms, Some(1000));
    assert_eq!(live_hand(&t.state, t.table_id).await?.current_actor, Some(0));
    Ok(())
}

#[tokio::test]
async fn action_at_the_deadline_is_refused() -> Result<(), AppError> {
    let now = clock();
    let t = timed_table(now).await?;

    let err = act(&t.state, t.table_id, 0, ActionKind::Call, None, now + Duration::seconds(30))
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "TURN_EXPIRED");
    Ok(())
}

#[tokio::test]
async fn expired_turn_is_folded_and_action_moves_on() -> Result<(), AppError> {
    let now = clock();
    let t = timed_table(now).await?;
    let later = now + Duration::seconds(30);

    let report = HandFlowService.advance_at(&t.state, t.table_id, later).await?;
    assert_eq!(report.steps, vec!["expire_turn"]);

    let hand = live_hand(&t.state, t.table_id).await?;
    assert_eq!(hand.current_actor, Some(1));
    assert_eq!(hand.action_deadline, Some(later + Duration::seconds(30)));

    let log = actions::find_all_by_hand(t.state.db(), hand.id).await?;
    let last = log.last().expect("fold recorded");
    assert_eq!((last.seat_index, last.kind), (0, ActionKind::Fold));

    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(seats[0].status, PlayerStatus::Folded);
    assert_eq!(seats[0].stack, 1000, "a timed-out fold costs nothing extra");

    let again = HandFlowService.advance_at(&t.state, t.table_id, later).await?;
    assert!(!again.changed(), "the fold happens once");
    Ok(())
}

#[tokio::test]
async fn sweep_folds_every_expired_actor() -> Result<(), AppError> {
    let now = clock();
    let t = timed_table(now).await?;

    let report = HandFlowService
        .sweep_at(&t.state, now + Duration::seconds(31))
        .await?;
    assert_eq!(report.failures().count(), 0);
    assert_eq!(report.advanced(), 1);
    assert_eq!(live_hand(&t.state, t.table_id).await?.current_actor, Some(1));
    Ok(())
}

#[tokio::test]
async fn stale_expected_version_is_a_conflict() -> Result<(), AppError> {
    let now = clock();
    let t = timed_table(now).await?;
    let version = table(&t.state, t.table_id).await?.version;

    let err = HandFlowService
        .submit_action_at(
            &t.state,
            SubmitAction {
                table_id: t.table_id,
                player_id: player(0),
                action: ActionKind::Call,
                amount: None,
                expected_version: Some(version - 1),
            },
            now,
        )
        .await
        .unwrap_err();
    assert!(err.is_version_conflict());

    let out = HandFlowService
        .submit_action_at(
            &t.state,
            SubmitAction {
                table_id: t.table_id,
                player_id: player(0),
                action: ActionKind::Call,
                amount: None,
                expected_version: Some(version),
            },
            now,
        )
        .await?;
    assert!(out.table_version > version);
    Ok(())
}
