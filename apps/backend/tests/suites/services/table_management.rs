//! Table creation, seating and sit-out rules through the public service.

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::player_status::PlayerStatus;
use holdem_backend::error::AppError;
use holdem_backend::repos::hands;
use holdem_backend::services::hand_flow::HandFlowService;
use holdem_backend::services::tables::{CreateTable, SeatPlayer, TableService};

use crate::support::tables::{
    act, clock, config, live_hand, player, seats_of, setup_table, test_state,
};

fn seat(player_id: i64, seat_index: u8, buy_in: i64) -> SeatPlayer {
    SeatPlayer {
        player_id,
        seat_index,
        buy_in,
    }
}

#[tokio::test]
async fn invalid_table_configs_are_rejected() -> Result<(), AppError> {
    let (state, _sink) = test_state(EngineConfig::immediate()).await?;
    let bad: Vec<CreateTable> = vec![
        CreateTable {
            big_blind: 0,
            ..config(6, 10, 20)
        },
        CreateTable {
            small_blind: 30,
            ..config(6, 10, 20)
        },
        config(11, 10, 20),
        config(1, 10, 20),
        CreateTable {
            ante: -1,
            ..config(6, 10, 20)
        },
        CreateTable {
            turn_timeout_secs: Some(0),
            ..config(6, 10, 20)
        },
        CreateTable {
            name: "  ".into(),
            ..config(6, 10, 20)
        },
    ];
    for cmd in bad {
        let err = TableService.create_table(&state, cmd.clone()).await.unwrap_err();
        assert_eq!(err.code().as_str(), "INVALID_TABLE_CONFIG", "{cmd:?}");
    }

    let created = TableService.create_table(&state, config(6, 10, 20)).await?;
    assert_eq!(created.seat_capacity, 6);
    assert_eq!(created.dealer_seat, None);
    assert_eq!(created.rng_seed, 42);
    Ok(())
}

#[tokio::test]
async fn seating_rules_and_auto_start() -> Result<(), AppError> {
    let (state, _sink) = test_state(EngineConfig::immediate()).await?;
    let table = TableService.create_table(&state, config(3, 10, 20)).await?;

    TableService.seat_player(&state, table.id, seat(1, 0, 1000)).await?;
    assert!(hands::find_live_for_table(state.db(), table.id).await?.is_none());

    let cases = [
        (seat(2, 0, 1000), "SEAT_TAKEN"),
        (seat(1, 1, 1000), "PLAYER_ALREADY_SEATED"),
        (seat(2, 3, 1000), "INVALID_SEAT"),
        (seat(2, 1, 0), "INVALID_AMOUNT"),
    ];
    for (cmd, code) in cases {
        let err = TableService.seat_player(&state, table.id, cmd).await.unwrap_err();
        assert_eq!(err.code().as_str(), code);
    }

    // A second player is enough to deal.
    TableService.seat_player(&state, table.id, seat(2, 1, 1000)).await?;
    let hand = hands::find_live_for_table(state.db(), table.id)
        .await?
        .expect("hand started");
    assert_eq!(hand.hand_no, 1);
    assert_eq!(hand.dealer_seat, 0);

    // Late arrivals wait for the next hand.
    let late = TableService.seat_player(&state, table.id, seat(3, 2, 1000)).await?;
    assert!(!late.is_dealt_in());
    Ok(())
}

#[tokio::test]
async fn sit_out_is_refused_mid_hand() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = clock();
    HandFlowService.advance_at(&t.state, t.table_id, now).await?;

    let err = TableService
        .sit_out(&t.state, t.table_id, player(1))
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "HAND_IN_PROGRESS");

    let err = TableService.sit_out(&t.state, t.table_id, 999).await.unwrap_err();
    assert_eq!(err.code().as_str(), "SEAT_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn sitting_out_seat_is_skipped_by_the_deal() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = clock();

    // Sitting out before the first deal triggers a heads-up hand without seat 2.
    let seat2 = TableService.sit_out(&t.state, t.table_id, player(2)).await?;
    assert_eq!(seat2.status, PlayerStatus::SittingOut);

    let hand = live_hand(&t.state, t.table_id).await?;
    assert_eq!(hand.dealer_seat, 0);
    assert_eq!(hand.small_blind_seat, 0, "heads-up button posts the small blind");
    assert_eq!(hand.big_blind_seat, 1);
    let seats = seats_of(&t.state, t.table_id).await?;
    assert!(seats[2].hole_cards.is_none());
    assert_eq!(seats[2].stack, 1000);

    // Coming back mid-hand is allowed but does not deal the seat in.
    let back = TableService.sit_in(&t.state, t.table_id, player(2)).await?;
    assert_eq!(back.status, PlayerStatus::Waiting);
    assert!(!back.is_dealt_in());

    act(&t.state, t.table_id, 0, ActionKind::Fold, None, now).await?;
    let next = live_hand(&t.state, t.table_id).await?;
    assert_eq!(next.hand_no, 2);
    let seats = seats_of(&t.state, t.table_id).await?;
    assert!(seats.iter().all(|s| s.is_dealt_in()), "all three seats play hand 2");
    Ok(())
}
