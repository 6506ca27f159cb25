//! Side pot layering: short all-ins, uncalled returns and ante dead money.

use std::collections::BTreeSet;
use std::time::Duration;

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::hand_phase::HandPhase;
use holdem_backend::domain::player_status::PlayerStatus;
use holdem_backend::error::AppError;
use holdem_backend::repos::{actions, hands, pots, showdown};
use holdem_backend::services::tables::CreateTable;
use time::OffsetDateTime;

use crate::support::tables::{
    act, chips_in_play, config, rigged_deck, seats_of, setup_table, stacks, start_rigged_hand,
};

// Seat 1 gets kings, seat 2 queens, seat 0 aces; a dry board follows.
const DECK: &str = "Kc Qc Ac Kd Qd Ad 2c 3s 7h 9d 4c Jh 5c 2s";

fn engine() -> EngineConfig {
    EngineConfig::immediate().with_inter_hand_delay(Duration::from_secs(60))
}

#[tokio::test]
async fn layered_pots_go_to_the_best_eligible_hand() -> Result<(), AppError> {
    let t = setup_table(engine(), config(3, 10, 20), &[50, 100, 300]).await?;
    let now = OffsetDateTime::now_utc();
    let hand = start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), now).await?;
    assert_eq!(hand.current_actor, Some(0));

    let out = act(&t.state, t.table_id, 0, ActionKind::AllIn, None, now).await?;
    assert_eq!(out.action.kind, ActionKind::Raise);
    assert_eq!(out.action.amount, 50);
    let out = act(&t.state, t.table_id, 1, ActionKind::AllIn, None, now).await?;
    assert_eq!(out.action.amount, 100);
    assert_eq!(chips_in_play(&t.state, t.table_id).await?, 450);

    let out = act(&t.state, t.table_id, 2, ActionKind::AllIn, None, now).await?;
    assert!(out.hand_complete, "nobody can act, so the board runs out");
    assert_eq!(out.hand.phase, HandPhase::Complete);
    assert_eq!(out.hand.community.len(), 5);
    assert_eq!(out.hand.pot, 0);

    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(stacks(&seats), vec![150, 100, 200]);
    assert!(seats.iter().all(|s| s.hole_cards.is_none()));
    assert!(seats.iter().all(|s| s.status == PlayerStatus::Waiting));

    let layers = pots::find_all_by_hand(t.state.db(), hand.id).await?;
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].amount, 150);
    assert_eq!(layers[0].eligible, BTreeSet::from([0, 1, 2]));
    assert_eq!(layers[1].amount, 100);
    assert_eq!(layers[1].eligible, BTreeSet::from([1, 2]));

    let log = actions::find_all_by_hand(t.state.db(), hand.id).await?;
    let returned = log
        .iter()
        .find(|a| a.kind == ActionKind::UncalledReturn)
        .expect("uncalled chips are logged");
    assert_eq!((returned.seat_index, returned.chips_added), (2, -200));

    let results = showdown::find_all_by_hand(t.state.db(), hand.id).await?;
    let won: Vec<(u8, i64)> = results.iter().map(|r| (r.seat_index, r.amount_won)).collect();
    assert_eq!(won, vec![(0, 150), (1, 100)]);

    let completed = hands::require_hand(t.state.db(), hand.id).await?;
    assert!(completed.completed_at.is_some());
    assert!(completed.showdown_started_at.is_some());
    Ok(())
}

#[tokio::test]
async fn split_pot_remainder_goes_left_of_the_button() -> Result<(), AppError> {
    // Both players play the board; the odd chip from a 75 pot lands on seat 1.
    let t = setup_table(engine(), config(3, 5, 10), &[1000, 1000, 1000]).await?;
    let now = OffsetDateTime::now_utc();
    // Seat 1 and seat 2 hold low cards, seat 0 folds; the board is a broadway straight.
    let deck = "2c 3c 4c 2d 3d 4d 5h Ah Kd Qs 6h Jc 7h Td";
    start_rigged_hand(&t.state, t.table_id, rigged_deck(deck), now).await?;

    act(&t.state, t.table_id, 0, ActionKind::Raise, Some(25), now).await?;
    act(&t.state, t.table_id, 1, ActionKind::Call, None, now).await?;
    act(&t.state, t.table_id, 2, ActionKind::Call, None, now).await?;
    // Flop: seat 1 opens, seat 2 checks, seat 0 folds its 25 into the middle.
    act(&t.state, t.table_id, 1, ActionKind::Check, None, now).await?;
    act(&t.state, t.table_id, 2, ActionKind::Check, None, now).await?;
    act(&t.state, t.table_id, 0, ActionKind::Fold, None, now).await?;
    for _ in 0..2 {
        act(&t.state, t.table_id, 1, ActionKind::Check, None, now).await?;
        act(&t.state, t.table_id, 2, ActionKind::Check, None, now).await?;
    }

    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(stacks(&seats), vec![975, 1013, 1012]);
    Ok(())
}

#[tokio::test]
async fn ante_all_in_seat_wins_the_dead_money() -> Result<(), AppError> {
    // Seat 0 covers only the ante and holds aces; seats 1 and 2 check it down.
    let cfg = CreateTable {
        ante: 10,
        ..config(3, 10, 20)
    };
    let t = setup_table(engine(), cfg, &[10, 1000, 1000]).await?;
    let now = OffsetDateTime::now_utc();
    let hand = start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), now).await?;

    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(seats[0].status, PlayerStatus::AllIn);
    assert_eq!(seats[0].total_contributed, 0);
    assert_eq!(hand.pot, 60);
    assert_eq!(hand.current_actor, Some(1), "the all-in ante seat is skipped");

    act(&t.state, t.table_id, 1, ActionKind::Call, None, now).await?;
    act(&t.state, t.table_id, 2, ActionKind::Check, None, now).await?;
    let mut last = None;
    for _ in 0..3 {
        act(&t.state, t.table_id, 1, ActionKind::Check, None, now).await?;
        last = Some(act(&t.state, t.table_id, 2, ActionKind::Check, None, now).await?);
    }
    assert!(last.is_some_and(|out| out.hand_complete));

    let layers = pots::find_all_by_hand(t.state.db(), hand.id).await?;
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].amount, 30);
    assert_eq!(layers[0].eligible, BTreeSet::from([0, 1, 2]));
    assert_eq!(layers[1].amount, 40);
    assert_eq!(layers[1].eligible, BTreeSet::from([1, 2]));

    let results = showdown::find_all_by_hand(t.state.db(), hand.id).await?;
    let won: Vec<(u8, i64)> = results.iter().map(|r| (r.seat_index, r.amount_won)).collect();
    assert_eq!(won, vec![(0, 30), (1, 40)]);

    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(stacks(&seats), vec![30, 1010, 970]);
    assert_ne!(seats[0].status, PlayerStatus::Eliminated);
    assert_eq!(chips_in_play(&t.state, t.table_id).await?, 2010);
    Ok(())
}
