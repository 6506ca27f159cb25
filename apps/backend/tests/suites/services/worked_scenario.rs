//! Three seats, 1000 each, blinds 10/20, button on seat 0.

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::cards::parse_cards;
use holdem_backend::domain::hand_phase::HandPhase;
use holdem_backend::domain::player_status::PlayerStatus;
use holdem_backend::error::AppError;
use holdem_backend::repos::actions;
use holdem_backend::services::hand_flow::HandFlowService;
use time::OffsetDateTime;

use crate::support::tables::{
    act, config, live_hand, rigged_deck, seats_of, setup_table, stacks, start_rigged_hand,
};

// Deal order from the button: seat 1, seat 2, seat 0, twice. Then burn, flop.
const DECK: &str = "2c 3c 4c 5d 6d 7d 8h 9h Th Jh 2s";

#[tokio::test]
async fn preflop_round_reaches_the_flop() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = OffsetDateTime::now_utc();

    let hand = start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), now).await?;
    assert_eq!(hand.phase, HandPhase::Preflop);
    assert_eq!(
        (hand.dealer_seat, hand.small_blind_seat, hand.big_blind_seat),
        (0, 1, 2)
    );
    assert_eq!(hand.current_actor, Some(0));
    assert_eq!(hand.current_bet, 20);
    assert_eq!(hand.pot, 30);

    let seats = seats_of(&t.state, t.table_id).await?;
    assert_eq!(stacks(&seats), vec![1000, 990, 980]);
    assert_eq!(seats[1].hole_cards, Some(parse_cards("2c 5d")?.try_into().unwrap()));
    assert_eq!(seats[2].hole_cards, Some(parse_cards("3c 6d")?.try_into().unwrap()));
    assert_eq!(seats[0].hole_cards, Some(parse_cards("4c 7d")?.try_into().unwrap()));
    // Blind posters still owe a decision.
    assert_eq!(seats[1].status, PlayerStatus::Waiting);

    let out = act(&t.state, t.table_id, 0, ActionKind::Call, None, now).await?;
    assert_eq!(out.next_actor, Some(1));
    assert_eq!(out.action.amount, 20);

    let out = act(&t.state, t.table_id, 1, ActionKind::Call, None, now).await?;
    assert_eq!(out.next_actor, Some(2));
    assert_eq!(out.action.chips_added, 10);

    let out = act(&t.state, t.table_id, 2, ActionKind::Check, None, now).await?;
    assert!(out.phase_changed);
    assert_eq!(out.hand.phase, HandPhase::Flop);
    assert_eq!(out.hand.pot, 60);
    assert_eq!(out.next_actor, Some(1), "first actor postflop sits left of the button");
    assert_eq!(out.hand.community, parse_cards("9h Th Jh")?);
    assert_eq!(out.hand.current_bet, 0);
    assert!(out.seats.iter().all(|s| s.current_bet == 0));

    let log = actions::find_all_by_hand(t.state.db(), hand.id).await?;
    let kinds: Vec<ActionKind> = log.iter().map(|a| a.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::PostSmallBlind,
            ActionKind::PostBigBlind,
            ActionKind::Call,
            ActionKind::Call,
            ActionKind::Check,
        ]
    );
    assert!(log.windows(2).all(|w| w[1].seq == w[0].seq + 1));
    Ok(())
}

#[tokio::test]
async fn out_of_turn_action_is_rejected_without_changes() -> Result<(), AppError> {
    let t = setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
    let now = OffsetDateTime::now_utc();
    start_rigged_hand(&t.state, t.table_id, rigged_deck(DECK), now).await?;
    let before = live_hand(&t.state, t.table_id).await?;

    let err = act(&t.state, t.table_id, 2, ActionKind::Check, None, now)
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "NOT_YOUR_TURN");

    let err = act(&t.state, t.table_id, 0, ActionKind::Raise, Some(30), now)
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_AMOUNT");

    let after = live_hand(&t.state, t.table_id).await?;
    assert_eq!(before, after);
    Ok(())
}

/// Same seed, same actions: the same phases, actors and board.
#[tokio::test]
async fn seeded_hands_replay_identically() -> Result<(), AppError> {
    async fn play() -> Result<Vec<(HandPhase, Option<u8>, usize)>, AppError> {
        let t =
            setup_table(EngineConfig::immediate(), config(3, 10, 20), &[1000, 1000, 1000]).await?;
        let now = OffsetDateTime::now_utc();
        HandFlowService.advance_at(&t.state, t.table_id, now).await?;

        let mut trace = Vec::new();
        let script = [
            (0, ActionKind::Call, None),
            (1, ActionKind::Call, None),
            (2, ActionKind::Check, None),
            (1, ActionKind::Bet, Some(40)),
            (2, ActionKind::Call, None),
            (0, ActionKind::Fold, None),
        ];
        for (seat, kind, amount) in script {
            let out = act(&t.state, t.table_id, seat, kind, amount, now).await?;
            trace.push((out.hand.phase, out.next_actor, out.hand.community.len()));
        }
        let hand = live_hand(&t.state, t.table_id).await?;
        trace.push((hand.phase, hand.current_actor, hand.community.len()));
        Ok(trace)
    }

    let first = play().await?;
    let second = play().await?;
    assert_eq!(first, second);
    assert_eq!(first[2], (HandPhase::Flop, Some(1), 3));
    assert_eq!(first[5], (HandPhase::Turn, Some(1), 4));
    Ok(())
}
