//! Random legal play never creates or destroys chips.

use holdem_backend::config::engine::EngineConfig;
use holdem_backend::domain::actions::ActionKind;
use holdem_backend::domain::betting::{legal_actions, BettingInput, LegalActions};
use holdem_backend::domain::player_status::PlayerStatus;
use holdem_backend::error::AppError;
use holdem_backend::repos::hands;
use holdem_backend::services::hand_flow::HandFlowService;
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use time::OffsetDateTime;

use crate::common::proptest_prelude::proptest_prelude_config;
use crate::support::tables::{act, chips_in_play, config, seats_of, setup_table, table};

const MAX_ACTIONS: usize = 200;

fn pick(rng: &mut ChaCha8Rng, legal: &LegalActions) -> (ActionKind, Option<i64>) {
    let roll = rng.random_range(0..100);
    if roll >= 95 {
        return (ActionKind::AllIn, None);
    }
    if legal.can_raise && roll < 15 {
        return (
            ActionKind::Raise,
            Some(rng.random_range(legal.min_raise..=legal.max_raise)),
        );
    }
    if legal.can_bet && roll < 30 {
        return (
            ActionKind::Bet,
            Some(rng.random_range(legal.min_bet..=legal.max_bet)),
        );
    }
    if roll < 40 {
        return (ActionKind::Fold, None);
    }
    if legal.can_check {
        (ActionKind::Check, None)
    } else if legal.can_call {
        (ActionKind::Call, None)
    } else {
        (ActionKind::Fold, None)
    }
}

/// Play random legal actions and check the chip total after every one.
async fn random_play(seed: u64, players: u8) -> Result<(), AppError> {
    let stacks = vec![200; players as usize];
    let t = setup_table(EngineConfig::immediate(), config(players, 5, 10), &stacks).await?;
    let total: i64 = stacks.iter().sum();
    let now = OffsetDateTime::now_utc();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    HandFlowService.advance_at(&t.state, t.table_id, now).await?;
    for _ in 0..MAX_ACTIONS {
        let Some(hand) = hands::find_live_for_table(t.state.db(), t.table_id).await? else {
            break;
        };
        let actor = hand
            .current_actor
            .expect("an immediate engine never leaves a live hand without an actor");
        let seats = seats_of(&t.state, t.table_id).await?;
        let seat = seats
            .iter()
            .find(|s| s.seat_index == actor)
            .expect("actor is seated");
        let big_blind = table(&t.state, t.table_id).await?.big_blind;
        let legal = legal_actions(&BettingInput {
            status: seat.status,
            current_bet: hand.current_bet,
            player_bet: seat.current_bet,
            stack: seat.stack,
            min_raise_increment: hand.min_raise_increment,
            big_blind,
        });
        let (kind, amount) = pick(&mut rng, &legal);
        act(&t.state, t.table_id, actor, kind, amount, now).await?;

        assert_eq!(chips_in_play(&t.state, t.table_id).await?, total);
        let seats = seats_of(&t.state, t.table_id).await?;
        assert!(seats.iter().all(|s| s.stack >= 0));
    }

    let table = table(&t.state, t.table_id).await?;
    if table.is_complete() {
        let seats = seats_of(&t.state, t.table_id).await?;
        let winner = table.winner_seat.expect("complete table names a winner");
        for seat in &seats {
            if seat.seat_index == winner {
                assert_eq!(seat.stack, total);
            } else {
                assert_eq!(seat.status, PlayerStatus::Eliminated);
            }
        }
    }
    Ok(())
}

#[tokio::test]
async fn fixed_seeds_conserve_chips() -> Result<(), AppError> {
    for (seed, players) in [(1, 2), (7, 3), (42, 4), (1234, 6)] {
        random_play(seed, players).await?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(proptest_prelude_config())]

    #[test]
    fn random_play_conserves_chips(seed in any::<u64>(), players in 2u8..=5) {
        let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
        let result = rt.block_on(random_play(seed, players));
        prop_assert!(result.is_ok(), "random play failed: {:?}", result.err());
    }
}
