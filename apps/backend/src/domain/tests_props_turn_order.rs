//! Property tests: turn-order totality and betting-complete agreement.

use proptest::prelude::*;

use crate::domain::hand_phase::is_betting_complete;
use crate::domain::player_status::PlayerStatus;
use crate::domain::turn_order::{can_act, find_next_actor, SeatView};

fn status() -> impl Strategy<Value = PlayerStatus> {
    prop_oneof![
        Just(PlayerStatus::Waiting),
        Just(PlayerStatus::Active),
        Just(PlayerStatus::Acted),
        Just(PlayerStatus::Folded),
        Just(PlayerStatus::AllIn),
        Just(PlayerStatus::SittingOut),
        Just(PlayerStatus::Eliminated),
    ]
}

/// Seats with consistent all-in bookkeeping: all-in means an empty stack.
fn seats() -> impl Strategy<Value = Vec<SeatView>> {
    prop::collection::vec((status(), 0i64..400, 0i64..200), 2..10).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (status, stack, bet))| SeatView {
                seat: i as u8,
                status,
                stack: if status == PlayerStatus::AllIn { 0 } else { stack },
                bet,
            })
            .collect()
    })
}

proptest! {
    /// The resolver never names a seat that cannot act, and it returns `None`
    /// exactly when betting is complete.
    #[test]
    fn prop_next_actor_is_total(seats in seats(), from in 0u8..10) {
        let current_bet = seats.iter().map(|s| s.bet).max().unwrap_or(0);
        let next = find_next_actor(current_bet, &seats, from);

        if let Some(idx) = next {
            let seat = seats.iter().find(|s| s.seat == idx);
            prop_assert!(seat.is_some_and(can_act), "named seat {} cannot act", idx);
        }
        prop_assert_eq!(next.is_none(), is_betting_complete(&seats, current_bet));
    }

    /// Scanning is deterministic: the same input always yields the same actor.
    #[test]
    fn prop_next_actor_is_deterministic(seats in seats(), from in 0u8..10) {
        let current_bet = seats.iter().map(|s| s.bet).max().unwrap_or(0);
        prop_assert_eq!(
            find_next_actor(current_bet, &seats, from),
            find_next_actor(current_bet, &seats, from)
        );
    }
}
