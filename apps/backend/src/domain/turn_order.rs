//! Turn order: next actor, first actor per street, blind positions and dealer rotation.
//!
//! Seats are scanned clockwise by seat index, wrapping past the highest index.
//! Heads-up (two seats dealt in) and ring games are distinct rule branches.

use super::player_status::PlayerStatus;

/// What the resolver needs to know about one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatView {
    pub seat: u8,
    pub status: PlayerStatus,
    pub stack: i64,
    /// Chips put in on the current street.
    pub bet: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatingShape {
    HeadsUp,
    Ring,
}

impl SeatingShape {
    pub fn for_players(dealt_in: usize) -> Self {
        if dealt_in == 2 {
            SeatingShape::HeadsUp
        } else {
            SeatingShape::Ring
        }
    }
}

/// Seat can still make a betting decision.
pub fn can_act(seat: &SeatView) -> bool {
    seat.status.may_act() && seat.stack > 0
}

/// Seat can act and owes a decision at this bet level.
pub fn needs_to_act(seat: &SeatView, current_bet: i64) -> bool {
    if !can_act(seat) {
        return false;
    }
    match seat.status {
        PlayerStatus::Waiting | PlayerStatus::Active => true,
        _ => seat.bet < current_bet,
    }
}

/// Seat indices in clockwise order starting just after `from_seat`.
pub fn clockwise_from<I>(seats: I, from_seat: u8) -> Vec<u8>
where
    I: IntoIterator<Item = u8>,
{
    let mut all: Vec<u8> = seats.into_iter().collect();
    all.sort_unstable();
    all.dedup();
    let (before, after): (Vec<u8>, Vec<u8>) = all.into_iter().partition(|s| *s <= from_seat);
    after.into_iter().chain(before).collect()
}

/// Next seat that owes a decision, or `None` when betting is complete.
pub fn find_next_actor(current_bet: i64, seats: &[SeatView], from_seat: u8) -> Option<u8> {
    let in_hand = seats.iter().filter(|s| s.status.is_in_hand()).count();
    if in_hand <= 1 {
        return None;
    }

    let candidates: Vec<&SeatView> = seats.iter().filter(|s| can_act(s)).collect();
    match candidates.as_slice() {
        [] => None,
        // A lone live player facing all-ins still has to call or fold.
        [only] => needs_to_act(only, current_bet).then_some(only.seat),
        _ => clockwise_from(candidates.iter().map(|s| s.seat), from_seat)
            .into_iter()
            .find(|idx| {
                candidates
                    .iter()
                    .any(|s| s.seat == *idx && needs_to_act(s, current_bet))
            }),
    }
}

fn seat_view(seats: &[SeatView], idx: u8) -> Option<&SeatView> {
    seats.iter().find(|s| s.seat == idx)
}

/// First actor preflop. Heads-up the dealer (who is also the small blind) opens;
/// otherwise the seat left of the big blind.
pub fn first_actor_preflop(
    shape: SeatingShape,
    dealer_seat: u8,
    big_blind_seat: u8,
    current_bet: i64,
    seats: &[SeatView],
) -> Option<u8> {
    match shape {
        SeatingShape::HeadsUp => match seat_view(seats, dealer_seat) {
            Some(dealer) if needs_to_act(dealer, current_bet) => Some(dealer.seat),
            _ => find_next_actor(current_bet, seats, dealer_seat),
        },
        SeatingShape::Ring => find_next_actor(current_bet, seats, big_blind_seat),
    }
}

/// First actor on flop, turn and river. Heads-up the non-dealer (big blind) opens;
/// otherwise the seat left of the dealer.
pub fn first_actor_postflop(
    shape: SeatingShape,
    dealer_seat: u8,
    big_blind_seat: u8,
    seats: &[SeatView],
) -> Option<u8> {
    match shape {
        SeatingShape::HeadsUp => match seat_view(seats, big_blind_seat) {
            Some(bb) if needs_to_act(bb, 0) => Some(bb.seat),
            _ => find_next_actor(0, seats, big_blind_seat),
        },
        SeatingShape::Ring => find_next_actor(0, seats, dealer_seat),
    }
}

/// Small and big blind seats for a hand, from the seats dealt in.
pub fn blind_seats(shape: SeatingShape, dealer_seat: u8, dealt_in: &[u8]) -> Option<(u8, u8)> {
    match shape {
        SeatingShape::HeadsUp => {
            let other = dealt_in.iter().copied().find(|s| *s != dealer_seat)?;
            Some((dealer_seat, other))
        }
        SeatingShape::Ring => {
            let order = clockwise_from(dealt_in.iter().copied(), dealer_seat);
            let sb = *order.first()?;
            let bb = *order.get(1)?;
            Some((sb, bb))
        }
    }
}

/// Dealer for the next hand: the first eligible seat clockwise from the previous
/// button, or the lowest eligible seat for a table's first hand.
pub fn next_dealer(previous: Option<u8>, eligible: &[u8]) -> Option<u8> {
    match previous {
        None => eligible.iter().copied().min(),
        Some(prev) => clockwise_from(eligible.iter().copied(), prev)
            .first()
            .copied(),
    }
}
