//! Hand lifecycle: create, deal, award an uncontested pot, complete, end the table.

use std::collections::BTreeSet;

use sea_orm::ConnectionTrait;
use serde_json::json;
use time::OffsetDateTime;
use tracing::info;

use super::context::HandContext;
use super::{FlowEnv, HandFlowService};
use crate::domain::actions::ActionKind;
use crate::domain::cards::{shuffled_deck, Card};
use crate::domain::hand_phase::HandPhase;
use crate::domain::player_status::PlayerStatus;
use crate::domain::pots::award_pots;
use crate::domain::seed_derivation::derive_hand_seed;
use crate::domain::turn_order::{
    blind_seats, clockwise_from, first_actor_preflop, next_dealer, SeatingShape,
};
use crate::entities::poker_tables::TableStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::actions::NewAction;
use crate::repos::events::EventRecord;
use crate::repos::hands::{self, Hand, NewHand};
use crate::repos::seats::{self, Seat};
use crate::repos::tables::{self, PokerTable};
use crate::repos::pots;
use crate::services::sync;

fn draw(deck: &mut Vec<Card>) -> Result<Card, DomainError> {
    if deck.is_empty() {
        return Err(DomainError::data_corruption("deck ran out while dealing"));
    }
    Ok(deck.remove(0))
}

impl HandFlowService {
    /// Create the next hand in `dealing` for a table with enough eligible seats.
    ///
    /// First half of a hand start; [`HandFlowService::deal_hand`] finishes it in a
    /// separate transaction.
    pub async fn create_hand<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        table_id: i64,
        now: OffsetDateTime,
    ) -> Result<Hand, AppError> {
        let mut table = tables::require_table(conn, table_id).await?;
        if table.is_complete() {
            return Err(DomainError::conflict(
                ConflictKind::TableComplete,
                format!("table {table_id} is complete"),
            )
            .into());
        }
        let eligible: Vec<u8> = seats::find_all_by_table(conn, table_id)
            .await?
            .iter()
            .filter(|s| s.is_eligible())
            .map(|s| s.seat_index)
            .collect();
        if eligible.len() < 2 {
            return Err(DomainError::validation(
                ValidationKind::InvalidTableConfig,
                format!("table {table_id} needs two players with chips"),
            )
            .into());
        }
        let (hand, _) = self
            .create_hand_in(conn, &mut table, &eligible, now)
            .await?;
        Ok(hand)
    }

    pub(super) async fn create_hand_in<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        table: &mut PokerTable,
        eligible: &[u8],
        now: OffsetDateTime,
    ) -> Result<(Hand, EventRecord), DomainError> {
        if let Some(live) = hands::find_live_for_table(conn, table.id).await? {
            return Err(DomainError::conflict(
                ConflictKind::HandInProgress,
                format!("hand {} is still live at table {}", live.id, table.id),
            ));
        }

        let hand_no = hands::next_hand_no(conn, table.id).await?;
        let dealer_seat = next_dealer(table.dealer_seat, eligible)
            .ok_or_else(|| DomainError::data_corruption("no eligible dealer"))?;
        let shape = SeatingShape::for_players(eligible.len());
        let (small_blind_seat, big_blind_seat) = blind_seats(shape, dealer_seat, eligible)
            .ok_or_else(|| DomainError::data_corruption("cannot place blinds"))?;

        let hand = hands::create_hand(
            conn,
            NewHand {
                table_id: table.id,
                hand_no,
                dealer_seat,
                small_blind_seat,
                big_blind_seat,
                min_raise_increment: table.big_blind,
                deck: shuffled_deck(derive_hand_seed(table.rng_seed, hand_no)),
                created_at: now,
            },
        )
        .await?;

        let update = table
            .touch()
            .with_dealer_seat(dealer_seat)
            .with_status(TableStatus::Active);
        let event = sync::emit(
            conn,
            table,
            update,
            "hand_started",
            json!({
                "hand_id": hand.id,
                "hand_no": hand_no,
                "dealer_seat": dealer_seat,
                "small_blind_seat": small_blind_seat,
                "big_blind_seat": big_blind_seat,
            }),
        )
        .await?;
        info!(
            table_id = table.id,
            hand_id = hand.id,
            hand_no,
            dealer_seat,
            "hand created"
        );
        Ok((hand, event))
    }

    /// Deal hole cards, post antes and blinds and open preflop betting.
    pub async fn deal_hand<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        table_id: i64,
        now: OffsetDateTime,
    ) -> Result<Hand, AppError> {
        let mut ctx = HandContext::load(conn, table_id).await?.ok_or_else(|| {
            DomainError::validation(
                ValidationKind::NoActiveHand,
                format!("no hand to deal at table {table_id}"),
            )
        })?;
        self.deal_loaded(conn, &FlowEnv::at(now), &mut ctx).await?;
        Ok(ctx.hand)
    }

    pub(super) async fn deal_loaded<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
    ) -> Result<Vec<EventRecord>, DomainError> {
        if ctx.hand.phase != HandPhase::Dealing {
            return Err(DomainError::invalid_transition(
                ctx.hand.phase,
                HandPhase::Preflop,
            ));
        }

        let dealt: Vec<u8> = ctx
            .seats
            .iter()
            .filter(|s| s.is_eligible())
            .map(|s| s.seat_index)
            .collect();
        let order = clockwise_from(dealt.iter().copied(), ctx.hand.dealer_seat);

        let mut holes: Vec<(u8, Vec<Card>)> = order.iter().map(|s| (*s, Vec::new())).collect();
        for _ in 0..2 {
            for (_, cards) in holes.iter_mut() {
                cards.push(draw(&mut ctx.hand.deck)?);
            }
        }
        for (seat_index, cards) in holes {
            let seat = ctx.seat_mut(seat_index)?;
            seat.reset_hand_state();
            seat.hole_cards = Some([cards[0], cards[1]]);
            seat.status = PlayerStatus::Waiting;
        }

        let (ante, small_blind, big_blind) =
            (ctx.table.ante, ctx.table.small_blind, ctx.table.big_blind);
        if ante > 0 {
            for seat_index in &order {
                self.post_forced(conn, env, ctx, *seat_index, ActionKind::PostAnte, ante)
                    .await?;
            }
        }
        let (sb, bb) = (ctx.hand.small_blind_seat, ctx.hand.big_blind_seat);
        if order.contains(&sb) {
            self.post_forced(conn, env, ctx, sb, ActionKind::PostSmallBlind, small_blind)
                .await?;
        }
        if order.contains(&bb) {
            self.post_forced(conn, env, ctx, bb, ActionKind::PostBigBlind, big_blind)
                .await?;
        }

        ctx.hand.current_bet = ctx.views().iter().map(|s| s.bet).max().unwrap_or(0);
        ctx.hand.min_raise_increment = big_blind;
        ctx.hand.phase = ctx.hand.phase.transition(HandPhase::Preflop)?;
        let actor = first_actor_preflop(
            ctx.shape(),
            ctx.hand.dealer_seat,
            bb,
            ctx.hand.current_bet,
            &ctx.views(),
        );
        ctx.set_actor(actor, env.now);

        let data = json!({
            "hand_id": ctx.hand.id,
            "dealt_in": order,
            "current_bet": ctx.hand.current_bet,
            "next_actor": actor,
        });
        let mut events = vec![ctx.emit(conn, "hand_dealt", data).await?];
        info!(
            table_id = ctx.table.id,
            hand_id = ctx.hand.id,
            players = order.len(),
            "hand dealt"
        );

        if actor.is_none() {
            events.extend(self.close_round(conn, env, ctx).await?);
        }
        Ok(events)
    }

    /// Post an ante or blind, capped at the stack.
    ///
    /// Antes are dead money: they go to the pot without counting as a street bet or
    /// a seat contribution.
    async fn post_forced<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
        seat_index: u8,
        kind: ActionKind,
        amount: i64,
    ) -> Result<(), DomainError> {
        let phase = ctx.hand.phase;
        let seat = ctx.seat_mut(seat_index)?;
        let posted = amount.min(seat.stack);
        if posted <= 0 {
            return Ok(());
        }
        seat.stack -= posted;
        if kind != ActionKind::PostAnte {
            seat.current_bet += posted;
            seat.total_contributed += posted;
        }
        if seat.stack == 0 {
            seat.status = PlayerStatus::AllIn;
        }
        let street_total = seat.current_bet;
        ctx.hand.pot += posted;

        ctx.record(
            conn,
            NewAction {
                seat_index,
                kind,
                amount: if kind == ActionKind::PostAnte { posted } else { street_total },
                chips_added: posted,
                phase,
            },
            env.now,
        )
        .await?;
        Ok(())
    }

    /// Everyone else folded: the last seat in the hand takes every layer.
    pub(super) async fn award_uncontested<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
    ) -> Result<Vec<EventRecord>, DomainError> {
        let layers = ctx.pot_layers();
        let in_hand: BTreeSet<u8> = ctx
            .dealt_in()
            .filter(|s| s.status.is_in_hand())
            .map(|s| s.seat_index)
            .collect();
        let awards = award_pots(&layers, ctx.hand.dealer_seat, |eligible| {
            eligible.intersection(&in_hand).copied().collect()
        });

        for (seat_index, amount) in &awards {
            ctx.seat_mut(*seat_index)?.stack += amount;
            ctx.hand.pot -= amount;
        }
        pots::replace_for_hand(conn, ctx.hand.id, &layers).await?;
        info!(
            table_id = ctx.table.id,
            hand_id = ctx.hand.id,
            ?awards,
            "uncontested pot awarded"
        );

        let data = json!({
            "hand_id": ctx.hand.id,
            "awards": awards
                .iter()
                .map(|(seat, amount)| json!({ "seat": seat, "amount": amount }))
                .collect::<Vec<_>>(),
        });
        let mut events = vec![ctx.emit(conn, "pot_awarded", data).await?];
        events.extend(self.complete_hand(conn, env, ctx).await?);
        Ok(events)
    }

    /// Close the hand: clear per-hand seat state and eliminate busted seats.
    pub(super) async fn complete_hand<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
    ) -> Result<Vec<EventRecord>, DomainError> {
        ctx.hand.phase = ctx.hand.phase.transition(HandPhase::Complete)?;
        ctx.hand.completed_at = Some(env.now);
        ctx.hand.current_bet = 0;
        ctx.set_actor(None, env.now);

        let mut eliminated = Vec::new();
        for seat in ctx.dealt_in_mut() {
            seat.reset_hand_state();
            seat.status = if seat.stack == 0 {
                eliminated.push(seat.seat_index);
                PlayerStatus::Eliminated
            } else if seat.status == PlayerStatus::SittingOut {
                PlayerStatus::SittingOut
            } else {
                PlayerStatus::Waiting
            };
        }

        let stacks: Vec<_> = ctx
            .seats
            .iter()
            .map(|s| json!({ "seat": s.seat_index, "stack": s.stack }))
            .collect();
        let data = json!({
            "hand_id": ctx.hand.id,
            "hand_no": ctx.hand.hand_no,
            "stacks": stacks,
            "eliminated": eliminated,
        });
        let event = ctx.emit(conn, "hand_completed", data).await?;
        info!(
            table_id = ctx.table.id,
            hand_id = ctx.hand.id,
            eliminated = eliminated.len(),
            "hand complete"
        );
        Ok(vec![event])
    }

    /// One seat holds every chip still in play: record the winner and close the table.
    pub(super) async fn finish_table<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        table: &mut PokerTable,
        winner: &Seat,
    ) -> Result<EventRecord, DomainError> {
        let update = table
            .touch()
            .with_winner_seat(winner.seat_index)
            .with_status(TableStatus::Complete);
        let event = sync::emit(
            conn,
            table,
            update,
            "table_completed",
            json!({
                "winner_seat": winner.seat_index,
                "player_id": winner.player_id,
                "stack": winner.stack,
            }),
        )
        .await?;
        info!(
            table_id = table.id,
            winner_seat = winner.seat_index,
            "table complete"
        );
        Ok(event)
    }
}
