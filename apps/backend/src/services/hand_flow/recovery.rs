//! The advancement steps. Each reads its precondition from persisted state and
//! either does nothing, waits on a clock, or moves the table forward.

use std::collections::BTreeMap;

use sea_orm::ConnectionTrait;
use serde_json::json;
use tracing::{info, warn};

use super::context::HandContext;
use super::{FlowEnv, HandFlowService, StepOutcome};
use crate::domain::actions::ActionKind;
use crate::domain::hand_phase::HandPhase;
use crate::domain::player_status::PlayerStatus;
use crate::domain::turn_order::{find_next_actor, needs_to_act};
use crate::entities::poker_tables::TableStatus;
use crate::errors::domain::DomainError;
use crate::repos::{actions, hands, pots, seats, tables};
use crate::services::sync;

impl HandFlowService {
    /// Remove a hand stuck in `dealing` past the setup threshold and refund its chips.
    pub(super) async fn cleanup_stale_setup<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        table_id: i64,
    ) -> Result<StepOutcome, DomainError> {
        let Some(mut ctx) = HandContext::load(conn, table_id).await? else {
            return Ok(StepOutcome::unchanged());
        };
        if ctx.hand.phase != HandPhase::Dealing
            || env
                .remaining(ctx.hand.created_at, env.engine.stale_setup_threshold)
                .is_some()
        {
            return Ok(StepOutcome::unchanged());
        }

        let mut refunds: BTreeMap<u8, i64> = BTreeMap::new();
        for action in actions::find_all_by_hand(conn, ctx.hand.id).await? {
            *refunds.entry(action.seat_index).or_default() += action.chips_added;
        }
        for seat in ctx.seats.iter_mut() {
            if let Some(refund) = refunds.get(&seat.seat_index) {
                seat.stack += refund;
            }
            if seat.is_dealt_in() || refunds.contains_key(&seat.seat_index) {
                seat.reset_hand_state();
                if !matches!(
                    seat.status,
                    PlayerStatus::SittingOut | PlayerStatus::Eliminated
                ) {
                    seat.status = PlayerStatus::Waiting;
                }
            }
        }
        ctx.persist_seats(conn).await?;

        actions::delete_by_hand(conn, ctx.hand.id).await?;
        pots::delete_by_hand(conn, ctx.hand.id).await?;
        hands::delete_hand(conn, &ctx.hand).await?;

        let previous_dealer = hands::find_latest_for_table(conn, table_id)
            .await?
            .map(|h| h.dealer_seat);
        let update = ctx.table.touch().with_dealer_seat_opt(previous_dealer);
        let event = sync::emit(
            conn,
            &mut ctx.table,
            update,
            "hand_aborted",
            json!({
                "hand_id": ctx.hand.id,
                "hand_no": ctx.hand.hand_no,
                "refunds": refunds,
            }),
        )
        .await?;
        warn!(
            table_id,
            hand_id = ctx.hand.id,
            refunded = refunds.len(),
            "stale hand setup removed"
        );
        Ok(StepOutcome::changed(vec![event]))
    }

    /// Fold the actor once the turn clock has run out.
    pub(super) async fn expire_turn<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        table_id: i64,
    ) -> Result<StepOutcome, DomainError> {
        let Some(mut ctx) = HandContext::load(conn, table_id).await? else {
            return Ok(StepOutcome::unchanged());
        };
        if !ctx.hand.phase.is_betting_street() {
            return Ok(StepOutcome::unchanged());
        }
        let (Some(actor), Some(deadline)) = (ctx.hand.current_actor, ctx.hand.action_deadline)
        else {
            return Ok(StepOutcome::unchanged());
        };
        if env.now < deadline {
            return Ok(StepOutcome::wait((deadline - env.now).unsigned_abs()));
        }
        let current_bet = ctx.hand.current_bet;
        let can_still_act = ctx
            .views()
            .iter()
            .any(|s| s.seat == actor && needs_to_act(s, current_bet));
        if !can_still_act {
            return Ok(StepOutcome::unchanged());
        }

        info!(table_id, hand_id = ctx.hand.id, seat = actor, "turn expired, folding");
        let (_, events) = self
            .act(conn, env, &mut ctx, actor, ActionKind::Fold, None, true)
            .await?;
        Ok(StepOutcome::changed(events))
    }

    /// Put a live hand back on its rails: deal, close a finished round, fix the
    /// actor, run out a showdown or award an uncontested pot.
    pub(super) async fn heal_actor<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        table_id: i64,
    ) -> Result<StepOutcome, DomainError> {
        let Some(mut ctx) = HandContext::load(conn, table_id).await? else {
            return Ok(StepOutcome::unchanged());
        };

        match ctx.hand.phase {
            HandPhase::Dealing => {
                let events = self.deal_loaded(conn, env, &mut ctx).await?;
                Ok(StepOutcome::changed(events))
            }
            HandPhase::Preflop | HandPhase::Flop | HandPhase::Turn | HandPhase::River => {
                let current_bet = ctx.hand.current_bet;
                let views = ctx.views();
                if find_next_actor(current_bet, &views, ctx.hand.dealer_seat).is_none() {
                    let events = self.close_round(conn, env, &mut ctx).await?;
                    return Ok(StepOutcome::changed(events));
                }

                let actor_ok = ctx.hand.current_actor.is_some_and(|actor| {
                    views
                        .iter()
                        .any(|s| s.seat == actor && needs_to_act(s, current_bet))
                });
                if actor_ok {
                    return Ok(StepOutcome::unchanged());
                }

                // With no actor on record, scan from the street's opening position.
                let from = ctx.hand.current_actor.unwrap_or(match ctx.hand.phase {
                    HandPhase::Preflop => ctx.hand.big_blind_seat,
                    _ => ctx.hand.dealer_seat,
                });
                let healed = find_next_actor(current_bet, &views, from);
                warn!(
                    table_id,
                    hand_id = ctx.hand.id,
                    stale = ?ctx.hand.current_actor,
                    healed = ?healed,
                    "actor reassigned"
                );
                ctx.set_actor(healed, env.now);
                let data = json!({ "hand_id": ctx.hand.id, "next_actor": healed });
                let event = ctx.emit(conn, "actor_healed", data).await?;
                Ok(StepOutcome::changed(vec![event]))
            }
            HandPhase::Showdown if !ctx.hand.is_resolved() => {
                self.progress_showdown(conn, env, &mut ctx).await
            }
            HandPhase::Awarding => {
                let events = self.award_uncontested(conn, env, &mut ctx).await?;
                Ok(StepOutcome::changed(events).wake_after(env.engine.inter_hand_delay))
            }
            _ => Ok(StepOutcome::unchanged()),
        }
    }

    /// Complete a resolved showdown once its display time is over.
    pub(super) async fn complete_stale_showdown<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        table_id: i64,
    ) -> Result<StepOutcome, DomainError> {
        let Some(mut ctx) = HandContext::load(conn, table_id).await? else {
            return Ok(StepOutcome::unchanged());
        };
        let Some(started) = ctx.hand.showdown_started_at else {
            return Ok(StepOutcome::unchanged());
        };
        if ctx.hand.phase != HandPhase::Showdown {
            return Ok(StepOutcome::unchanged());
        }
        if let Some(left) = env.remaining(started, env.engine.showdown_display) {
            return Ok(StepOutcome::wait(left));
        }
        let events = self.complete_hand(conn, env, &mut ctx).await?;
        Ok(StepOutcome::changed(events).wake_after(env.engine.inter_hand_delay))
    }

    /// With no live hand: start the next one, or end the table when one seat is left.
    pub(super) async fn start_or_finish_table<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        table_id: i64,
    ) -> Result<StepOutcome, DomainError> {
        let mut table = tables::require_table(conn, table_id).await?;
        if table.is_complete() || hands::find_live_for_table(conn, table_id).await?.is_some() {
            return Ok(StepOutcome::unchanged());
        }
        if let Some(completed_at) = hands::find_latest_for_table(conn, table_id)
            .await?
            .and_then(|h| h.completed_at)
        {
            if let Some(left) = env.remaining(completed_at, env.engine.inter_hand_delay) {
                return Ok(StepOutcome::wait(left));
            }
        }

        let all_seats = seats::find_all_by_table(conn, table_id).await?;
        let eligible: Vec<u8> = all_seats
            .iter()
            .filter(|s| s.is_eligible())
            .map(|s| s.seat_index)
            .collect();
        if eligible.len() >= 2 {
            let (_, event) = self
                .create_hand_in(conn, &mut table, &eligible, env.now)
                .await?;
            return Ok(StepOutcome::changed(vec![event]));
        }

        let contenders: Vec<_> = all_seats
            .iter()
            .filter(|s| s.stack > 0 && s.status != PlayerStatus::Eliminated)
            .collect();
        match contenders.as_slice() {
            [winner] if table.status == TableStatus::Active => {
                let event = self.finish_table(conn, &mut table, winner).await?;
                Ok(StepOutcome::changed(vec![event]))
            }
            _ => Ok(StepOutcome::unchanged()),
        }
    }
}
