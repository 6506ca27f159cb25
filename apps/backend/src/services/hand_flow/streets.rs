//! Closing a betting round: uncalled chips, next street, showdown or awarding.

use sea_orm::ConnectionTrait;
use serde_json::json;
use tracing::{debug, info};

use super::context::HandContext;
use super::{FlowEnv, HandFlowService};
use crate::domain::actions::ActionKind;
use crate::domain::hand_phase::{phase_after_betting, HandPhase};
use crate::domain::player_status::PlayerStatus;
use crate::domain::pots::uncalled_excess;
use crate::domain::showdown::deal_street;
use crate::domain::turn_order::first_actor_postflop;
use crate::errors::domain::DomainError;
use crate::repos::actions::NewAction;
use crate::repos::events::EventRecord;
use crate::repos::pots;

impl HandFlowService {
    /// Close the current betting round and move the hand on.
    ///
    /// Loops when a freshly dealt street has nobody left to act.
    pub(super) async fn close_round<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
    ) -> Result<Vec<EventRecord>, DomainError> {
        let mut events = Vec::new();
        loop {
            self.return_uncalled(conn, env, ctx).await?;
            ctx.hand.current_bet = ctx.views().iter().map(|s| s.bet).max().unwrap_or(0);

            let from = ctx.hand.phase;
            let next = phase_after_betting(from, &ctx.views(), ctx.hand.current_bet);
            pots::replace_for_hand(conn, ctx.hand.id, &ctx.pot_layers()).await?;

            match next {
                HandPhase::Showdown | HandPhase::Awarding => {
                    self.end_betting(ctx, env, next)?;
                    info!(
                        table_id = ctx.table.id,
                        hand_id = ctx.hand.id,
                        from = %from,
                        to = %next,
                        "betting closed"
                    );
                    let data = json!({ "hand_id": ctx.hand.id, "from": from, "to": next });
                    let event = ctx.emit(conn, "phase_changed", data).await?;
                    events.push(event);
                    return Ok(events);
                }
                street => {
                    self.start_street(ctx, env, street)?;
                    let data = json!({
                        "hand_id": ctx.hand.id,
                        "from": from,
                        "to": street,
                        "community": ctx.hand.community,
                        "next_actor": ctx.hand.current_actor,
                    });
                    let event = ctx.emit(conn, "street_dealt", data).await?;
                    events.push(event);
                    if ctx.hand.current_actor.is_some() {
                        return Ok(events);
                    }
                    debug!(
                        table_id = ctx.table.id,
                        hand_id = ctx.hand.id,
                        phase = %street,
                        "no actor on new street, closing again"
                    );
                }
            }
        }
    }

    /// Give back whatever the top contributor put in that nobody matched.
    async fn return_uncalled<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
    ) -> Result<(), DomainError> {
        let Some((seat_index, excess)) = uncalled_excess(&ctx.contributions()) else {
            return Ok(());
        };
        let phase = ctx.hand.phase;
        let seat = ctx.seat_mut(seat_index)?;
        seat.stack += excess;
        seat.current_bet -= excess;
        seat.total_contributed -= excess;
        if seat.status == PlayerStatus::AllIn {
            seat.status = PlayerStatus::Acted;
        }
        let street_total = seat.current_bet;
        ctx.hand.pot -= excess;

        ctx.record(
            conn,
            NewAction {
                seat_index,
                kind: ActionKind::UncalledReturn,
                amount: street_total,
                chips_added: -excess,
                phase,
            },
            env.now,
        )
        .await?;
        debug!(
            table_id = ctx.table.id,
            hand_id = ctx.hand.id,
            seat = seat_index,
            excess,
            "uncalled chips returned"
        );
        Ok(())
    }

    /// Deal the next street and reset the round.
    pub(super) fn start_street(
        &self,
        ctx: &mut HandContext,
        env: &FlowEnv,
        street: HandPhase,
    ) -> Result<(), DomainError> {
        ctx.hand.phase = ctx.hand.phase.transition(street)?;
        deal_street(
            &mut ctx.hand.community,
            &mut ctx.hand.deck,
            street.community_target(),
        )?;
        for seat in ctx.dealt_in_mut() {
            seat.current_bet = 0;
            seat.status = seat.status.reset_for_new_round();
        }
        ctx.hand.current_bet = 0;
        ctx.hand.min_raise_increment = ctx.table.big_blind;

        let actor = first_actor_postflop(
            ctx.shape(),
            ctx.hand.dealer_seat,
            ctx.hand.big_blind_seat,
            &ctx.views(),
        );
        ctx.set_actor(actor, env.now);
        Ok(())
    }

    /// Enter showdown or awarding; street bets are folded into the pot totals.
    fn end_betting(
        &self,
        ctx: &mut HandContext,
        env: &FlowEnv,
        next: HandPhase,
    ) -> Result<(), DomainError> {
        ctx.hand.phase = ctx.hand.phase.transition(next)?;
        ctx.set_actor(None, env.now);
        ctx.hand.current_bet = 0;
        for seat in ctx.dealt_in_mut() {
            seat.current_bet = 0;
        }
        // A board that still needs cards is run out later, paced from now.
        ctx.hand.last_runout_at = (next == HandPhase::Showdown && ctx.hand.community.len() < 5)
            .then_some(env.now);
        Ok(())
    }
}
