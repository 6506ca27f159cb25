//! Showdown pacing: street-by-street run-out, evaluation and the display hold.

use sea_orm::ConnectionTrait;
use serde_json::json;
use tracing::{debug, info};

use super::context::HandContext;
use super::{FlowEnv, HandFlowService, StepOutcome};
use crate::domain::cards::Card;
use crate::domain::showdown::{deal_street, next_street_target, resolve_showdown, run_out_board};
use crate::errors::domain::DomainError;
use crate::repos::events::EventRecord;
use crate::repos::{pots, showdown};

impl HandFlowService {
    /// Move an unresolved showdown one step: deal, wait, or evaluate.
    ///
    /// With a zero run-out delay the whole board is dealt and resolved in one go.
    pub(super) async fn progress_showdown<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
    ) -> Result<StepOutcome, DomainError> {
        let delay = env.engine.runout_street_delay;
        let mut events = Vec::new();

        if ctx.hand.community.len() < 5 {
            if delay.is_zero() {
                run_out_board(&mut ctx.hand.community, &mut ctx.hand.deck)?;
                ctx.hand.last_runout_at = Some(env.now);
                let data = json!({ "hand_id": ctx.hand.id, "community": ctx.hand.community });
                events.push(ctx.emit(conn, "board_run_out", data).await?);
            } else {
                if let Some(left) = ctx
                    .hand
                    .last_runout_at
                    .and_then(|last| env.remaining(last, delay))
                {
                    return Ok(StepOutcome::wait(left));
                }
                let target = next_street_target(ctx.hand.community.len());
                deal_street(&mut ctx.hand.community, &mut ctx.hand.deck, target)?;
                ctx.hand.last_runout_at = Some(env.now);
                let data = json!({
                    "hand_id": ctx.hand.id,
                    "community": ctx.hand.community,
                    "runout": true,
                });
                let event = ctx.emit(conn, "street_dealt", data).await?;
                debug!(
                    table_id = ctx.table.id,
                    hand_id = ctx.hand.id,
                    board = ctx.hand.community.len(),
                    "run-out street dealt"
                );
                return Ok(StepOutcome::changed(vec![event]).wake_after(delay));
            }
        } else if !delay.is_zero() {
            if let Some(left) = ctx
                .hand
                .last_runout_at
                .and_then(|last| env.remaining(last, delay))
            {
                return Ok(StepOutcome::wait(left));
            }
        }

        events.extend(self.resolve(conn, env, ctx).await?);
        Ok(StepOutcome::changed(events).wake_after(env.engine.showdown_display))
    }

    /// Evaluate every hand still in, award each layer and start the display hold.
    async fn resolve<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
    ) -> Result<Vec<EventRecord>, DomainError> {
        let layers = ctx.pot_layers();
        let contenders: Vec<(u8, [Card; 2])> = ctx
            .dealt_in()
            .filter(|s| s.status.is_in_hand())
            .filter_map(|s| s.hole_cards.map(|hole| (s.seat_index, hole)))
            .collect();
        let outcome = resolve_showdown(
            env.evaluator.as_ref(),
            &ctx.hand.community,
            &contenders,
            &layers,
            ctx.hand.dealer_seat,
        )?;

        for (seat_index, amount) in &outcome.awards {
            ctx.seat_mut(*seat_index)?.stack += amount;
            ctx.hand.pot -= amount;
        }
        pots::replace_for_hand(conn, ctx.hand.id, &layers).await?;

        let mut winners = Vec::new();
        for seat_index in outcome.winning_seats() {
            let amount = outcome.awards.get(&seat_index).copied().unwrap_or(0);
            let Some(solved) = outcome.solved.get(&seat_index) else {
                continue;
            };
            winners.push(showdown::insert_winner(conn, ctx.hand.id, seat_index, solved, amount).await?);
        }
        ctx.hand.showdown_started_at = Some(env.now);

        let revealed: Vec<_> = contenders
            .iter()
            .map(|(seat, hole)| {
                json!({
                    "seat": seat,
                    "hole_cards": hole,
                    "hand": outcome.solved.get(seat),
                })
            })
            .collect();
        let data = json!({
            "hand_id": ctx.hand.id,
            "community": ctx.hand.community,
            "hands": revealed,
            "winners": winners,
        });
        let event = ctx.emit(conn, "showdown", data).await?;
        info!(
            table_id = ctx.table.id,
            hand_id = ctx.hand.id,
            winners = winners.len(),
            layers = layers.len(),
            "showdown resolved"
        );
        Ok(vec![event])
    }
}
