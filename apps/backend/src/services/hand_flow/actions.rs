//! Player action submission.

use sea_orm::ConnectionTrait;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::context::HandContext;
use super::{publish, FlowEnv, HandFlowService};
use crate::db::txn::with_txn;
use crate::domain::actions::ActionKind;
use crate::domain::betting::{validate_action, BettingInput};
use crate::domain::hand_phase::HandPhase;
use crate::domain::player_status::status_after_action;
use crate::domain::turn_order::find_next_actor;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::actions::{ActionRecord, NewAction};
use crate::repos::events::EventRecord;
use crate::repos::hands::{self, Hand};
use crate::repos::seats::{self, Seat};
use crate::repos::tables;
use crate::state::app_state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAction {
    pub table_id: i64,
    pub player_id: i64,
    pub action: ActionKind,
    /// Absolute street total for bets and raises.
    pub amount: Option<i64>,
    /// Table version the client acted on; `None` skips the check.
    pub expected_version: Option<i32>,
}

/// Result of an accepted action, after the engine has advanced the table.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub action: ActionRecord,
    pub hand: Hand,
    pub seats: Vec<Seat>,
    pub next_actor: Option<u8>,
    pub phase_changed: bool,
    pub hand_complete: bool,
    pub table_version: i32,
}

struct Applied {
    hand_id: i64,
    phase_before: HandPhase,
    record: ActionRecord,
    events: Vec<EventRecord>,
}

fn no_active_hand(table_id: i64) -> DomainError {
    DomainError::validation(
        ValidationKind::NoActiveHand,
        format!("no betting in progress at table {table_id}"),
    )
}

impl HandFlowService {
    pub async fn submit_action(
        &self,
        state: &AppState,
        cmd: SubmitAction,
    ) -> Result<ActionOutcome, AppError> {
        self.submit_action_at(state, cmd, OffsetDateTime::now_utc())
            .await
    }

    /// Validate and apply one action atomically, then advance the table.
    pub async fn submit_action_at(
        &self,
        state: &AppState,
        cmd: SubmitAction,
        now: OffsetDateTime,
    ) -> Result<ActionOutcome, AppError> {
        let table_id = cmd.table_id;
        let env = FlowEnv::new(state, now);
        let svc = *self;
        let applied = with_txn(state, move |txn| {
            Box::pin(async move { svc.apply_player_action(txn, &env, &cmd).await })
        })
        .await?;
        publish(state, table_id, &applied.events).await;

        if let Err(err) = self.advance_at(state, table_id, now).await {
            warn!(table_id, error = %err, "advance after action failed");
        }

        let conn = state.db();
        let hand = hands::require_hand(conn, applied.hand_id).await?;
        let seats = seats::find_all_by_table(conn, table_id).await?;
        let table = tables::require_table(conn, table_id).await?;
        Ok(ActionOutcome {
            action: applied.record,
            next_actor: hand.current_actor,
            phase_changed: hand.phase != applied.phase_before,
            hand_complete: hand.phase == HandPhase::Complete,
            table_version: table.version,
            hand,
            seats,
        })
    }

    async fn apply_player_action<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        cmd: &SubmitAction,
    ) -> Result<Applied, AppError> {
        let table = tables::require_table(conn, cmd.table_id).await?;
        if let Some(expected) = cmd.expected_version {
            if expected != table.version {
                return Err(DomainError::conflict(
                    ConflictKind::OptimisticLock,
                    format!(
                        "table {} is at version {}, action was built on {expected}",
                        table.id, table.version
                    ),
                )
                .into());
            }
        }

        let mut ctx = HandContext::load(conn, cmd.table_id)
            .await?
            .ok_or_else(|| no_active_hand(cmd.table_id))?;
        if !ctx.hand.phase.is_betting_street() {
            return Err(no_active_hand(cmd.table_id).into());
        }

        let seat = seats::require_by_player(conn, cmd.table_id, cmd.player_id).await?;
        if ctx.hand.current_actor != Some(seat.seat_index) {
            return Err(DomainError::validation(
                ValidationKind::NotYourTurn,
                format!(
                    "seat {} acted but the turn belongs to {:?}",
                    seat.seat_index, ctx.hand.current_actor
                ),
            )
            .into());
        }
        if let Some(deadline) = ctx.hand.action_deadline {
            if env.now >= deadline {
                return Err(DomainError::validation(
                    ValidationKind::TurnExpired,
                    format!("turn for seat {} expired", seat.seat_index),
                )
                .into());
            }
        }

        let phase_before = ctx.hand.phase;
        let (record, events) = self
            .act(conn, env, &mut ctx, seat.seat_index, cmd.action, cmd.amount, false)
            .await?;
        Ok(Applied {
            hand_id: ctx.hand.id,
            phase_before,
            record,
            events,
        })
    }

    /// Apply a validated action for `seat_index` and move the turn on.
    ///
    /// `forced` marks engine-initiated folds (turn timeouts); it does not change
    /// validation, only what the event says.
    #[allow(clippy::too_many_arguments)]
    pub(super) async fn act<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        env: &FlowEnv,
        ctx: &mut HandContext,
        seat_index: u8,
        declared: ActionKind,
        amount: Option<i64>,
        forced: bool,
    ) -> Result<(ActionRecord, Vec<EventRecord>), DomainError> {
        let phase = ctx.hand.phase;
        let current_bet = ctx.hand.current_bet;
        let min_raise_increment = ctx.hand.min_raise_increment;
        let big_blind = ctx.table.big_blind;

        let seat = ctx.seat_mut(seat_index)?;
        let input = BettingInput {
            status: seat.status,
            current_bet,
            player_bet: seat.current_bet,
            stack: seat.stack,
            min_raise_increment,
            big_blind,
        };
        let validated = validate_action(&input, declared, amount)?;

        seat.stack -= validated.chips_added;
        seat.current_bet = validated.target;
        seat.total_contributed += validated.chips_added;
        seat.status = status_after_action(seat.status, validated.kind, seat.stack);
        ctx.hand.pot += validated.chips_added;
        ctx.hand.current_bet = validated.new_current_bet;
        ctx.hand.min_raise_increment = validated.new_min_raise_increment;

        let record = ctx
            .record(
                conn,
                NewAction {
                    seat_index,
                    kind: validated.kind,
                    amount: validated.target,
                    chips_added: validated.chips_added,
                    phase,
                },
                env.now,
            )
            .await?;
        info!(
            table_id = ctx.table.id,
            hand_id = ctx.hand.id,
            seat = seat_index,
            phase = %phase,
            kind = %validated.kind,
            amount = validated.target,
            forced,
            "action applied"
        );

        let next = find_next_actor(ctx.hand.current_bet, &ctx.views(), seat_index);
        ctx.set_actor(next, env.now);
        let data = json!({
            "hand_id": ctx.hand.id,
            "seq": record.seq,
            "seat": seat_index,
            "kind": validated.kind,
            "amount": validated.target,
            "chips_added": validated.chips_added,
            "all_in": validated.all_in,
            "forced": forced,
            "next_actor": next,
        });
        let mut events = vec![ctx.emit(conn, "action", data).await?];

        if next.is_none() {
            events.extend(self.close_round(conn, env, ctx).await?);
        }
        Ok((record, events))
    }
}
