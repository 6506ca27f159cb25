//! Idempotent advancement: run every step until a full pass changes nothing.

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{publish, FlowEnv, HandFlowService, StepOutcome};
use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::state::app_state::AppState;

/// Passes before `advance` gives up on reaching a fixed point.
const MAX_ITERATIONS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    CleanupStaleSetup,
    ExpireTurn,
    HealActor,
    CompleteStaleShowdown,
    StartOrFinishTable,
}

impl Step {
    const ORDER: [Step; 5] = [
        Step::CleanupStaleSetup,
        Step::ExpireTurn,
        Step::HealActor,
        Step::CompleteStaleShowdown,
        Step::StartOrFinishTable,
    ];

    fn name(self) -> &'static str {
        match self {
            Step::CleanupStaleSetup => "cleanup_stale_setup",
            Step::ExpireTurn => "expire_turn",
            Step::HealActor => "heal_actor",
            Step::CompleteStaleShowdown => "complete_stale_showdown",
            Step::StartOrFinishTable => "start_or_finish_table",
        }
    }
}

/// What one `advance` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvanceReport {
    pub iterations: usize,
    /// Steps that changed something, in the order they ran.
    pub steps: Vec<&'static str>,
    pub events: usize,
    /// A full pass ran without changes.
    pub settled: bool,
    /// The table is waiting on a clock; a wake was requested this far out.
    pub wake_after_ms: Option<u64>,
}

impl AdvanceReport {
    pub fn changed(&self) -> bool {
        !self.steps.is_empty()
    }
}

impl HandFlowService {
    pub async fn advance(&self, state: &AppState, table_id: i64) -> Result<AdvanceReport, AppError> {
        self.advance_at(state, table_id, OffsetDateTime::now_utc())
            .await
    }

    /// Drive the table as far as `now` allows.
    ///
    /// Calling it again with nothing due is a no-op. A version conflict from a
    /// concurrent writer restarts the pass from fresh state.
    pub async fn advance_at(
        &self,
        state: &AppState,
        table_id: i64,
        now: OffsetDateTime,
    ) -> Result<AdvanceReport, AppError> {
        let mut report = AdvanceReport::default();
        let mut wake: Option<Duration> = None;

        'passes: while report.iterations < MAX_ITERATIONS {
            report.iterations += 1;
            let mut pass_wake: Option<Duration> = None;
            for step in Step::ORDER {
                let outcome = match self.run_step(state, table_id, step, now).await {
                    Ok(outcome) => outcome,
                    Err(err) if err.is_version_conflict() => {
                        debug!(table_id, step = step.name(), "version conflict, restarting pass");
                        continue 'passes;
                    }
                    Err(err) => return Err(err),
                };
                if let Some(delay) = outcome.wake_after {
                    pass_wake = Some(pass_wake.map_or(delay, |w| w.min(delay)));
                }
                if outcome.changed {
                    publish(state, table_id, &outcome.events).await;
                    report.steps.push(step.name());
                    report.events += outcome.events.len();
                    continue 'passes;
                }
            }
            report.settled = true;
            wake = pass_wake;
            break;
        }

        if !report.settled {
            warn!(
                table_id,
                iterations = report.iterations,
                steps = ?report.steps,
                "advance hit the iteration guard"
            );
        }
        if let Some(delay) = wake {
            report.wake_after_ms = Some(delay.as_millis() as u64);
            state.scheduler.schedule(state, table_id, delay);
        }
        debug!(
            table_id,
            iterations = report.iterations,
            events = report.events,
            "advance finished"
        );
        Ok(report)
    }

    async fn run_step(
        &self,
        state: &AppState,
        table_id: i64,
        step: Step,
        now: OffsetDateTime,
    ) -> Result<StepOutcome, AppError> {
        let svc = *self;
        let env = FlowEnv::new(state, now);
        with_txn(state, move |txn| {
            Box::pin(async move {
                let outcome = match step {
                    Step::CleanupStaleSetup => svc.cleanup_stale_setup(txn, &env, table_id).await,
                    Step::ExpireTurn => svc.expire_turn(txn, &env, table_id).await,
                    Step::HealActor => svc.heal_actor(txn, &env, table_id).await,
                    Step::CompleteStaleShowdown => {
                        svc.complete_stale_showdown(txn, &env, table_id).await
                    }
                    Step::StartOrFinishTable => {
                        svc.start_or_finish_table(txn, &env, table_id).await
                    }
                };
                Ok(outcome?)
            })
        })
        .await
    }
}
