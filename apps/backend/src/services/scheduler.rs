//! Advisory wake-ups for paced transitions (showdown display, inter-hand gap,
//! runout streets). Correctness never depends on a wake firing: every transition is
//! also reachable from `advance` and the sweep.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::services::hand_flow::HandFlowService;
use crate::state::app_state::AppState;

pub struct AdvanceScheduler {
    /// Earliest pending wake per table.
    pending: DashMap<i64, Instant>,
    shutdown: CancellationToken,
}

impl AdvanceScheduler {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, table_id: i64) -> bool {
        self.pending.contains_key(&table_id)
    }

    /// Stop every pending wake; later `schedule` calls become no-ops.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.pending.clear();
    }

    /// Ask for `advance(table_id)` after `delay`. A wake already due no later is kept
    /// and the new request dropped.
    pub fn schedule(&self, state: &AppState, table_id: i64, delay: Duration) {
        if !state.engine.scheduler_enabled || self.shutdown.is_cancelled() {
            return;
        }

        let due = Instant::now() + delay;
        match self.pending.get(&table_id) {
            Some(existing) if *existing <= due => return,
            _ => {}
        }
        self.pending.insert(table_id, due);
        debug!(table_id, delay_ms = delay.as_millis() as u64, "advance scheduled");

        let state = state.clone();
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep_until(due) => {
                    state
                        .scheduler
                        .pending
                        .remove_if(&table_id, |_, pending_due| *pending_due == due);
                    if let Err(err) = HandFlowService.advance(&state, table_id).await {
                        warn!(table_id, error = %err, "scheduled advance failed");
                    }
                }
            }
        });
    }
}

impl Default for AdvanceScheduler {
    fn default() -> Self {
        Self::new()
    }
}
