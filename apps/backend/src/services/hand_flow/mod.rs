//! Hand flow service: bridges the pure table rules with persistence.
//!
//! Player actions go through [`HandFlowService::submit_action`]. Everything the
//! engine does on its own (dealing, street changes, run-outs, showdown, completion,
//! timeouts, crash recovery, starting the next hand) is driven by
//! [`HandFlowService::advance`], which is idempotent and safe to call at any time.

mod actions;
mod context;
mod lifecycle;
mod orchestration;
mod recovery;
mod showdown;
mod streets;
mod sweep;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use time::OffsetDateTime;

use crate::config::engine::{to_time_duration, EngineConfig};
use crate::domain::evaluator::{HandEvaluator, StandardEvaluator};
use crate::repos::events::EventRecord;
use crate::services::notifications::table_channel;
use crate::state::app_state::AppState;

pub use actions::{ActionOutcome, SubmitAction};
pub use orchestration::AdvanceReport;
pub use sweep::{SweepReport, TableSweep};

/// Hand flow service - stateless; all state lives in the database.
#[derive(Debug, Default, Clone, Copy)]
pub struct HandFlowService;

/// Owned inputs for one transactional step.
#[derive(Clone)]
pub(crate) struct FlowEnv {
    pub engine: EngineConfig,
    pub evaluator: Arc<dyn HandEvaluator>,
    pub now: OffsetDateTime,
}

impl FlowEnv {
    pub fn new(state: &AppState, now: OffsetDateTime) -> Self {
        Self {
            engine: state.engine.clone(),
            evaluator: state.evaluator.clone(),
            now,
        }
    }

    /// Default pacing with the standard evaluator, for transaction-level entry points.
    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            engine: EngineConfig::default(),
            evaluator: Arc::new(StandardEvaluator),
            now,
        }
    }

    /// Time left until `since + delay`, or `None` once it has passed.
    pub fn remaining(&self, since: OffsetDateTime, delay: Duration) -> Option<Duration> {
        let due = since + to_time_duration(delay);
        (due > self.now).then(|| (due - self.now).unsigned_abs())
    }
}

/// What one step did inside its transaction.
#[derive(Debug, Default)]
pub(crate) struct StepOutcome {
    pub changed: bool,
    pub events: Vec<EventRecord>,
    /// The step is waiting on a clock; wake the table after this long.
    pub wake_after: Option<Duration>,
}

impl StepOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn wait(delay: Duration) -> Self {
        Self {
            wake_after: Some(delay),
            ..Self::default()
        }
    }

    pub fn changed(events: Vec<EventRecord>) -> Self {
        Self {
            changed: true,
            events,
            wake_after: None,
        }
    }

    pub fn wake_after(mut self, delay: Duration) -> Self {
        self.wake_after = Some(delay);
        self
    }
}

/// Fan committed events out to the notification sink.
pub(crate) async fn publish(state: &AppState, table_id: i64, events: &[EventRecord]) {
    let channel = table_channel(table_id);
    for event in events {
        let payload = json!({
            "id": event.id,
            "version": event.entity_version,
            "payload": event.payload,
        });
        state
            .sink
            .publish(&channel, &event.event_type, &payload)
            .await;
    }
}
