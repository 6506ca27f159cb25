use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::engine::EngineConfig;
use crate::domain::evaluator::HandEvaluator;
use crate::services::notifications::NotificationSink;
use crate::services::scheduler::AdvanceScheduler;

/// Explicit handle to every shared resource; passed down, never global.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub engine: EngineConfig,
    pub evaluator: Arc<dyn HandEvaluator>,
    pub sink: Arc<dyn NotificationSink>,
    pub scheduler: Arc<AdvanceScheduler>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        engine: EngineConfig,
        evaluator: Arc<dyn HandEvaluator>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            db,
            engine,
            evaluator,
            sink,
            scheduler: Arc::new(AdvanceScheduler::new()),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
