use std::sync::Arc;

use crate::config::db::DbProfile;
use crate::config::engine::EngineConfig;
use crate::domain::evaluator::{HandEvaluator, StandardEvaluator};
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::services::notifications::{NotificationSink, NullSink};
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    db_profile: DbProfile,
    engine: EngineConfig,
    evaluator: Arc<dyn HandEvaluator>,
    sink: Arc<dyn NotificationSink>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db_profile: DbProfile::InMemory,
            engine: EngineConfig::default(),
            evaluator: Arc::new(StandardEvaluator),
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = profile;
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn HandEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Connect, migrate, and assemble the state handle.
    pub async fn build(self) -> Result<AppState, AppError> {
        let conn = bootstrap_db(&self.db_profile).await?;
        Ok(AppState::new(conn, self.engine, self.evaluator, self.sink))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
