//! Periodic sweep over every open table.

use time::OffsetDateTime;
use tracing::{info, warn};

use super::{AdvanceReport, HandFlowService};
use crate::error::AppError;
use crate::repos::tables;
use crate::state::app_state::AppState;

#[derive(Debug)]
pub struct TableSweep {
    pub table_id: i64,
    pub result: Result<AdvanceReport, AppError>,
}

#[derive(Debug, Default)]
pub struct SweepReport {
    pub tables: Vec<TableSweep>,
}

impl SweepReport {
    pub fn failures(&self) -> impl Iterator<Item = &TableSweep> {
        self.tables.iter().filter(|t| t.result.is_err())
    }

    /// Tables where the sweep moved something forward.
    pub fn advanced(&self) -> usize {
        self.tables
            .iter()
            .filter(|t| t.result.as_ref().is_ok_and(AdvanceReport::changed))
            .count()
    }
}

impl HandFlowService {
    pub async fn sweep_expired_turns(&self, state: &AppState) -> Result<SweepReport, AppError> {
        self.sweep_at(state, OffsetDateTime::now_utc()).await
    }

    /// Advance every table that is not complete. One table failing does not stop
    /// the others.
    pub async fn sweep_at(
        &self,
        state: &AppState,
        now: OffsetDateTime,
    ) -> Result<SweepReport, AppError> {
        let ids = tables::find_open_ids(state.db()).await?;
        let mut report = SweepReport::default();
        for table_id in ids {
            let result = self.advance_at(state, table_id, now).await;
            if let Err(err) = &result {
                warn!(table_id, error = %err, "sweep failed for table");
            }
            report.tables.push(TableSweep { table_id, result });
        }
        let failed = report.failures().count();
        if report.advanced() > 0 || failed > 0 {
            info!(
                tables = report.tables.len(),
                advanced = report.advanced(),
                failed,
                "sweep finished"
            );
        }
        Ok(report)
    }
}
