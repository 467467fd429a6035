use crate::core::{LoadReport, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub report: LoadReport,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs a pipeline's extract → transform → load once. A failure in any
/// stage aborts the run before anything is written.
pub struct FormationEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> FormationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        tracing::info!("🚀 Starting team formation run");

        tracing::info!("📥 Extracting participant table and project requirement...");
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} participants (teams requested: {}, team size: {})",
            input.table.len(),
            input.requirement.num_teams(),
            input.requirement.team_size()
        );
        self.monitor.log_stage("Extract");

        tracing::info!("⚙️ Forming teams...");
        let output = self.pipeline.transform(input).await?;
        tracing::info!(
            "⚙️ Formed {} groups for {} participants",
            output.assignment.group_count(),
            output.assignment.audit().len()
        );
        self.monitor.log_stage("Transform");

        tracing::info!("💾 Writing outputs...");
        let report = self.pipeline.load(output).await?;
        self.monitor.log_stage("Load");
        self.monitor.log_final_stats();

        let finished_at = Utc::now();
        tracing::info!(
            "✅ Run finished in {} ms",
            (finished_at - started_at).num_milliseconds()
        );

        Ok(RunSummary {
            report,
            started_at,
            finished_at,
        })
    }
}
