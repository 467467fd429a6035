use crate::adapters::csv_table;
use crate::config::project::parse_requirement;
use crate::core::{CohortInput, ConfigProvider, FormationOutput, LoadReport, Pipeline, Storage};
use crate::domain::model::{Team, COLUMN_GROUP};
use crate::domain::services::assignment::{AssignmentPlan, TeamAssigner};
use crate::domain::services::encoder::FeatureEncoder;
use crate::domain::services::personality;
use crate::utils::error::{FormationError, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

pub struct TeamFormationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> TeamFormationPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn assigner(&self) -> TeamAssigner {
        TeamAssigner::new(self.config.seed())
            .with_weights(self.config.scoring_weights())
            .with_search_policy(self.config.search_policy())
    }

    fn output_location(&self, file_name: &str) -> String {
        Path::new(self.config.output_path())
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }

    /// Runs each cluster search on the blocking pool, at most `workers` at a
    /// time. Results are collected in cluster order.
    async fn optimize_concurrently(&self, plan: &AssignmentPlan) -> Result<Vec<Team>> {
        let workers = self.config.workers().max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::with_capacity(plan.clusters().len());

        for members in plan.clusters() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| FormationError::TaskError { message: e.to_string() })?;
            let optimizer = plan.optimizer().clone();
            let members = members.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                optimizer.best_team(&members)
            }));
        }

        let mut teams = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let team = handle.await.map_err(|e| FormationError::TaskError {
                message: format!("cluster {} search: {}", index, e),
            })??;
            teams.push(team);
        }
        Ok(teams)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TeamFormationPipeline<S, C> {
    async fn extract(&self) -> Result<CohortInput> {
        tracing::debug!("Reading participants from: {}", self.config.input_path());
        let table_bytes = self.storage.read_file(self.config.input_path()).await?;
        let table = csv_table::read_table(&table_bytes)?;

        tracing::debug!("Reading project requirement from: {}", self.config.requirements_path());
        let requirement_bytes = self
            .storage
            .read_file(self.config.requirements_path())
            .await
            .map_err(|e| {
                FormationError::config(
                    "requirements",
                    format!("cannot read '{}': {}", self.config.requirements_path(), e),
                )
            })?;
        let requirement = parse_requirement(&requirement_bytes)?;

        Ok(CohortInput { table, requirement })
    }

    async fn transform(&self, input: CohortInput) -> Result<FormationOutput> {
        let CohortInput { mut table, requirement } = input;

        // 空名單交給 plan 回報 "cohort is empty"
        if !table.is_empty() {
            personality::fill_missing_traits(&mut table)?;
        }
        let records = table.records()?;
        let participants = FeatureEncoder::participants_from_records(&records)?;

        let plan = self.assigner().plan(participants, requirement)?;
        let teams = if self.config.workers() > 1 {
            tracing::debug!(
                "Searching {} clusters with {} workers",
                plan.clusters().len(),
                self.config.workers()
            );
            self.optimize_concurrently(&plan).await?
        } else {
            (0..plan.clusters().len())
                .map(|index| plan.optimize_cluster(index))
                .collect::<Result<Vec<_>>>()?
        };

        for (index, team) in teams.iter().enumerate() {
            tracing::debug!(
                "Group {}: {} core members, fit score {:.4}",
                index + 1,
                team.len(),
                team.core_score
            );
        }

        let assignment = plan.finish(teams)?;
        table.set_column(
            COLUMN_GROUP,
            assignment.groups().iter().map(|g| g.to_string()).collect(),
        )?;

        Ok(FormationOutput { table, assignment })
    }

    async fn load(&self, output: FormationOutput) -> Result<LoadReport> {
        let output_file = self.output_location(self.config.output_file());
        let feedback_file = self.output_location(self.config.feedback_file());

        // 先完成兩份輸出的編碼，再寫入
        let table_bytes = csv_table::write_table(&output.table)?;
        let feedback_bytes = csv_table::write_feedback(output.assignment.audit())?;

        tracing::debug!("Writing {} bytes to {}", table_bytes.len(), output_file);
        self.storage.write_file(&output_file, &table_bytes).await?;
        tracing::debug!("Writing {} bytes to {}", feedback_bytes.len(), feedback_file);
        if let Err(e) = self.storage.write_file(&feedback_file, &feedback_bytes).await {
            // 回滾已寫出的分組表，失敗時不留下半套輸出
            if let Err(cleanup) = self.storage.remove_file(&output_file).await {
                tracing::warn!("⚠️ Could not remove {} after failed write: {}", output_file, cleanup);
            }
            return Err(e);
        }

        tracing::info!("📁 Participants with groups saved to: {}", output_file);
        tracing::info!("📁 Feedback saved to: {}", feedback_file);

        Ok(LoadReport {
            output_file,
            feedback_file,
            participants: output.assignment.audit().len(),
            groups: output.assignment.group_count(),
        })
    }
}
