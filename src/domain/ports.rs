use crate::domain::model::{CohortInput, FormationOutput, LoadReport};
use crate::domain::services::{ScoringWeights, SearchPolicy};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn requirements_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn feedback_file(&self) -> &str;
    fn seed(&self) -> u64;
    fn workers(&self) -> usize;
    fn search_policy(&self) -> SearchPolicy;
    fn scoring_weights(&self) -> ScoringWeights;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CohortInput>;
    async fn transform(&self, input: CohortInput) -> Result<FormationOutput>;
    async fn load(&self, output: FormationOutput) -> Result<LoadReport>;
}
