// Team-formation engine: pure, synchronous, no I/O.

pub mod assignment;
pub mod encoder;
pub mod optimizer;
pub mod overflow;
pub mod personality;
pub mod scorer;
pub mod seeder;

pub use assignment::{AssignmentPlan, AssignmentResult, AssignmentStage, TeamAssigner};
pub use encoder::{FeatureEncoder, FeatureMatrix};
pub use optimizer::{LocalOptimizer, SearchPolicy, SearchStrategy};
pub use overflow::OverflowAssigner;
pub use scorer::{ScoreBreakdown, ScoringWeights, TeamScorer};
pub use seeder::{ClusterSeeder, Clustering};
