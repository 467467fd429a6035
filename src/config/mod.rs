pub mod cli;
pub mod project;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use crate::config::toml_config::{DEFAULT_FEEDBACK_FILE, DEFAULT_OUTPUT_FILE, MAX_WORKERS};
    use crate::core::ConfigProvider;
    use crate::domain::services::{ScoringWeights, SearchPolicy};
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_distinct_outputs, validate_path, validate_positive_number, validate_range, Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "team-former")]
    #[command(about = "Partition event participants into balanced project teams")]
    pub struct CliConfig {
        /// Participant CSV
        #[arg(long, default_value = "contestants.csv")]
        pub input: String,

        /// Project requirement JSON
        #[arg(long, default_value = "project_config.json")]
        pub requirements: String,

        #[arg(long, default_value = ".")]
        pub output_path: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
        pub output_file: String,

        #[arg(long, default_value = DEFAULT_FEEDBACK_FILE)]
        pub feedback_file: String,

        /// Random seed for cluster seeding
        #[arg(long, default_value = "42")]
        pub seed: u64,

        /// Concurrent cluster searches
        #[arg(long, default_value = "1")]
        pub workers: usize,

        /// Clusters larger than this use the bounded greedy + swap search
        #[arg(long, default_value = "20")]
        pub exhaustive_threshold: usize,

        #[arg(long, default_value = "50")]
        pub max_swap_rounds: usize,

        /// Abort when an exhaustive search would exceed this many combinations
        #[arg(long)]
        pub max_combinations: Option<u64>,

        /// TOML run configuration; replaces the path and search flags above
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per stage")]
        pub monitor: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,
    }

    impl ConfigProvider for CliConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn requirements_path(&self) -> &str {
            &self.requirements
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_file(&self) -> &str {
            &self.output_file
        }

        fn feedback_file(&self) -> &str {
            &self.feedback_file
        }

        fn seed(&self) -> u64 {
            self.seed
        }

        fn workers(&self) -> usize {
            self.workers
        }

        fn search_policy(&self) -> SearchPolicy {
            SearchPolicy {
                exhaustive_threshold: self.exhaustive_threshold,
                max_swap_rounds: self.max_swap_rounds,
                max_combinations: self.max_combinations,
            }
        }

        fn scoring_weights(&self) -> ScoringWeights {
            ScoringWeights::DEFAULT
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("input", &self.input)?;
            validate_path("requirements", &self.requirements)?;
            validate_path("output_path", &self.output_path)?;
            validate_path("output_file", &self.output_file)?;
            validate_path("feedback_file", &self.feedback_file)?;
            validate_distinct_outputs(&self.output_file, &self.feedback_file)?;
            validate_range("workers", self.workers, 1, MAX_WORKERS)?;
            validate_positive_number("max_swap_rounds", self.max_swap_rounds, 1)?;
            if let Some(limit) = self.max_combinations {
                validate_positive_number("max_combinations", limit as usize, 1)?;
            }
            Ok(())
        }
    }

}
