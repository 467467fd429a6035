pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::TomlConfig;
pub use core::{etl::FormationEngine, pipeline::TeamFormationPipeline};
pub use domain::services::{AssignmentResult, TeamAssigner};
pub use utils::error::{FormationError, Result};
