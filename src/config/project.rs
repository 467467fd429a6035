use crate::domain::model::ProjectRequirement;
use crate::utils::error::{FormationError, Result};
use serde::{Deserialize, Serialize};

fn default_num_teams() -> i64 {
    3
}

fn default_team_size() -> i64 {
    3
}

/// Raw `project_config.json` contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_num_teams")]
    pub num_teams: i64,
    #[serde(default = "default_team_size")]
    pub team_size: i64,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_interests: Vec<String>,
}

impl ProjectConfig {
    pub fn from_json_slice(content: &[u8]) -> Result<Self> {
        serde_json::from_slice(content).map_err(|e| {
            FormationError::config("project_requirements", format!("invalid project requirement JSON: {}", e))
        })
    }

    pub fn into_requirement(self) -> Result<ProjectRequirement> {
        ProjectRequirement::new(
            self.num_teams,
            self.team_size,
            self.required_skills,
            self.preferred_interests,
        )
    }
}

/// Parses and validates a requirement file's bytes.
pub fn parse_requirement(content: &[u8]) -> Result<ProjectRequirement> {
    ProjectConfig::from_json_slice(content)?.into_requirement()
}
