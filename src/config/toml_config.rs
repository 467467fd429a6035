use crate::core::ConfigProvider;
use crate::domain::services::{seeder::DEFAULT_SEED, ScoringWeights, SearchPolicy};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_distinct_outputs, validate_path, validate_positive_number, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_OUTPUT_FILE: &str = "contestants_with_groups.csv";
pub const DEFAULT_FEEDBACK_FILE: &str = "team_feedback.csv";
pub const MAX_WORKERS: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub weights: Option<WeightsConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub participants: String,
    pub requirements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: String,
    pub participants_file: Option<String>,
    pub feedback_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub exhaustive_threshold: Option<usize>,
    pub max_swap_rounds: Option<usize>,
    pub max_combinations: Option<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightsConfig {
    pub skill: f64,
    pub interest: f64,
    pub experience: f64,
    pub personality: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn env_placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed)?)
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_placeholder()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.participants
    }

    fn requirements_path(&self) -> &str {
        &self.input.requirements
    }

    fn output_path(&self) -> &str {
        &self.output.directory
    }

    fn output_file(&self) -> &str {
        self.output
            .participants_file
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    fn feedback_file(&self) -> &str {
        self.output.feedback_file.as_deref().unwrap_or(DEFAULT_FEEDBACK_FILE)
    }

    fn seed(&self) -> u64 {
        self.search.seed.unwrap_or(DEFAULT_SEED)
    }

    fn workers(&self) -> usize {
        self.search.workers.unwrap_or(1)
    }

    fn search_policy(&self) -> SearchPolicy {
        let defaults = SearchPolicy::default();
        SearchPolicy {
            exhaustive_threshold: self
                .search
                .exhaustive_threshold
                .unwrap_or(defaults.exhaustive_threshold),
            max_swap_rounds: self.search.max_swap_rounds.unwrap_or(defaults.max_swap_rounds),
            max_combinations: self.search.max_combinations,
        }
    }

    fn scoring_weights(&self) -> ScoringWeights {
        self.weights
            .map(|w| ScoringWeights {
                skill: w.skill,
                interest: w.interest,
                experience: w.experience,
                personality: w.personality,
            })
            .unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input.participants", &self.input.participants)?;
        validate_path("input.requirements", &self.input.requirements)?;
        validate_path("output.directory", &self.output.directory)?;
        validate_path("output.participants_file", self.output_file())?;
        validate_path("output.feedback_file", self.feedback_file())?;
        validate_distinct_outputs(self.output_file(), self.feedback_file())?;

        validate_range("search.workers", self.workers(), 1, MAX_WORKERS)?;
        if let Some(rounds) = self.search.max_swap_rounds {
            validate_positive_number("search.max_swap_rounds", rounds, 1)?;
        }
        if let Some(limit) = self.search.max_combinations {
            validate_positive_number("search.max_combinations", limit as usize, 1)?;
        }

        self.scoring_weights().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[input]
participants = "data/contestants.csv"
requirements = "data/project_config.json"

[output]
directory = "./out"

[search]
seed = 7
workers = 4
exhaustive_threshold = 12
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.input_path(), "data/contestants.csv");
        assert_eq!(config.output_file(), DEFAULT_OUTPUT_FILE);
        assert_eq!(config.feedback_file(), DEFAULT_FEEDBACK_FILE);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.workers(), 4);
        assert_eq!(config.search_policy().exhaustive_threshold, 12);
        assert_eq!(config.search_policy().max_swap_rounds, 50);
        assert_eq!(config.scoring_weights(), ScoringWeights::DEFAULT);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEAM_FORMER_TEST_DATA_DIR", "/srv/hackathon");

        let toml_content = r#"
[input]
participants = "${TEAM_FORMER_TEST_DATA_DIR}/contestants.csv"
requirements = "${TEAM_FORMER_TEST_UNSET_VAR}/project_config.json"

[output]
directory = "./out"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.participants, "/srv/hackathon/contestants.csv");
        assert_eq!(
            config.input.requirements,
            "${TEAM_FORMER_TEST_UNSET_VAR}/project_config.json"
        );

        std::env::remove_var("TEAM_FORMER_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[input]
participants = "contestants.csv"
requirements = "project_config.json"

[output]
directory = "./out"
participants_file = "same.csv"
feedback_file = "same.csv"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[input]
participants = "contestants.csv"
requirements = "project_config.json"

[output]
directory = "./out"

[weights]
skill = 0.9
interest = 0.3
experience = 0.2
personality = 0.1
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        assert!(matches!(
            TomlConfig::from_toml_str("[input\nparticipants ="),
            Err(crate::utils::error::FormationError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.requirements_path(), "data/project_config.json");
    }
}
