use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormationError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigError { field: String, message: String },

    #[error("Validation error in '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Integrity error: {message}")]
    IntegrityError { message: String },

    #[error("Search task failed: {message}")]
    TaskError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Integrity,
    System,
}

/// 嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FormationError {
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::IntegrityError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CsvError(_) | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::TomlError(_) | Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::IntegrityError { .. } => ErrorCategory::Integrity,
            Self::IoError(_) | Self::TaskError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::IoError(_) => ErrorSeverity::Medium,
            Self::CsvError(_)
            | Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::ValidationError { .. } => ErrorSeverity::High,
            Self::IntegrityError { .. } | Self::TaskError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::CsvError(_) => {
                "Check that the participant file is well-formed CSV with a header row".to_string()
            }
            Self::IoError(_) => {
                "Check that the input files exist and the output directory is writable".to_string()
            }
            Self::TomlError(_) => "Check the TOML run configuration syntax".to_string(),
            Self::ConfigError { field, .. } => {
                format!("Fix the '{}' setting and re-run", field)
            }
            Self::ValidationError { field, .. } => {
                format!("Correct the '{}' values in the participant file and re-run", field)
            }
            Self::IntegrityError { .. } | Self::TaskError { .. } => {
                "Re-run from scratch; if it persists, report the input that triggers it".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { field, message } => {
                format!("Participant data is invalid ({}): {}", field, message)
            }
            Self::ConfigError { field, message } => {
                format!("Configuration is invalid ({}): {}", field, message)
            }
            Self::IntegrityError { message } => {
                format!("Team assignment failed an internal consistency check: {}", message)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_keep_field_name() {
        let err = FormationError::validation("Skills", "row 3: not a list");
        assert_eq!(err.to_string(), "Validation error in 'Skills': row 3: not a list");
        assert_eq!(err.category(), ErrorCategory::Input);

        let err = FormationError::config("team_size", "must be at least 1");
        assert!(err.recovery_suggestion().contains("team_size"));
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_integrity_is_critical() {
        let err = FormationError::integrity("participant 4 unassigned");
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.category(), ErrorCategory::Integrity);
    }
}
