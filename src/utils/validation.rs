use crate::utils::error::{FormationError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(FormationError::config(field_name, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(FormationError::config(
            field_name,
            format!("Path '{}' contains null bytes", path.replace('\0', "\\0")),
        ));
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(FormationError::config(
            field_name,
            format!("Value {} must be at least {}", value, min_value),
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FormationError::config(
            field_name,
            format!("Value {} must be between {} and {}", value, min, max),
        ));
    }
    Ok(())
}

/// 檢查 CSV 標頭是否包含所有必要欄位，回報第一個缺少的欄位
pub fn validate_required_columns(headers: &[String], required: &[&str]) -> Result<()> {
    let present: HashSet<&str> = headers.iter().map(|h| h.as_str()).collect();

    for column in required {
        if !present.contains(column) {
            return Err(FormationError::validation(
                *column,
                format!(
                    "Missing required column. Expected columns: {}",
                    required.join(", ")
                ),
            ));
        }
    }

    Ok(())
}

pub fn validate_distinct_outputs(first: &str, second: &str) -> Result<()> {
    if first == second {
        return Err(FormationError::config(
            "output.feedback_file",
            format!("Feedback file must differ from the participant output file '{}'", first),
        ));
    }
    Ok(())
}
