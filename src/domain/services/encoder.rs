//! Participant parsing and feature encoding.
//!
//! Column layout of the encoded matrix, in order:
//! one multi-hot column per distinct skill, one per distinct interest,
//! the experience ordinal, then the personality label code. Distinct
//! skills, interests and personality labels are each sorted
//! lexicographically; a label's code is its index in that sorted list.

use crate::domain::model::{
    ExperienceLevel, Participant, ParticipantRecord, COLUMN_INTERESTS, COLUMN_NAME,
    COLUMN_PERSONALITY, COLUMN_SKILLS,
};
use crate::utils::error::{FormationError, Result};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.columns.len()
    }
}

pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Parses raw table rows into participants; ids follow row order.
    pub fn participants_from_records(records: &[ParticipantRecord]) -> Result<Vec<Participant>> {
        records
            .iter()
            .enumerate()
            .map(|(id, record)| {
                let row = id + 1;
                let name = required_value(COLUMN_NAME, row, record.name.as_deref())?;
                let personality =
                    required_value(COLUMN_PERSONALITY, row, record.personality_trait.as_deref())?;

                Ok(Participant {
                    id,
                    name,
                    skills: parse_list_field(COLUMN_SKILLS, row, record.skills.as_deref())?,
                    interests: parse_list_field(COLUMN_INTERESTS, row, record.interests.as_deref())?,
                    experience: ExperienceLevel::parse(record.experience_level.as_deref()),
                    personality,
                    project_preference: record.project_preference.clone().unwrap_or_default(),
                })
            })
            .collect()
    }

    pub fn encode(participants: &[Participant]) -> FeatureMatrix {
        let skills: BTreeSet<&str> = participants
            .iter()
            .flat_map(|p| p.skills.iter().map(String::as_str))
            .collect();
        let interests: BTreeSet<&str> = participants
            .iter()
            .flat_map(|p| p.interests.iter().map(String::as_str))
            .collect();
        let personality_codes: BTreeMap<&str, usize> = participants
            .iter()
            .map(|p| p.personality.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(code, label)| (label, code))
            .collect();

        let mut columns: Vec<String> = Vec::with_capacity(skills.len() + interests.len() + 2);
        columns.extend(skills.iter().map(|s| format!("skill:{}", s)));
        columns.extend(interests.iter().map(|i| format!("interest:{}", i)));
        columns.push("experience".to_string());
        columns.push("personality".to_string());

        let rows = participants
            .iter()
            .map(|participant| {
                let mut row = Vec::with_capacity(columns.len());
                row.extend(skills.iter().map(|s| multi_hot(participant.skills.contains(*s))));
                row.extend(interests.iter().map(|i| multi_hot(participant.interests.contains(*i))));
                row.push(f64::from(participant.experience.ordinal()));
                row.push(
                    personality_codes
                        .get(participant.personality.as_str())
                        .copied()
                        .unwrap_or_default() as f64,
                );
                row
            })
            .collect();

        tracing::debug!(
            "Encoded {} participants into {} features ({} skills, {} interests)",
            participants.len(),
            columns.len(),
            skills.len(),
            interests.len()
        );

        FeatureMatrix { columns, rows }
    }
}

fn multi_hot(present: bool) -> f64 {
    if present {
        1.0
    } else {
        0.0
    }
}

fn required_value(field: &str, row: usize, value: Option<&str>) -> Result<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FormationError::validation(field, format!("row {}: value is missing", row)))
}

/// Parses a list cell: either comma separated (`python, ml`) or a JSON array
/// of strings (`["python", "ml"]`). Blank tokens are dropped.
pub fn parse_list_field(field: &str, row: usize, raw: Option<&str>) -> Result<BTreeSet<String>> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(BTreeSet::new());
    };

    let tokens: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str::<Vec<String>>(raw).map_err(|e| {
            FormationError::validation(
                field,
                format!("row {}: '{}' is not a list of strings ({})", row, raw, e),
            )
        })?
    } else {
        raw.split(',').map(str::to_string).collect()
    };

    Ok(tokens
        .into_iter()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, skills: &str, interests: &str, experience: &str, trait_: &str) -> ParticipantRecord {
        ParticipantRecord {
            name: Some(name.to_string()),
            skills: Some(skills.to_string()),
            interests: Some(interests.to_string()),
            experience_level: Some(experience.to_string()),
            project_preference: Some("General".to_string()),
            personality_trait: Some(trait_.to_string()),
        }
    }

    #[test]
    fn test_parse_list_field_formats() {
        let parsed = parse_list_field(COLUMN_SKILLS, 1, Some(" python, ml ,,design")).unwrap();
        assert_eq!(parsed.into_iter().collect::<Vec<_>>(), vec!["design", "ml", "python"]);

        let parsed = parse_list_field(COLUMN_SKILLS, 1, Some(r#"["ai", " web "]"#)).unwrap();
        assert_eq!(parsed.into_iter().collect::<Vec<_>>(), vec!["ai", "web"]);

        assert!(parse_list_field(COLUMN_SKILLS, 1, None).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_list_names_field_and_row() {
        let err = parse_list_field(COLUMN_INTERESTS, 4, Some("[1, 2")).unwrap_err();
        match err {
            FormationError::ValidationError { field, message } => {
                assert_eq!(field, "Interests");
                assert!(message.starts_with("row 4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_personality_is_rejected() {
        let mut bad = record("C1", "python", "ai", "Expert", "Leader");
        bad.personality_trait = None;
        let err = FeatureEncoder::participants_from_records(&[bad]).unwrap_err();
        assert!(matches!(err, FormationError::ValidationError { ref field, .. } if field == "PersonalityTrait"));
    }

    #[test]
    fn test_experience_labels_are_case_sensitive() {
        let records = vec![
            record("C1", "python", "ai", "expert", "Leader"),
            record("C2", "python", "ai", "Expert", "Leader"),
        ];
        let participants = FeatureEncoder::participants_from_records(&records).unwrap();
        assert_eq!(participants[0].experience, ExperienceLevel::Intermediate);
        assert_eq!(participants[1].experience, ExperienceLevel::Expert);

        let matrix = FeatureEncoder::encode(&participants);
        assert_eq!(matrix.row(0).unwrap()[2], 2.0);
        assert_eq!(matrix.row(1).unwrap()[2], 3.0);
    }

    #[test]
    fn test_encode_uses_sorted_columns() {
        let records = vec![
            record("C1", "python,ml", "web", "Expert", "Leader"),
            record("C2", "design", "ai,web", "Wizard", "Creative"),
        ];
        let participants = FeatureEncoder::participants_from_records(&records).unwrap();
        let matrix = FeatureEncoder::encode(&participants);

        assert_eq!(
            matrix.columns(),
            &[
                "skill:design",
                "skill:ml",
                "skill:python",
                "interest:ai",
                "interest:web",
                "experience",
                "personality",
            ]
        );
        // Creative < Leader, so Creative encodes as 0.
        assert_eq!(matrix.row(0).unwrap(), &[0.0, 1.0, 1.0, 0.0, 1.0, 3.0, 1.0]);
        assert_eq!(matrix.row(1).unwrap(), &[1.0, 0.0, 0.0, 1.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_encode_is_reproducible() {
        let records = vec![
            record("C1", "ux,cloud", "health", "Beginner", "Analytical"),
            record("C2", "cloud", "finance", "Intermediate", "Leader"),
        ];
        let participants = FeatureEncoder::participants_from_records(&records).unwrap();
        assert_eq!(FeatureEncoder::encode(&participants), FeatureEncoder::encode(&participants));
    }
}
