use crate::utils::error::{FormationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Position of a participant in the cohort (0-based row order of the input table).
pub type ParticipantId = usize;

pub const COLUMN_NAME: &str = "Name";
pub const COLUMN_SKILLS: &str = "Skills";
pub const COLUMN_INTERESTS: &str = "Interests";
pub const COLUMN_EXPERIENCE: &str = "ExperienceLevel";
pub const COLUMN_PROJECT_PREFERENCE: &str = "ProjectPreference";
pub const COLUMN_PERSONALITY: &str = "PersonalityTrait";
pub const COLUMN_GROUP: &str = "Group";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COLUMN_NAME,
    COLUMN_SKILLS,
    COLUMN_INTERESTS,
    COLUMN_EXPERIENCE,
    COLUMN_PROJECT_PREFERENCE,
    COLUMN_PERSONALITY,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    /// Exact labels only; anything else, including other casings, is `Intermediate`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("Beginner") => Self::Beginner,
            Some("Expert") => Self::Expert,
            _ => Self::Intermediate,
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Expert => 3,
        }
    }
}

/// One row of the participant table before list fields are parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub name: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
    pub experience_level: Option<String>,
    pub project_preference: Option<String>,
    pub personality_trait: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub skills: BTreeSet<String>,
    pub interests: BTreeSet<String>,
    pub experience: ExperienceLevel,
    pub personality: String,
    pub project_preference: String,
}

/// Validated project requirement. `num_teams` is already clamped below at 1;
/// the upper clamp depends on the cohort and happens in [`ProjectRequirement::teams_for`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRequirement {
    num_teams: usize,
    team_size: usize,
    pub required_skills: BTreeSet<String>,
    pub preferred_interests: BTreeSet<String>,
}

impl ProjectRequirement {
    pub fn new<S, I>(num_teams: i64, team_size: i64, required_skills: S, preferred_interests: I) -> Result<Self>
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if team_size < 1 {
            return Err(FormationError::config(
                "team_size",
                format!("team_size must be at least 1, got {}", team_size),
            ));
        }

        Ok(Self {
            num_teams: num_teams.max(1) as usize,
            team_size: team_size as usize,
            required_skills: clean_labels(required_skills),
            preferred_interests: clean_labels(preferred_interests),
        })
    }

    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    pub fn team_size(&self) -> usize {
        self.team_size
    }

    /// Number of groups actually formed for a cohort of `cohort_size`.
    pub fn teams_for(&self, cohort_size: usize) -> usize {
        self.num_teams.clamp(1, cohort_size.max(1))
    }
}

fn clean_labels<T>(values: T) -> BTreeSet<String>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Members chosen by the local search, ascending, followed by overflow in placement order.
    pub members: Vec<ParticipantId>,
    /// Fit score of the searched core, before overflow was added.
    pub core_score: f64,
}

impl Team {
    pub fn new(members: Vec<ParticipantId>, core_score: f64) -> Self {
        Self { members, core_score }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: ParticipantId,
    pub name: String,
    pub group: usize,
}

/// In-memory copy of the participant CSV, kept column-for-column so the
/// output table is the input plus a `Group` column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParticipantTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Cell value with blanks treated as missing.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn column_has_values(&self, name: &str) -> bool {
        match self.column_index(name) {
            Some(column) => (0..self.len()).any(|row| self.cell(row, column).is_some()),
            None => false,
        }
    }

    /// Overwrites an existing column or appends a new one.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(FormationError::integrity(format!(
                "column '{}' has {} values for {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }

        let column = match self.column_index(name) {
            Some(column) => column,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        };

        for (row, value) in self.rows.iter_mut().zip(values) {
            if row.len() <= column {
                row.resize(column + 1, String::new());
            }
            row[column] = value;
        }
        Ok(())
    }

    pub fn records(&self) -> Result<Vec<ParticipantRecord>> {
        crate::utils::validation::validate_required_columns(&self.headers, &REQUIRED_COLUMNS)?;

        let index = |name: &str| self.column_index(name);
        let (name, skills, interests, experience, preference, personality) = (
            index(COLUMN_NAME),
            index(COLUMN_SKILLS),
            index(COLUMN_INTERESTS),
            index(COLUMN_EXPERIENCE),
            index(COLUMN_PROJECT_PREFERENCE),
            index(COLUMN_PERSONALITY),
        );

        let read = |row: usize, column: Option<usize>| {
            column.and_then(|column| self.cell(row, column)).map(str::to_string)
        };

        Ok((0..self.len())
            .map(|row| ParticipantRecord {
                name: read(row, name),
                skills: read(row, skills),
                interests: read(row, interests),
                experience_level: read(row, experience),
                project_preference: read(row, preference),
                personality_trait: read(row, personality),
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct CohortInput {
    pub table: ParticipantTable,
    pub requirement: ProjectRequirement,
}

#[derive(Debug, Clone)]
pub struct FormationOutput {
    pub table: ParticipantTable,
    pub assignment: crate::domain::services::assignment::AssignmentResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub output_file: String,
    pub feedback_file: String,
    pub participants: usize,
    pub groups: usize,
}
