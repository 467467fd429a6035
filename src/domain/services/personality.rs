//! TIPI (Ten-Item Personality Inventory) scoring and label assignment.
//!
//! Used only when the participant table carries `TIPI1..TIPI10` responses
//! but no `PersonalityTrait` values.

use crate::domain::model::{ParticipantTable, COLUMN_PERSONALITY};
use crate::utils::error::{FormationError, Result};
use std::fmt;

pub const TIPI_ITEMS: usize = 10;
const SCALE_MIN: f64 = 1.0;
const SCALE_MAX: f64 = 7.0;
const Z_EPSILON: f64 = 1e-6;

/// 1-based item numbers scored in reverse.
const REVERSED_ITEMS: [usize; 5] = [2, 4, 6, 8, 10];

pub fn tipi_column(item: usize) -> String {
    format!("TIPI{}", item)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BigFive {
    pub extraversion: f64,
    pub agreeableness: f64,
    pub conscientiousness: f64,
    pub emotional_stability: f64,
    pub openness: f64,
}

impl BigFive {
    fn as_array(&self) -> [f64; 5] {
        [
            self.extraversion,
            self.agreeableness,
            self.conscientiousness,
            self.emotional_stability,
            self.openness,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalityLabel {
    Leader,
    Creative,
    Analytical,
    Collaborative,
}

impl PersonalityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "Leader",
            Self::Creative => "Creative",
            Self::Analytical => "Analytical",
            Self::Collaborative => "Collaborative",
        }
    }
}

impl fmt::Display for PersonalityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores one response set; `items[0]` is TIPI1.
pub fn score_tipi(items: &[f64; TIPI_ITEMS]) -> Result<BigFive> {
    let mut scored = *items;
    for (index, value) in scored.iter_mut().enumerate() {
        if !(SCALE_MIN..=SCALE_MAX).contains(value) {
            return Err(FormationError::validation(
                tipi_column(index + 1),
                format!("response {} is outside the 1-7 scale", value),
            ));
        }
        if REVERSED_ITEMS.contains(&(index + 1)) {
            *value = SCALE_MAX + SCALE_MIN - *value;
        }
    }

    let pair = |a: usize, b: usize| (scored[a - 1] + scored[b - 1]) / 2.0;
    Ok(BigFive {
        extraversion: pair(1, 6),
        agreeableness: pair(2, 7),
        conscientiousness: pair(3, 8),
        emotional_stability: pair(4, 9),
        openness: pair(5, 10),
    })
}

/// Labels each profile relative to the cohort (z-scores per trait).
pub fn assign_labels(profiles: &[BigFive]) -> Vec<PersonalityLabel> {
    if profiles.is_empty() {
        return Vec::new();
    }

    let n = profiles.len() as f64;
    let mut means = [0.0; 5];
    for profile in profiles {
        for (mean, value) in means.iter_mut().zip(profile.as_array()) {
            *mean += value / n;
        }
    }
    let mut deviations = [0.0; 5];
    for profile in profiles {
        for ((dev, value), mean) in deviations.iter_mut().zip(profile.as_array()).zip(means) {
            *dev += (value - mean) * (value - mean) / n;
        }
    }
    let deviations = deviations.map(f64::sqrt);

    profiles
        .iter()
        .map(|profile| {
            let values = profile.as_array();
            let z = |i: usize| (values[i] - means[i]) / (deviations[i] + Z_EPSILON);
            label_for(z(0), z(1), z(2), z(4))
        })
        .collect()
}

fn label_for(ez: f64, az: f64, cz: f64, oz: f64) -> PersonalityLabel {
    if ez > 0.6 && cz > 0.3 {
        return PersonalityLabel::Leader;
    }
    if oz > 0.6 {
        return PersonalityLabel::Creative;
    }
    if cz > 0.6 && ez < 0.2 {
        return PersonalityLabel::Analytical;
    }
    if az > 0.5 {
        return PersonalityLabel::Collaborative;
    }

    // 以錨點分數取最大者，平手取先出現的
    let anchors = [
        (PersonalityLabel::Leader, ez + 0.3 * cz),
        (PersonalityLabel::Creative, oz),
        (PersonalityLabel::Analytical, cz - 0.2 * ez),
        (PersonalityLabel::Collaborative, az),
    ];
    let mut best = anchors[0];
    for anchor in &anchors[1..] {
        if anchor.1 > best.1 {
            best = *anchor;
        }
    }
    best.0
}

/// Fills `PersonalityTrait` from TIPI responses when the column is absent or
/// entirely blank. Returns whether labels were computed.
pub fn fill_missing_traits(table: &mut ParticipantTable) -> Result<bool> {
    if table.column_has_values(COLUMN_PERSONALITY) {
        return Ok(false);
    }

    let columns = (1..=TIPI_ITEMS)
        .map(|item| {
            let name = tipi_column(item);
            table.column_index(&name).ok_or_else(|| {
                FormationError::validation(
                    COLUMN_PERSONALITY,
                    format!("no personality labels and no TIPI responses (missing column {})", name),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut profiles = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let mut items = [0.0; TIPI_ITEMS];
        for (item, &column) in columns.iter().enumerate() {
            let raw = table.cell(row, column).ok_or_else(|| {
                FormationError::validation(tipi_column(item + 1), format!("row {}: response is missing", row + 1))
            })?;
            items[item] = raw.parse::<f64>().map_err(|_| {
                FormationError::validation(
                    tipi_column(item + 1),
                    format!("row {}: '{}' is not a number", row + 1, raw),
                )
            })?;
        }
        profiles.push(score_tipi(&items)?);
    }

    let labels = assign_labels(&profiles);
    tracing::info!("🧠 Derived personality labels from TIPI responses for {} participants", labels.len());
    table.set_column(
        COLUMN_PERSONALITY,
        labels.iter().map(|label| label.as_str().to_string()).collect(),
    )?;
    Ok(true)
}
