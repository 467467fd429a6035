//! Team fit scoring.
//!
//! `score = w.skill * skill_match + w.interest * interest_match
//!        + w.experience * experience_balance + w.personality * personality_diversity`
//!
//! Every term lies in [0, 1] and the weights sum to 1, so the score does too.

use crate::domain::model::{Participant, ParticipantId, ProjectRequirement};
use crate::utils::error::{FormationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skill: f64,
    pub interest: f64,
    pub experience: f64,
    pub personality: f64,
}

impl ScoringWeights {
    /// Policy weights: skills 40%, interests 30%, experience 20%, personality 10%.
    pub const DEFAULT: ScoringWeights = ScoringWeights {
        skill: 0.4,
        interest: 0.3,
        experience: 0.2,
        personality: 0.1,
    };

    pub fn new(skill: f64, interest: f64, experience: f64, personality: f64) -> Result<Self> {
        let weights = Self {
            skill,
            interest,
            experience,
            personality,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn sum(&self) -> f64 {
        self.skill + self.interest + self.experience + self.personality
    }

    pub fn validate(&self) -> Result<()> {
        let named = [
            ("weights.skill", self.skill),
            ("weights.interest", self.interest),
            ("weights.experience", self.experience),
            ("weights.personality", self.personality),
        ];
        for (field, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(FormationError::config(
                    field,
                    format!("weight must be a finite non-negative number, got {}", value),
                ));
            }
        }

        if (self.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(FormationError::config(
                "weights",
                format!("weights must sum to 1.0, got {}", self.sum()),
            ));
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub skill_match: f64,
    pub interest_match: f64,
    pub experience_balance: f64,
    pub personality_diversity: f64,
    pub total: f64,
}

/// Scores teams drawn from a shared, read-only cohort.
#[derive(Debug, Clone)]
pub struct TeamScorer {
    cohort: Arc<Vec<Participant>>,
    weights: ScoringWeights,
}

impl TeamScorer {
    pub fn new(cohort: Arc<Vec<Participant>>, weights: ScoringWeights) -> Self {
        Self { cohort, weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn cohort(&self) -> &[Participant] {
        &self.cohort
    }

    pub fn score(&self, team: &[ParticipantId], requirement: &ProjectRequirement) -> f64 {
        self.breakdown(team, requirement).total
    }

    /// Unknown ids are ignored.
    pub fn breakdown(&self, team: &[ParticipantId], requirement: &ProjectRequirement) -> ScoreBreakdown {
        let members: Vec<&Participant> = team.iter().filter_map(|&id| self.cohort.get(id)).collect();

        let skill_match = coverage(
            &requirement.required_skills,
            members.iter().flat_map(|p| p.skills.iter()),
        );
        let interest_match = coverage(
            &requirement.preferred_interests,
            members.iter().flat_map(|p| p.interests.iter()),
        );
        let experience_balance = experience_balance(&members);
        let personality_diversity = if members.is_empty() {
            0.0
        } else {
            let distinct: BTreeSet<&str> = members.iter().map(|p| p.personality.as_str()).collect();
            distinct.len() as f64 / members.len() as f64
        };

        let w = self.weights;
        let total = (w.skill * skill_match
            + w.interest * interest_match
            + w.experience * experience_balance
            + w.personality * personality_diversity)
            .clamp(0.0, 1.0);

        ScoreBreakdown {
            skill_match,
            interest_match,
            experience_balance,
            personality_diversity,
            total,
        }
    }
}

/// |target ∩ offered| / |target|, 0 when the target is empty.
fn coverage<'a>(target: &BTreeSet<String>, offered: impl Iterator<Item = &'a String>) -> f64 {
    if target.is_empty() {
        return 0.0;
    }
    let offered: BTreeSet<&String> = offered.collect();
    let matched = target.iter().filter(|item| offered.contains(item)).count();
    matched as f64 / target.len() as f64
}

/// 1 - pstdev / mean, clamped; 0 for teams of one or fewer.
fn experience_balance(members: &[&Participant]) -> f64 {
    if members.len() <= 1 {
        return 0.0;
    }

    let values: Vec<f64> = members.iter().map(|p| f64::from(p.experience.ordinal())).collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (1.0 - variance.sqrt() / mean).clamp(0.0, 1.0)
}
