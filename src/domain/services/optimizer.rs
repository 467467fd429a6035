//! Per-cluster team search.
//!
//! Clusters up to `exhaustive_threshold` members are searched exhaustively:
//! combinations are enumerated lexicographically over ascending ids and the
//! first combination reaching the maximum score wins. Larger clusters use a
//! greedy seed followed by first-improvement pairwise swaps.

use crate::domain::model::{ParticipantId, ProjectRequirement, Team};
use crate::domain::services::scorer::TeamScorer;
use crate::utils::error::{FormationError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const IMPROVEMENT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPolicy {
    /// Largest cluster still searched exhaustively.
    pub exhaustive_threshold: usize,
    /// Upper bound on swap passes in the bounded search.
    pub max_swap_rounds: usize,
    /// Abort instead of enumerating more than this many combinations.
    pub max_combinations: Option<u64>,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            exhaustive_threshold: 20,
            max_swap_rounds: 50,
            max_combinations: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Exhaustive,
    GreedySwap,
}

#[derive(Debug, Clone)]
pub struct LocalOptimizer {
    scorer: TeamScorer,
    requirement: Arc<ProjectRequirement>,
    policy: SearchPolicy,
}

impl LocalOptimizer {
    pub fn new(scorer: TeamScorer, requirement: Arc<ProjectRequirement>, policy: SearchPolicy) -> Self {
        Self {
            scorer,
            requirement,
            policy,
        }
    }

    pub fn strategy_for(&self, cluster_size: usize) -> SearchStrategy {
        if cluster_size > self.policy.exhaustive_threshold {
            SearchStrategy::GreedySwap
        } else {
            SearchStrategy::Exhaustive
        }
    }

    /// Best team of `min(team_size, members.len())` drawn from `members`.
    pub fn best_team(&self, members: &[ParticipantId]) -> Result<Team> {
        let team_size = self.requirement.team_size();
        if team_size == 0 {
            return Err(FormationError::config("team_size", "team_size must be at least 1"));
        }

        let mut members = members.to_vec();
        members.sort_unstable();
        members.dedup();

        if let Some(&unknown) = members.iter().find(|&&id| id >= self.scorer.cohort().len()) {
            return Err(FormationError::validation(
                "participants",
                format!("cluster references unknown participant {}", unknown),
            ));
        }

        let size = team_size.min(members.len());
        if size == 0 {
            return Ok(Team::new(Vec::new(), 0.0));
        }

        match self.strategy_for(members.len()) {
            SearchStrategy::Exhaustive => self.exhaustive(&members, size),
            SearchStrategy::GreedySwap => Ok(self.greedy_swap(&members, size)),
        }
    }

    fn exhaustive(&self, members: &[ParticipantId], size: usize) -> Result<Team> {
        let combinations = binomial(members.len() as u64, size as u64);
        if let Some(limit) = self.policy.max_combinations {
            if combinations > limit {
                return Err(FormationError::config(
                    "search.max_combinations",
                    format!(
                        "cluster of {} with team size {} needs {} combinations, limit is {}",
                        members.len(),
                        size,
                        combinations,
                        limit
                    ),
                ));
            }
        }

        tracing::debug!(
            "Exhaustive search over {} combinations ({} choose {})",
            combinations,
            members.len(),
            size
        );

        let mut indices: Vec<usize> = (0..size).collect();
        let mut candidate: Vec<ParticipantId> = Vec::with_capacity(size);
        let mut best_team: Vec<ParticipantId> = Vec::new();
        let mut best_score = f64::NEG_INFINITY;

        loop {
            candidate.clear();
            candidate.extend(indices.iter().map(|&i| members[i]));
            let score = self.scorer.score(&candidate, &self.requirement);
            if score > best_score {
                best_score = score;
                best_team.clone_from(&candidate);
            }

            if !next_combination(&mut indices, members.len()) {
                break;
            }
        }

        Ok(Team::new(best_team, best_score))
    }

    fn greedy_swap(&self, members: &[ParticipantId], size: usize) -> Team {
        tracing::debug!(
            "Bounded search for cluster of {} members (threshold {})",
            members.len(),
            self.policy.exhaustive_threshold
        );

        let mut team: Vec<ParticipantId> = Vec::with_capacity(size);
        let mut outside: Vec<ParticipantId> = members.to_vec();

        while team.len() < size {
            let mut pick = 0;
            let mut pick_score = f64::NEG_INFINITY;
            for (position, &candidate) in outside.iter().enumerate() {
                team.push(candidate);
                let score = self.scorer.score(&team, &self.requirement);
                team.pop();
                if score > pick_score {
                    pick = position;
                    pick_score = score;
                }
            }
            team.push(outside.remove(pick));
        }
        team.sort_unstable();

        let mut best_score = self.scorer.score(&team, &self.requirement);
        for round in 0..self.policy.max_swap_rounds {
            let Some((slot, position, score)) = self.first_improving_swap(&team, &outside, best_score) else {
                tracing::debug!("Swap search converged after {} rounds", round);
                break;
            };
            std::mem::swap(&mut team[slot], &mut outside[position]);
            team.sort_unstable();
            outside.sort_unstable();
            best_score = score;
        }

        Team::new(team, best_score)
    }

    fn first_improving_swap(
        &self,
        team: &[ParticipantId],
        outside: &[ParticipantId],
        current: f64,
    ) -> Option<(usize, usize, f64)> {
        let mut candidate = team.to_vec();
        for slot in 0..team.len() {
            for (position, &replacement) in outside.iter().enumerate() {
                candidate[slot] = replacement;
                let score = self.scorer.score(&candidate, &self.requirement);
                if score > current + IMPROVEMENT_EPSILON {
                    return Some((slot, position, score));
                }
            }
            candidate[slot] = team[slot];
        }
        None
    }
}

/// Advances `indices` to the next lexicographic k-combination of `0..n`.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if indices[i] < n - k + i {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// n choose k, saturating at `u64::MAX`.
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * u128::from(n - i) / u128::from(i + 1);
        if result > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    result as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExperienceLevel, Participant};
    use crate::domain::services::scorer::ScoringWeights;

    fn participant(id: usize, skills: &[&str], personality: &str) -> Participant {
        Participant {
            id,
            name: format!("P{}", id),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            interests: Default::default(),
            experience: ExperienceLevel::Intermediate,
            personality: personality.to_string(),
            project_preference: String::new(),
        }
    }

    fn optimizer(cohort: Vec<Participant>, requirement: ProjectRequirement, policy: SearchPolicy) -> LocalOptimizer {
        let scorer = TeamScorer::new(Arc::new(cohort), ScoringWeights::DEFAULT);
        LocalOptimizer::new(scorer, Arc::new(requirement), policy)
    }

    fn skills_cohort() -> Vec<Participant> {
        vec![
            participant(0, &["python"], "Leader"),
            participant(1, &["frontend"], "Leader"),
            participant(2, &["python"], "Leader"),
            participant(3, &["design"], "Leader"),
        ]
    }

    fn skills_requirement() -> ProjectRequirement {
        ProjectRequirement::new(1, 2, ["python", "design"], Vec::<String>::new()).unwrap()
    }

    #[test]
    fn test_next_combination_is_lexicographic() {
        let mut indices = vec![0, 1];
        let mut seen = vec![indices.clone()];
        while next_combination(&mut indices, 4) {
            seen.push(indices.clone());
        }
        assert_eq!(
            seen,
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]
        );
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(12, 4), 495);
        assert_eq!(binomial(4, 0), 1);
        assert_eq!(binomial(3, 5), 0);
        assert_eq!(binomial(200, 100), u64::MAX);
    }

    #[test]
    fn test_ties_keep_first_lexicographic_team() {
        let cohort = vec![
            participant(0, &["python"], "Leader"),
            participant(1, &["python"], "Leader"),
            participant(2, &["python"], "Leader"),
        ];
        let requirement = ProjectRequirement::new(1, 2, ["python"], Vec::<String>::new()).unwrap();
        let optimizer = optimizer(cohort, requirement, SearchPolicy::default());

        let team = optimizer.best_team(&[2, 0, 1]).unwrap();
        assert_eq!(team.members, vec![0, 1]);
    }

    #[test]
    fn test_exhaustive_picks_best_scoring_team() {
        let optimizer = optimizer(skills_cohort(), skills_requirement(), SearchPolicy::default());
        assert_eq!(optimizer.strategy_for(4), SearchStrategy::Exhaustive);

        let team = optimizer.best_team(&[0, 1, 2, 3]).unwrap();
        assert_eq!(team.members, vec![0, 3]);
        assert!((team.core_score - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_greedy_swap_used_above_threshold() {
        let policy = SearchPolicy {
            exhaustive_threshold: 2,
            ..SearchPolicy::default()
        };
        let optimizer = optimizer(skills_cohort(), skills_requirement(), policy);
        assert_eq!(optimizer.strategy_for(4), SearchStrategy::GreedySwap);

        let team = optimizer.best_team(&[0, 1, 2, 3]).unwrap();
        assert_eq!(team.members, vec![0, 3]);
        assert!((team.core_score - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_swap_improves_greedy_seed() {
        // Greedy takes 0 first (covers two skills), then cannot reach full
        // coverage without swapping 0 out for the 1 + 2 pair.
        let cohort = vec![
            participant(0, &["python", "ml"], "Leader"),
            participant(1, &["python", "design"], "Leader"),
            participant(2, &["ml", "frontend"], "Leader"),
            participant(3, &["python"], "Leader"),
        ];
        let requirement = ProjectRequirement::new(1, 2, ["python", "ml", "design", "frontend"], Vec::<String>::new()).unwrap();
        let policy = SearchPolicy {
            exhaustive_threshold: 1,
            ..SearchPolicy::default()
        };
        let bounded = optimizer(cohort.clone(), requirement.clone(), policy);
        let exhaustive = optimizer(cohort, requirement, SearchPolicy::default());

        let members = [0, 1, 2, 3];
        let expected = exhaustive.best_team(&members).unwrap();
        let team = bounded.best_team(&members).unwrap();
        assert_eq!(expected.members, vec![1, 2]);
        assert_eq!(team.members, expected.members);
    }

    #[test]
    fn test_small_cluster_takes_everyone() {
        let requirement = ProjectRequirement::new(1, 10, ["python"], Vec::<String>::new()).unwrap();
        let optimizer = optimizer(skills_cohort(), requirement, SearchPolicy::default());
        let team = optimizer.best_team(&[3, 1]).unwrap();
        assert_eq!(team.members, vec![1, 3]);
    }

    #[test]
    fn test_complexity_guard_aborts() {
        let cohort: Vec<Participant> = (0..10).map(|id| participant(id, &["python"], "Leader")).collect();
        let requirement = ProjectRequirement::new(1, 5, ["python"], Vec::<String>::new()).unwrap();
        let policy = SearchPolicy {
            max_combinations: Some(100),
            ..SearchPolicy::default()
        };
        let optimizer = optimizer(cohort, requirement, policy);
        let members: Vec<usize> = (0..10).collect();

        let err = optimizer.best_team(&members).unwrap_err();
        assert!(matches!(err, FormationError::ConfigError { ref field, .. } if field == "search.max_combinations"));
    }

    #[test]
    fn test_unknown_member_rejected() {
        let optimizer = optimizer(skills_cohort(), skills_requirement(), SearchPolicy::default());
        assert!(optimizer.best_team(&[0, 9]).is_err());
    }
}
