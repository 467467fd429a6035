use crate::domain::model::{ParticipantId, Team};
use crate::utils::error::{FormationError, Result};

/// Places participants left out of every searched team.
pub struct OverflowAssigner;

impl OverflowAssigner {
    /// Ids `0..cohort_size` not present in any team, ascending.
    pub fn leftovers(cohort_size: usize, teams: &[Team]) -> Vec<ParticipantId> {
        let mut placed = vec![false; cohort_size];
        for id in teams.iter().flat_map(|team| team.members.iter()) {
            if let Some(slot) = placed.get_mut(*id) {
                *slot = true;
            }
        }
        (0..cohort_size).filter(|&id| !placed[id]).collect()
    }

    /// Round-robin in leftover order, starting from the first team.
    pub fn distribute(teams: &mut [Team], leftovers: &[ParticipantId]) -> Result<()> {
        if leftovers.is_empty() {
            return Ok(());
        }
        if teams.is_empty() {
            return Err(FormationError::integrity(format!(
                "{} participants left over but no team was formed",
                leftovers.len()
            )));
        }

        let team_count = teams.len();
        for (index, &id) in leftovers.iter().enumerate() {
            teams[index % team_count].members.push(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leftovers_are_ascending() {
        let teams = vec![Team::new(vec![0, 4], 0.5), Team::new(vec![2], 0.3)];
        assert_eq!(OverflowAssigner::leftovers(6, &teams), vec![1, 3, 5]);
    }

    #[test]
    fn test_round_robin_distribution() {
        let mut teams = vec![Team::new(vec![0], 0.0), Team::new(vec![1], 0.0)];
        OverflowAssigner::distribute(&mut teams, &[2, 3, 4]).unwrap();
        assert_eq!(teams[0].members, vec![0, 2, 4]);
        assert_eq!(teams[1].members, vec![1, 3]);
    }

    #[test]
    fn test_leftovers_without_teams_is_an_integrity_error() {
        let err = OverflowAssigner::distribute(&mut [], &[0]).unwrap_err();
        assert!(matches!(err, FormationError::IntegrityError { .. }));
    }
}
