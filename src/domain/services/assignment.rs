use crate::domain::model::{AuditEntry, Participant, ParticipantId, ProjectRequirement, Team};
use crate::domain::services::encoder::FeatureEncoder;
use crate::domain::services::optimizer::{LocalOptimizer, SearchPolicy};
use crate::domain::services::overflow::OverflowAssigner;
use crate::domain::services::scorer::{ScoringWeights, TeamScorer};
use crate::domain::services::seeder::ClusterSeeder;
use crate::utils::error::{FormationError, Result};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Run progression. Any failure aborts the run; there is no resumable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStage {
    Idle,
    Encoded,
    Clustered,
    Optimized,
    Merged,
    Done,
}

impl fmt::Display for AssignmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Encoded => "encoded",
            Self::Clustered => "clustered",
            Self::Optimized => "optimized",
            Self::Merged => "merged",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

fn transition(from: AssignmentStage, to: AssignmentStage) -> AssignmentStage {
    tracing::debug!("Assignment stage {} -> {}", from, to);
    to
}

/// Final participant→group mapping. Groups are 1-indexed in team order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentResult {
    groups: Vec<usize>,
    teams: Vec<Team>,
    audit: Vec<AuditEntry>,
}

impl AssignmentResult {
    /// Checks that every participant sits in exactly one team.
    pub fn merge(participants: &[Participant], teams: Vec<Team>) -> Result<Self> {
        let mut groups: Vec<Option<usize>> = vec![None; participants.len()];

        for (index, team) in teams.iter().enumerate() {
            let group = index + 1;
            for &id in &team.members {
                let slot = groups.get_mut(id).ok_or_else(|| {
                    FormationError::integrity(format!("group {} contains unknown participant {}", group, id))
                })?;
                if let Some(previous) = slot.replace(group) {
                    return Err(FormationError::integrity(format!(
                        "participant {} assigned to groups {} and {}",
                        id, previous, group
                    )));
                }
            }
        }

        let groups = groups
            .into_iter()
            .enumerate()
            .map(|(id, group)| {
                group.ok_or_else(|| FormationError::integrity(format!("participant {} is unassigned", id)))
            })
            .collect::<Result<Vec<_>>>()?;

        let audit = participants
            .iter()
            .zip(&groups)
            .map(|(participant, &group)| AuditEntry {
                id: participant.id,
                name: participant.name.clone(),
                group,
            })
            .collect();

        Ok(Self { groups, teams, audit })
    }

    pub fn group_of(&self, id: ParticipantId) -> Option<usize> {
        self.groups.get(id).copied()
    }

    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn audit(&self) -> &[AuditEntry] {
        &self.audit
    }

    pub fn group_count(&self) -> usize {
        self.teams.len()
    }
}

/// Clustered cohort ready for per-cluster search.
///
/// Each cluster search only reads shared state, so [`AssignmentPlan::optimizer`]
/// can be cloned into worker tasks and results merged back in cluster order.
#[derive(Debug, Clone)]
pub struct AssignmentPlan {
    cohort: Arc<Vec<Participant>>,
    clusters: Vec<Vec<ParticipantId>>,
    optimizer: LocalOptimizer,
}

impl AssignmentPlan {
    pub fn clusters(&self) -> &[Vec<ParticipantId>] {
        &self.clusters
    }

    pub fn optimizer(&self) -> &LocalOptimizer {
        &self.optimizer
    }

    pub fn optimize_cluster(&self, index: usize) -> Result<Team> {
        let members = self
            .clusters
            .get(index)
            .ok_or_else(|| FormationError::integrity(format!("no cluster {}", index)))?;
        self.optimizer.best_team(members)
    }

    /// Places leftovers and freezes the result. `teams` must be in cluster order.
    pub fn finish(self, mut teams: Vec<Team>) -> Result<AssignmentResult> {
        let stage = transition(AssignmentStage::Clustered, AssignmentStage::Optimized);
        if teams.len() != self.clusters.len() {
            return Err(FormationError::integrity(format!(
                "expected {} teams, got {}",
                self.clusters.len(),
                teams.len()
            )));
        }

        for (index, (members, team)) in self.clusters.iter().zip(&teams).enumerate() {
            let spill = members.len().saturating_sub(team.len());
            if spill > team.len() {
                tracing::warn!(
                    "⚠️ Cluster {} spilled {} of {} members into overflow",
                    index + 1,
                    spill,
                    members.len()
                );
            }
        }

        let leftovers = OverflowAssigner::leftovers(self.cohort.len(), &teams);
        if !leftovers.is_empty() {
            tracing::info!(
                "↪️ Distributing {} overflow participants across {} teams",
                leftovers.len(),
                teams.len()
            );
        }
        OverflowAssigner::distribute(&mut teams, &leftovers)?;

        let result = AssignmentResult::merge(&self.cohort, teams)?;
        let stage = transition(stage, AssignmentStage::Merged);
        transition(stage, AssignmentStage::Done);
        Ok(result)
    }
}

/// Drives encode → cluster → optimize → overflow → merge.
#[derive(Debug, Clone, Default)]
pub struct TeamAssigner {
    seeder: ClusterSeeder,
    weights: ScoringWeights,
    policy: SearchPolicy,
}

impl TeamAssigner {
    pub fn new(seed: u64) -> Self {
        Self {
            seeder: ClusterSeeder::new(seed),
            ..Self::default()
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_search_policy(mut self, policy: SearchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn plan(&self, participants: Vec<Participant>, requirement: ProjectRequirement) -> Result<AssignmentPlan> {
        self.weights.validate()?;
        if participants.is_empty() {
            return Err(FormationError::validation("participants", "cohort is empty"));
        }
        if let Some((position, participant)) = participants.iter().enumerate().find(|(i, p)| p.id != *i) {
            return Err(FormationError::validation(
                "participants",
                format!("participant '{}' at position {} has id {}", participant.name, position, participant.id),
            ));
        }

        let stage = AssignmentStage::Idle;
        let features = FeatureEncoder::encode(&participants);
        let stage = transition(stage, AssignmentStage::Encoded);

        let k = requirement.teams_for(participants.len());
        let clustering = self.seeder.seed_clusters(&features, k)?;
        let clusters = clustering.members();
        transition(stage, AssignmentStage::Clustered);

        tracing::info!(
            "🧩 Seeded {} clusters for {} participants (sizes: {:?})",
            clusters.len(),
            participants.len(),
            clusters.iter().map(Vec::len).collect::<Vec<_>>()
        );
        for (index, members) in clusters.iter().enumerate() {
            if members.len() > requirement.team_size() {
                tracing::debug!(
                    "Cluster {} has {} members for team size {}; {} will overflow",
                    index,
                    members.len(),
                    requirement.team_size(),
                    members.len() - requirement.team_size()
                );
            }
        }

        let cohort = Arc::new(participants);
        let scorer = TeamScorer::new(Arc::clone(&cohort), self.weights);
        let optimizer = LocalOptimizer::new(scorer, Arc::new(requirement), self.policy);

        Ok(AssignmentPlan {
            cohort,
            clusters,
            optimizer,
        })
    }

    /// Sequential run of the whole assignment.
    pub fn assign(&self, participants: Vec<Participant>, requirement: ProjectRequirement) -> Result<AssignmentResult> {
        let plan = self.plan(participants, requirement)?;
        let teams = (0..plan.clusters().len())
            .map(|index| plan.optimize_cluster(index))
            .collect::<Result<Vec<_>>>()?;
        plan.finish(teams)
    }
}
