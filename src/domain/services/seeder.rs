//! Seeded k-means over the feature matrix.
//!
//! Seeding is k-means++ driven by `StdRng::seed_from_u64`; the best of
//! `n_init` restarts (lowest inertia, earliest on ties) is kept. After
//! convergence empty clusters are filled from the largest cluster, so the
//! number of non-empty clusters always equals `k`.

use crate::domain::model::ParticipantId;
use crate::domain::services::encoder::FeatureMatrix;
use crate::utils::error::{FormationError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_SEED: u64 = 42;
const DEFAULT_RESTARTS: usize = 10;
const DEFAULT_MAX_ITERATIONS: usize = 300;
const DEFAULT_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSeeder {
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
    /// Lloyd iterations stop once the largest squared centroid shift is at or below this.
    pub tolerance: f64,
}

impl Default for ClusterSeeder {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Seed-cluster labels. Discarded once per-cluster optimization starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    labels: Vec<usize>,
    k: usize,
}

impl Clustering {
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Member ids per cluster, each list ascending.
    pub fn members(&self) -> Vec<Vec<ParticipantId>> {
        let mut members = vec![Vec::new(); self.k];
        for (id, &label) in self.labels.iter().enumerate() {
            members[label].push(id);
        }
        members
    }
}

struct Solution {
    labels: Vec<usize>,
    centroids: Vec<Vec<f64>>,
    inertia: f64,
}

impl ClusterSeeder {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            restarts: DEFAULT_RESTARTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Partitions the cohort into `k` clusters; `k` is clamped to `[1, cohort size]`.
    pub fn seed_clusters(&self, features: &FeatureMatrix, k: usize) -> Result<Clustering> {
        let rows = features.rows();
        if rows.is_empty() {
            return Err(FormationError::validation("participants", "cohort is empty"));
        }

        let k = k.clamp(1, rows.len());
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best: Option<Solution> = None;
        for restart in 0..self.restarts.max(1) {
            let solution = self.lloyd(rows, k, &mut rng);
            tracing::debug!("k-means restart {}: inertia {:.6}", restart, solution.inertia);
            if best.as_ref().map_or(true, |b| solution.inertia < b.inertia) {
                best = Some(solution);
            }
        }

        let Some(mut best) = best else {
            return Err(FormationError::integrity("k-means produced no solution"));
        };
        fill_empty_clusters(rows, &mut best.labels, &mut best.centroids);

        Ok(Clustering {
            labels: best.labels,
            k,
        })
    }

    fn lloyd(&self, rows: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Solution {
        let mut centroids = kmeans_plus_plus(rows, k, rng);
        let mut labels = assign_nearest(rows, &centroids);

        for _ in 0..self.max_iterations {
            let updated = compute_centroids(rows, &labels, &centroids);
            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| squared_distance(old, new))
                .fold(0.0, f64::max);
            centroids = updated;
            labels = assign_nearest(rows, &centroids);
            if shift <= self.tolerance {
                break;
            }
        }

        let inertia = rows
            .iter()
            .zip(&labels)
            .map(|(row, &label)| squared_distance(row, &centroids[label]))
            .sum();

        Solution {
            labels,
            centroids,
            inertia,
        }
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// k-means++ seeding. A point already chosen has zero weight and is never
/// picked twice; when all remaining weight is zero the lowest unchosen
/// index is taken.
fn kmeans_plus_plus(rows: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut chosen = vec![false; n];
    let first = rng.gen_range(0..n);
    chosen[first] = true;

    let mut centroids = vec![rows[first].clone()];
    let mut min_distances: Vec<f64> = rows.iter().map(|row| squared_distance(row, &rows[first])).collect();

    while centroids.len() < k {
        let total: f64 = min_distances.iter().sum();
        let next = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut picked = None;
            let mut last_positive = None;
            for (i, &d) in min_distances.iter().enumerate() {
                if d <= 0.0 || chosen[i] {
                    continue;
                }
                last_positive = Some(i);
                cumulative += d;
                if cumulative > target {
                    picked = Some(i);
                    break;
                }
            }
            picked.or(last_positive)
        } else {
            None
        };

        let Some(next) = next.or_else(|| chosen.iter().position(|taken| !taken)) else {
            break;
        };

        chosen[next] = true;
        centroids.push(rows[next].clone());
        for (i, row) in rows.iter().enumerate() {
            let d = squared_distance(row, &rows[next]);
            if d < min_distances[i] {
                min_distances[i] = d;
            }
        }
    }

    centroids
}

/// Nearest centroid per row; ties go to the lower centroid index.
fn assign_nearest(rows: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    rows.iter()
        .map(|row| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (index, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(row, centroid);
                if d < best_distance {
                    best = index;
                    best_distance = d;
                }
            }
            best
        })
        .collect()
}

/// Mean of assigned rows; an empty cluster keeps its previous centroid.
fn compute_centroids(rows: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dims = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dims]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (row, &label) in rows.iter().zip(labels) {
        counts[label] += 1;
        for (sum, value) in sums[label].iter_mut().zip(row) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), old)| {
            if count == 0 {
                return old.clone();
            }
            for value in sum.iter_mut() {
                *value /= count as f64;
            }
            sum
        })
        .collect()
}

/// Moves, for each empty cluster, the member of the largest cluster that
/// lies farthest from its centroid. Requires `k <= rows.len()`.
fn fill_empty_clusters(rows: &[Vec<f64>], labels: &mut [usize], centroids: &mut [Vec<f64>]) {
    loop {
        let mut counts = vec![0usize; centroids.len()];
        for &label in labels.iter() {
            counts[label] += 1;
        }

        let Some(empty) = counts.iter().position(|&count| count == 0) else {
            return;
        };

        let mut donor = 0;
        for (cluster, &count) in counts.iter().enumerate() {
            if count > counts[donor] {
                donor = cluster;
            }
        }
        if counts[donor] <= 1 {
            return;
        }

        let mut farthest = None;
        let mut farthest_distance = -1.0;
        for (id, &label) in labels.iter().enumerate() {
            if label != donor {
                continue;
            }
            let d = squared_distance(&rows[id], &centroids[donor]);
            if d > farthest_distance {
                farthest = Some(id);
                farthest_distance = d;
            }
        }

        let Some(moved) = farthest else {
            return;
        };
        tracing::debug!("Refilling empty cluster {} with participant {}", empty, moved);
        labels[moved] = empty;
        centroids[empty] = rows[moved].clone();
    }
}
