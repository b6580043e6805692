use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::core::{MatchError, Result};
use crate::models::{UserCluster, UserProfile};

/// Seed used when a caller does not pick one, so repeated runs agree
pub const DEFAULT_CLUSTER_SEED: u64 = 42;

/// Upper bound on Lloyd iterations
pub const MAX_ITERATIONS: usize = 300;

/// Result of clustering a set of profiles
#[derive(Debug, Clone, Default)]
pub struct ClusterResult {
    pub clusters: Vec<UserCluster>,
    /// Profiles left out for lack of an interest embedding
    pub skipped: usize,
    /// Lloyd iterations run before assignments settled
    pub iterations: usize,
}

/// Group profiles by interest embedding with k-means
///
/// # Algorithm
/// 1. Seed centroids with k-means++ drawn from `rng`
/// 2. Assign each profile to its nearest centroid
/// 3. Move centroids to the mean of their members
/// 4. Repeat until assignments settle or `MAX_ITERATIONS` is reached
///
/// Clusters are numbered in order of first appearance in `profiles`, and
/// empty clusters are dropped. Asking for more clusters than there are
/// profiles yields at most one cluster per profile.
pub fn cluster_users<R: Rng + ?Sized>(
    profiles: Vec<UserProfile>,
    n_clusters: usize,
    rng: &mut R,
) -> Result<ClusterResult> {
    let total = profiles.len();
    let (members, points): (Vec<UserProfile>, Vec<Vec<f64>>) = profiles
        .into_iter()
        .filter_map(|profile| {
            let embedding = profile.interest_embedding()?.to_vec();
            Some((profile, embedding))
        })
        .unzip();
    let skipped = total - members.len();

    if let Some(first) = points.first() {
        let expected = first.len();
        if let Some(point) = points.iter().find(|p| p.len() != expected) {
            return Err(MatchError::DimensionMismatch {
                expected,
                actual: point.len(),
            });
        }
    }

    let k = n_clusters.min(points.len());
    if k == 0 {
        return Ok(ClusterResult {
            clusters: Vec::new(),
            skipped,
            iterations: 0,
        });
    }

    let mut centroids = kmeans_plus_plus(&points, k, rng)?;
    let mut assignments = assign(&points, &centroids);
    let mut iterations = 1;

    while iterations < MAX_ITERATIONS {
        update_centroids(&points, &assignments, &mut centroids);
        let next = assign(&points, &centroids);
        if next == assignments {
            break;
        }
        assignments = next;
        iterations += 1;
    }

    let clusters = group_members(members, &assignments, k);

    tracing::debug!(
        "Clustered {} profiles into {} groups in {} iterations ({} skipped)",
        points.len(),
        clusters.len(),
        iterations,
        skipped
    );

    Ok(ClusterResult {
        clusters,
        skipped,
        iterations,
    })
}

/// Pick `k` starting centroids, each new one weighted by squared distance to
/// the nearest centroid chosen so far
fn kmeans_plus_plus<R: Rng + ?Sized>(
    points: &[Vec<f64>],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());

    let mut min_distances = vec![f64::MAX; points.len()];

    while centroids.len() < k {
        if let Some(last) = centroids.last() {
            for (distance, point) in min_distances.iter_mut().zip(points) {
                *distance = distance.min(squared_distance(point, last));
            }
        }

        // Every point already sits on a centroid
        let total: f64 = min_distances.iter().sum();
        let next = if total > 0.0 {
            WeightedIndex::<f64>::new(&min_distances)?.sample(rng)
        } else {
            rng.gen_range(0..points.len())
        };
        centroids.push(points[next].clone());
    }

    Ok(centroids)
}

fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points.iter().map(|point| nearest(point, centroids)).collect()
}

/// Index of the closest centroid; ties go to the lower index
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}

/// Move each centroid to its members' mean; empty clusters stay put
fn update_centroids(points: &[Vec<f64>], assignments: &[usize], centroids: &mut [Vec<f64>]) {
    let dim = points.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dim]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point) {
            *sum += value;
        }
    }

    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *centroid = sum.into_iter().map(|s| s / count as f64).collect();
        }
    }
}

fn group_members(members: Vec<UserProfile>, assignments: &[usize], k: usize) -> Vec<UserCluster> {
    let mut labels: Vec<Option<usize>> = vec![None; k];
    let mut clusters: Vec<UserCluster> = Vec::new();

    for (member, &centroid) in members.into_iter().zip(assignments) {
        let label = match labels[centroid] {
            Some(label) => label,
            None => {
                let label = clusters.len();
                clusters.push(UserCluster {
                    cluster_id: label,
                    members: Vec::new(),
                });
                labels[centroid] = Some(label);
                label
            }
        };
        clusters[label].members.push(member);
    }

    clusters
}

#[inline]
fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
