use std::collections::HashSet;
use std::hash::Hash;

/// Similarity metrics between two vectors
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorSimilarity {
    pub cosine: f64,
    pub euclidean: f64,
    /// Absolute per-dimension differences (empty for invalid input)
    pub dimension_differences: Vec<f64>,
}

/// Compute cosine and normalized euclidean similarity in one pass
///
/// Empty or mismatched inputs yield zero for both metrics.
pub fn compute_similarity(a: &[f64], b: &[f64]) -> VectorSimilarity {
    if !comparable(a, b) {
        return VectorSimilarity::default();
    }

    VectorSimilarity {
        cosine: cosine_similarity(a, b),
        euclidean: euclidean_similarity(a, b),
        dimension_differences: a.iter().zip(b).map(|(x, y)| (x - y).abs()).collect(),
    }
}

/// Cosine similarity in [-1, 1]
///
/// Returns 0.0 when either vector has zero magnitude, since a zero vector has
/// no direction.
#[inline]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if !comparable(a, b) {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Euclidean similarity: `1 - distance / sqrt(4n)`
///
/// The normalizer is the largest distance possible when every axis differs by
/// at most 2.
#[inline]
pub fn euclidean_similarity(a: &[f64], b: &[f64]) -> f64 {
    if !comparable(a, b) {
        return 0.0;
    }

    let distance = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();
    let max_distance = (4.0 * a.len() as f64).sqrt();

    1.0 - distance / max_distance
}

/// Jaccard overlap `|A ∩ B| / |A ∪ B|`, zero when both sets are empty
pub fn jaccard_overlap<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }

    a.intersection(b).count() as f64 / union as f64
}

/// Jaccard overlap of two tag lists plus their sorted shared tags
pub fn interest_overlap(a: &[String], b: &[String]) -> (f64, Vec<String>) {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    let mut shared: Vec<String> = set_a
        .intersection(&set_b)
        .map(|tag| tag.to_string())
        .collect();
    shared.sort();

    (jaccard_overlap(&set_a, &set_b), shared)
}

#[inline]
fn comparable(a: &[f64], b: &[f64]) -> bool {
    !a.is_empty() && a.len() == b.len()
}
