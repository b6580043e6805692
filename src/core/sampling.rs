use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::Result;

/// Turn candidate scores into selection weights flattened toward uniform
///
/// Scores are normalized to sum to one and blended with the uniform
/// distribution: `p' = p * (1 - factor) + factor / n`. Negative scores count as
/// zero, and a pool whose scores sum to zero starts from the uniform
/// distribution. `factor` is clamped to [0, 1].
pub fn diversity_weights(scores: &[f64], factor: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let factor = factor.clamp(0.0, 1.0);
    let n = scores.len() as f64;
    let clipped: Vec<f64> = scores
        .iter()
        .map(|s| if s.is_finite() { s.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = clipped.iter().sum();

    clipped
        .into_iter()
        .map(|s| {
            let p = if total > 0.0 { s / total } else { 1.0 / n };
            p * (1.0 - factor) + factor / n
        })
        .collect()
}

/// Draw `amount` distinct indices into `weights`, weighted, without replacement
///
/// Returns every index when `amount` exceeds the number of weights. Order of
/// the returned indices follows the draw, not the input.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    weights: &[f64],
    amount: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let indices: Vec<usize> = (0..weights.len()).collect();
    let chosen = indices.choose_multiple_weighted(rng, amount, |&i| weights[i])?;
    Ok(chosen.copied().collect())
}
