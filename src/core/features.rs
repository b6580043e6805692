use crate::core::similarity::{compute_similarity, cosine_similarity};
use crate::models::{FeatureVector, UserProfile};

/// Similarity substituted when either user lacks the underlying vector
pub const MISSING_SIMILARITY: f64 = 0.5;

/// Build the pairwise feature vector for `user_i` looking at `user_j`
///
/// The order of values is fixed and matches [`crate::models::FEATURE_NAMES`]:
/// trained scorers are positionally sensitive, so missing data is replaced by
/// defaults rather than omitted.
pub fn build_features(user_i: &UserProfile, user_j: &UserProfile) -> FeatureVector {
    let (personality_cosine, personality_euclidean) =
        match (user_i.personality(), user_j.personality()) {
            (Some(a), Some(b)) => {
                let sim = compute_similarity(a, b);
                (sim.cosine, sim.euclidean)
            }
            _ => (MISSING_SIMILARITY, MISSING_SIMILARITY),
        };

    let score_i = user_i.score();
    let score_j = user_j.score();

    FeatureVector::new([
        personality_cosine,
        personality_euclidean,
        interest_similarity(user_i, user_j),
        score_i,
        score_j,
        (score_i - score_j).abs(),
        user_i.personality_weight(),
        user_j.personality_weight(),
        user_i.interests_weight(),
        user_j.interests_weight(),
        user_i.diversity_factor(),
        user_j.diversity_factor(),
    ])
}

/// Personality cosine similarity, or the missing-data default
#[inline]
pub fn personality_similarity(user_i: &UserProfile, user_j: &UserProfile) -> f64 {
    match (user_i.personality(), user_j.personality()) {
        (Some(a), Some(b)) => cosine_similarity(a, b),
        _ => MISSING_SIMILARITY,
    }
}

/// Interest-embedding cosine similarity, or the missing-data default
#[inline]
pub fn interest_similarity(user_i: &UserProfile, user_j: &UserProfile) -> f64 {
    match (user_i.interest_embedding(), user_j.interest_embedding()) {
        (Some(a), Some(b)) => cosine_similarity(a, b),
        _ => MISSING_SIMILARITY,
    }
}

/// Named feature values for a pair, for logging and inspection
pub fn explain_features(user_i: &UserProfile, user_j: &UserProfile) -> Vec<(&'static str, f64)> {
    build_features(user_i, user_j).named()
}
