// Core algorithm exports
pub mod clustering;
pub mod features;
pub mod matcher;
pub mod sampling;
pub mod scoring;
pub mod similarity;

pub use clustering::{cluster_users, ClusterResult, DEFAULT_CLUSTER_SEED};
pub use features::{build_features, explain_features};
pub use matcher::{Matcher, MatchResult};
pub use sampling::{diversity_weights, sample_without_replacement};
pub use scoring::{FeatureScaler, MatchScorer, Scorer};
pub use similarity::{compute_similarity, cosine_similarity, euclidean_similarity, jaccard_overlap};

use thiserror::Error;

/// Errors raised by the scoring and ranking engine
///
/// Missing profile data and an absent scorer are not errors: both resolve to
/// defined defaults. Only configuration inconsistencies surface here.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Scorer returned {actual} scores for {expected} feature rows")]
    InvalidScore { expected: usize, actual: usize },

    #[error("Diversity sampling failed: {0}")]
    Sampling(#[from] rand::distributions::WeightedError),
}

pub type Result<T> = std::result::Result<T, MatchError>;
