use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Default personality weight when a user has not stated a preference
pub const DEFAULT_PERSONALITY_WEIGHT: f64 = 0.7;
/// Default interests weight when a user has not stated a preference
pub const DEFAULT_INTERESTS_WEIGHT: f64 = 0.3;
/// Default diversity factor applied to ranked results
pub const DEFAULT_DIVERSITY_FACTOR: f64 = 0.2;
/// Default user score
pub const DEFAULT_USER_SCORE: f64 = 0.0;

/// Number of values in a pairwise feature vector
pub const FEATURE_COUNT: usize = 12;

/// Feature names in vector order. Trained artifacts are validated against this list.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "personality_cosine_sim",
    "personality_euclidean_sim",
    "interest_sim",
    "user_score_i",
    "user_score_j",
    "user_score_diff",
    "pref_personality_i",
    "pref_personality_j",
    "pref_interests_i",
    "pref_interests_j",
    "pref_diversity_i",
    "pref_diversity_j",
];

/// User profile with personality, interest and preference data
///
/// Every optional field resolves to a fixed default through its accessor,
/// so scoring code never sees a missing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "userId")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "personalityVector", alias = "personality_vector", default)]
    pub personality_vector: Option<Vec<f64>>,
    #[serde(rename = "interestEmbedding", alias = "interest_embedding", default)]
    pub interest_embedding: Option<Vec<f64>>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(rename = "userScore", alias = "user_score", default)]
    pub user_score: Option<f64>,
    #[serde(rename = "prefPersonalityWeight", alias = "pref_personality_weight", default)]
    pub pref_personality_weight: Option<f64>,
    #[serde(rename = "prefInterestsWeight", alias = "pref_interests_weight", default)]
    pub pref_interests_weight: Option<f64>,
    #[serde(rename = "prefDiversityFactor", alias = "pref_diversity_factor", default)]
    pub pref_diversity_factor: Option<f64>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Personality vector, treating an empty vector as absent
    pub fn personality(&self) -> Option<&[f64]> {
        non_empty(&self.personality_vector)
    }

    /// Interest embedding, treating an empty vector as absent
    pub fn interest_embedding(&self) -> Option<&[f64]> {
        non_empty(&self.interest_embedding)
    }

    pub fn score(&self) -> f64 {
        self.user_score.unwrap_or(DEFAULT_USER_SCORE)
    }

    pub fn personality_weight(&self) -> f64 {
        self.pref_personality_weight.unwrap_or(DEFAULT_PERSONALITY_WEIGHT)
    }

    pub fn interests_weight(&self) -> f64 {
        self.pref_interests_weight.unwrap_or(DEFAULT_INTERESTS_WEIGHT)
    }

    pub fn diversity_factor(&self) -> f64 {
        self.pref_diversity_factor.unwrap_or(DEFAULT_DIVERSITY_FACTOR)
    }
}

fn non_empty(vector: &Option<Vec<f64>>) -> Option<&[f64]> {
    vector.as_deref().filter(|v| !v.is_empty())
}

/// Fixed-order pairwise feature vector consumed by the trained scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub const PERSONALITY_COSINE: usize = 0;
    pub const PERSONALITY_EUCLIDEAN: usize = 1;
    pub const INTEREST_COSINE: usize = 2;

    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Mean of the cosine and euclidean personality similarities
    pub fn personality_similarity(&self) -> f64 {
        (self.0[Self::PERSONALITY_COSINE] + self.0[Self::PERSONALITY_EUCLIDEAN]) / 2.0
    }

    pub fn interest_similarity(&self) -> f64 {
        self.0[Self::INTEREST_COSINE]
    }

    /// Pair every value with its feature name
    pub fn named(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES.iter().copied().zip(self.0).collect()
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// A candidate scored against a target user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub user: UserProfile,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    #[serde(rename = "sharedInterests", default)]
    pub shared_interests: Vec<String>,
    #[serde(rename = "interestOverlap", default)]
    pub interest_overlap: f64,
}

/// Candidate ranked by raw embedding similarity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarUser {
    pub user: UserProfile,
    pub similarity: f64,
}

/// Group of users with nearby interest embeddings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCluster {
    #[serde(rename = "clusterId", alias = "cluster_id")]
    pub cluster_id: usize,
    pub members: Vec<UserProfile>,
}
