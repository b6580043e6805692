use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::UserProfile;

/// Request to rank a candidate pool for a target user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    #[validate(custom(function = "validate_profile_id"))]
    pub target: UserProfile,
    #[serde(default)]
    pub candidates: Vec<UserProfile>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(alias = "diversity_factor", rename = "diversityFactor", default)]
    pub diversity_factor: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Request to score a single user pair
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScoreRequest {
    #[validate(custom(function = "validate_profile_id"))]
    #[serde(alias = "user_i", rename = "userI")]
    pub user_i: UserProfile,
    #[validate(custom(function = "validate_profile_id"))]
    #[serde(alias = "user_j", rename = "userJ")]
    pub user_j: UserProfile,
}

/// Request for embedding-similarity lookup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SimilarRequest {
    #[validate(custom(function = "validate_profile_id"))]
    pub target: UserProfile,
    #[serde(default)]
    pub candidates: Vec<UserProfile>,
    #[validate(range(min = 1, max = 100))]
    #[serde(alias = "top_n", rename = "topN", default = "default_top_n")]
    pub top_n: usize,
}

/// Request to group profiles by interest embedding
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClusterRequest {
    #[serde(alias = "users", default)]
    pub profiles: Vec<UserProfile>,
    #[validate(range(min = 1, max = 50))]
    #[serde(alias = "n_clusters", rename = "nClusters", default = "default_n_clusters")]
    pub n_clusters: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_top_n() -> usize {
    2
}

fn default_n_clusters() -> usize {
    2
}

fn validate_profile_id(profile: &UserProfile) -> Result<(), validator::ValidationError> {
    if profile.id.trim().is_empty() {
        return Err(validator::ValidationError::new("empty_user_id"));
    }
    Ok(())
}

impl RankRequest {
    /// Resolve the requested limit; non-positive limits become zero
    pub fn resolved_limit(&self, default_limit: usize, max_limit: usize) -> usize {
        match self.limit {
            None => default_limit.min(max_limit),
            Some(limit) if limit <= 0 => 0,
            Some(limit) => usize::try_from(limit).unwrap_or(max_limit).min(max_limit),
        }
    }
}
