use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::models::domain::{ScoredCandidate, SimilarUser, UserCluster};

/// Response for a ranking request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    pub matches: Vec<ScoredCandidate>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub diversified: bool,
    #[serde(rename = "modelVersion")]
    pub model_version: Option<String>,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Response for a pair score request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: f64,
    pub features: BTreeMap<String, f64>,
    #[serde(rename = "modelVersion")]
    pub model_version: Option<String>,
}

/// Response for an embedding-similarity request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarResponse {
    #[serde(rename = "similarUsers")]
    pub similar_users: Vec<SimilarUser>,
}

/// Response for a clustering request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterResponse {
    pub clusters: Vec<UserCluster>,
    pub skipped: usize,
    pub iterations: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
