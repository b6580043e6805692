//! Lume Affinity - match scoring and diversity-aware ranking for Lume
//!
//! This library predicts a directional compatibility score between two users
//! and ranks candidate pools, mixing guaranteed top matches with a weighted
//! random sample so results are not a pure score-sorted list.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{build_features, MatchError, MatchResult, MatchScorer, Matcher};
pub use crate::models::{FeatureVector, ScoredCandidate, UserProfile, FEATURE_COUNT, FEATURE_NAMES};
pub use crate::services::ModelRegistry;
