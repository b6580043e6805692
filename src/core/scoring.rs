use std::fmt;
use std::sync::Arc;

use crate::core::features::{build_features, interest_similarity, personality_similarity};
use crate::core::{MatchError, Result};
use crate::models::{FeatureVector, UserProfile, FEATURE_COUNT};

/// Share of the final score taken from the trained model
pub const MODEL_BLEND_WEIGHT: f64 = 0.7;
/// Share of the final score taken from the user's stated preferences
pub const PREFERENCE_BLEND_WEIGHT: f64 = 1.0 - MODEL_BLEND_WEIGHT;

/// A trained model mapping feature rows to match probabilities
pub trait Scorer: Send + Sync {
    /// Score each row; implementations return one value per row
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>>;

    /// Number of features the model was trained on
    fn expected_features(&self) -> usize {
        FEATURE_COUNT
    }

    /// Artifact version, if the scorer has one
    fn version(&self) -> Option<&str> {
        None
    }
}

/// A fitted normalizer that maps features onto the training distribution
pub trait FeatureScaler: Send + Sync {
    /// Map rows onto the training distribution
    fn transform(&self, features: &[FeatureVector]) -> Result<Vec<FeatureVector>>;

    /// An unfitted scaler is skipped entirely
    fn is_fitted(&self) -> bool;
}

/// Pairwise match scorer
///
/// Holds an optional trained scorer and scaler. Without a scorer every
/// prediction goes through the preference heuristic.
#[derive(Clone, Default)]
pub struct MatchScorer {
    scorer: Option<Arc<dyn Scorer>>,
    scaler: Option<Arc<dyn FeatureScaler>>,
}

impl MatchScorer {
    pub fn new(scorer: Option<Arc<dyn Scorer>>, scaler: Option<Arc<dyn FeatureScaler>>) -> Self {
        Self { scorer, scaler }
    }

    /// Scorer that always uses the preference heuristic
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn with_scorer(scorer: Arc<dyn Scorer>) -> Self {
        Self {
            scorer: Some(scorer),
            scaler: None,
        }
    }

    pub fn with_scaler(mut self, scaler: Arc<dyn FeatureScaler>) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn has_model(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn model_version(&self) -> Option<&str> {
        self.scorer.as_deref().and_then(|s| s.version())
    }

    /// Predict how well `user_j` satisfies `user_i`'s preferences
    ///
    /// Directional: preference weights always come from `user_i`. The blended
    /// score is not clamped, so it can leave [0, 1] when the model and the
    /// preference score disagree with out-of-range weights.
    pub fn predict_match_score(&self, user_i: &UserProfile, user_j: &UserProfile) -> Result<f64> {
        let Some(scorer) = self.scorer.as_deref() else {
            return Ok(fallback_score(user_i, user_j));
        };

        let features = build_features(user_i, user_j);
        let raw = self.model_score(scorer, features)?;

        let preference = features.personality_similarity() * user_i.personality_weight()
            + features.interest_similarity() * user_i.interests_weight();

        Ok(MODEL_BLEND_WEIGHT * raw + PREFERENCE_BLEND_WEIGHT * preference)
    }

    fn model_score(&self, scorer: &dyn Scorer, features: FeatureVector) -> Result<f64> {
        let expected = scorer.expected_features();
        if expected != features.len() {
            return Err(MatchError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        let rows = match self.scaler.as_deref() {
            Some(scaler) if scaler.is_fitted() => scaler.transform(&[features])?,
            _ => vec![features],
        };

        let scores = scorer.predict(&rows)?;
        match scores.as_slice() {
            [score] => Ok(*score),
            _ => Err(MatchError::InvalidScore {
                expected: 1,
                actual: scores.len(),
            }),
        }
    }
}

impl fmt::Debug for MatchScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchScorer")
            .field("model_version", &self.model_version())
            .field("has_model", &self.has_model())
            .field("scaler_fitted", &self.scaler.as_deref().map(|s| s.is_fitted()))
            .finish()
    }
}

/// Preference-weighted similarity used when no model is loaded
///
/// Personality uses plain cosine similarity here, not the cosine/euclidean
/// mean used in the model blend.
#[inline]
pub fn fallback_score(user_i: &UserProfile, user_j: &UserProfile) -> f64 {
    personality_similarity(user_i, user_j) * user_i.personality_weight()
        + interest_similarity(user_i, user_j) * user_i.interests_weight()
}
