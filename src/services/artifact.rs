use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::{FeatureScaler, MatchError, Scorer};
use crate::models::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Errors that can occur while loading model artifacts
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Incompatible artifact: {0}")]
    Incompatible(String),
}

/// Logistic regression scorer loaded from a JSON artifact
///
/// Artifact layout:
/// ```json
/// {
///   "version": "2024-06-01",
///   "trainedAt": "2024-06-01T12:00:00Z",
///   "featureNames": ["personality_cosine_sim", "..."],
///   "weights": [0.8, "..."],
///   "bias": -0.2
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticScorer {
    pub version: String,
    #[serde(rename = "trainedAt", alias = "trained_at", default)]
    pub trained_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "featureNames", alias = "feature_names")]
    pub feature_names: Vec<String>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
}

impl LogisticScorer {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let scorer: Self = serde_json::from_str(&read_artifact(path.as_ref())?)?;
        scorer.validate()?;
        Ok(scorer)
    }

    /// Check the artifact was trained on the current feature layout
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(ArtifactError::Incompatible(format!(
                "expected {} weights, got {}",
                FEATURE_COUNT,
                self.weights.len()
            )));
        }

        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
            return Err(ArtifactError::Incompatible(format!(
                "feature names {:?} do not match {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }

        Ok(())
    }
}

impl Scorer for LogisticScorer {
    fn predict(&self, features: &[FeatureVector]) -> crate::core::Result<Vec<f64>> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(MatchError::DimensionMismatch {
                expected: self.weights.len(),
                actual: FEATURE_COUNT,
            });
        }

        Ok(features
            .iter()
            .map(|row| {
                let logit: f64 = row
                    .as_slice()
                    .iter()
                    .zip(&self.weights)
                    .map(|(x, w)| x * w)
                    .sum::<f64>()
                    + self.bias;
                sigmoid(logit)
            })
            .collect())
    }

    fn expected_features(&self) -> usize {
        self.weights.len()
    }

    fn version(&self) -> Option<&str> {
        Some(&self.version)
    }
}

/// Standardizes features to zero mean and unit variance
///
/// Fitted only when both `mean` and `scale` are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    #[serde(default)]
    pub scale: Option<Vec<f64>>,
}

impl StandardScaler {
    pub fn fitted(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            mean: Some(mean),
            scale: Some(scale),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let scaler: Self = serde_json::from_str(&read_artifact(path.as_ref())?)?;

        if let (Some(mean), Some(scale)) = (&scaler.mean, &scaler.scale) {
            if mean.len() != FEATURE_COUNT || scale.len() != FEATURE_COUNT {
                return Err(ArtifactError::Incompatible(format!(
                    "scaler fitted on {} / {} features, expected {}",
                    mean.len(),
                    scale.len(),
                    FEATURE_COUNT
                )));
            }
        }

        Ok(scaler)
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, features: &[FeatureVector]) -> crate::core::Result<Vec<FeatureVector>> {
        let (Some(mean), Some(scale)) = (&self.mean, &self.scale) else {
            return Ok(features.to_vec());
        };

        for width in [mean.len(), scale.len()] {
            if width != FEATURE_COUNT {
                return Err(MatchError::DimensionMismatch {
                    expected: width,
                    actual: FEATURE_COUNT,
                });
            }
        }

        Ok(features
            .iter()
            .map(|row| {
                let mut values = row.values();
                for (i, value) in values.iter_mut().enumerate() {
                    // Constant features were fitted with zero variance
                    let s = if scale[i] == 0.0 { 1.0 } else { scale[i] };
                    *value = (*value - mean[i]) / s;
                }
                FeatureVector::new(values)
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.scale.is_some()
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn read_artifact(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })
}
