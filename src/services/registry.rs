use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ModelSettings;
use crate::core::{FeatureScaler, MatchScorer, Matcher, Scorer};
use crate::services::artifact::{ArtifactError, LogisticScorer, StandardScaler};

/// Process-wide holder of the active match scorer
///
/// Readers take an `Arc` snapshot and keep using it for the whole request;
/// a reload swaps the pointer, so no reader ever observes a half-loaded model.
pub struct ModelRegistry {
    active: RwLock<Arc<MatchScorer>>,
    scorer_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
}

impl ModelRegistry {
    /// Registry that only ever uses the preference heuristic
    pub fn fallback() -> Self {
        Self::from_scorer(MatchScorer::fallback())
    }

    pub fn from_scorer(scorer: MatchScorer) -> Self {
        Self {
            active: RwLock::new(Arc::new(scorer)),
            scorer_path: None,
            scaler_path: None,
        }
    }

    /// Load the configured artifacts
    ///
    /// A missing scorer file leaves the registry in fallback mode; a missing
    /// scaler file leaves features unscaled. Unreadable or incompatible
    /// artifacts are errors.
    pub fn load(settings: &ModelSettings) -> Result<Self, ArtifactError> {
        let scorer_path = settings.scorer_path.as_ref().map(PathBuf::from);
        let scaler_path = settings.scaler_path.as_ref().map(PathBuf::from);
        let scorer = load_scorer(scorer_path.as_ref(), scaler_path.as_ref())?;

        Ok(Self {
            active: RwLock::new(Arc::new(scorer)),
            scorer_path,
            scaler_path,
        })
    }

    /// Snapshot of the active scorer
    pub fn current(&self) -> Arc<MatchScorer> {
        self.active.read().clone()
    }

    /// Matcher bound to the active scorer snapshot
    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.current())
    }

    pub fn version(&self) -> Option<String> {
        self.current().model_version().map(str::to_string)
    }

    /// Swap in a new scorer
    pub fn replace(&self, scorer: MatchScorer) {
        let scorer = Arc::new(scorer);
        *self.active.write() = scorer;
        tracing::info!("Match scorer replaced (version: {:?})", self.version());
    }

    /// Re-read the configured artifacts after retraining
    ///
    /// On failure the previously active model stays in place.
    pub fn reload(&self) -> Result<(), ArtifactError> {
        match load_scorer(self.scorer_path.as_ref(), self.scaler_path.as_ref()) {
            Ok(scorer) => {
                self.replace(scorer);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Model reload failed, keeping previous model: {}", e);
                Err(e)
            }
        }
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::fallback()
    }
}

fn load_scorer(
    scorer_path: Option<&PathBuf>,
    scaler_path: Option<&PathBuf>,
) -> Result<MatchScorer, ArtifactError> {
    let scorer: Option<Arc<dyn Scorer>> = match scorer_path {
        Some(path) if path.exists() => {
            let scorer = LogisticScorer::load(path)?;
            tracing::info!("Loaded match model {} from {}", scorer.version, path.display());
            Some(Arc::new(scorer) as Arc<dyn Scorer>)
        }
        Some(path) => {
            tracing::warn!("Model file {} not found, using fallback scoring", path.display());
            None
        }
        None => {
            tracing::info!("No model configured, using fallback scoring");
            None
        }
    };

    let scaler: Option<Arc<dyn FeatureScaler>> = match scaler_path {
        Some(path) if path.exists() => {
            let scaler = StandardScaler::load(path)?;
            tracing::info!(
                "Loaded feature scaler from {} (fitted: {})",
                path.display(),
                scaler.is_fitted()
            );
            Some(Arc::new(scaler) as Arc<dyn FeatureScaler>)
        }
        Some(path) => {
            tracing::debug!("Scaler file {} not found, features stay unscaled", path.display());
            None
        }
        None => None,
    };

    Ok(MatchScorer::new(scorer, scaler))
}
