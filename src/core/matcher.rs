use std::sync::Arc;

use rand::Rng;

use crate::core::sampling::{diversity_weights, sample_without_replacement};
use crate::core::scoring::MatchScorer;
use crate::core::similarity::{cosine_similarity, interest_overlap};
use crate::core::Result;
use crate::models::{ScoredCandidate, SimilarUser, UserProfile};

/// Size of the ranked window considered for diversity, as a multiple of the limit
pub const WINDOW_MULTIPLIER: usize = 2;

/// Result of the matching process
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub matches: Vec<ScoredCandidate>,
    /// Candidates scored, after excluding the target user
    pub total_candidates: usize,
    /// Whether the randomized diversity step ran
    pub diversified: bool,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Self-exclusion
/// 2. Directional scoring with the target as `user_i`
/// 3. Stable descending sort
/// 4. Secure head plus weighted diversity sample
#[derive(Debug, Clone)]
pub struct Matcher {
    scorer: Arc<MatchScorer>,
}

impl Matcher {
    pub fn new(scorer: Arc<MatchScorer>) -> Self {
        Self { scorer }
    }

    /// Matcher that scores with the preference heuristic only
    pub fn with_fallback_scoring() -> Self {
        Self::new(Arc::new(MatchScorer::fallback()))
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// Rank candidates for a target user using the thread-local random source
    ///
    /// `diversity_factor` defaults to the target's own preference.
    pub fn find_matches(
        &self,
        target: &UserProfile,
        candidates: Vec<UserProfile>,
        limit: usize,
        diversity_factor: Option<f64>,
    ) -> Result<MatchResult> {
        self.find_matches_with_rng(target, candidates, limit, diversity_factor, &mut rand::thread_rng())
    }

    /// Rank candidates for a target user drawing randomness from `rng`
    ///
    /// # Arguments
    /// * `target` - The user the ranking is computed for
    /// * `candidates` - Candidate pool; the target is skipped if present
    /// * `limit` - Maximum number of matches to return
    /// * `diversity_factor` - Flattening applied to the diversity pool
    /// * `rng` - Random source for the diversity draw
    pub fn find_matches_with_rng<R: Rng + ?Sized>(
        &self,
        target: &UserProfile,
        candidates: Vec<UserProfile>,
        limit: usize,
        diversity_factor: Option<f64>,
        rng: &mut R,
    ) -> Result<MatchResult> {
        let diversity_factor = diversity_factor.unwrap_or_else(|| target.diversity_factor());

        let mut ranked = self.score_candidates(target, candidates)?;
        let total_candidates = ranked.len();

        // Stable sort keeps pool order for equal scores
        ranked.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        if limit == 0 || ranked.is_empty() {
            return Ok(MatchResult {
                matches: Vec::new(),
                total_candidates,
                diversified: false,
            });
        }

        if diversity_factor <= 0.0 || ranked.len() <= limit {
            ranked.truncate(limit);
            tracing::debug!(
                "Ranked {} of {} candidates for {} without diversity",
                ranked.len(),
                total_candidates,
                target.id
            );
            return Ok(MatchResult {
                matches: ranked,
                total_candidates,
                diversified: false,
            });
        }

        let matches = apply_diversity(ranked, limit, diversity_factor, rng)?;

        tracing::debug!(
            "Ranked {} of {} candidates for {} with diversity factor {}",
            matches.len(),
            total_candidates,
            target.id,
            diversity_factor
        );

        Ok(MatchResult {
            matches,
            total_candidates,
            diversified: true,
        })
    }

    /// Users whose interest embeddings point the same way as the target's
    ///
    /// Candidates without an embedding are skipped. No diversity is applied.
    pub fn similar_users(
        &self,
        target: &UserProfile,
        candidates: Vec<UserProfile>,
        top_n: usize,
    ) -> Vec<SimilarUser> {
        let Some(target_embedding) = target.interest_embedding() else {
            tracing::debug!("User {} has no interest embedding", target.id);
            return Vec::new();
        };

        let mut similar: Vec<SimilarUser> = candidates
            .into_iter()
            .filter(|candidate| candidate.id != target.id)
            .filter_map(|candidate| {
                let similarity = cosine_similarity(target_embedding, candidate.interest_embedding()?);
                Some(SimilarUser {
                    user: candidate,
                    similarity,
                })
            })
            .collect();

        similar.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        similar.truncate(top_n);
        similar
    }

    fn score_candidates(
        &self,
        target: &UserProfile,
        candidates: Vec<UserProfile>,
    ) -> Result<Vec<ScoredCandidate>> {
        candidates
            .into_iter()
            .filter(|candidate| candidate.id != target.id)
            .map(|candidate| {
                let match_score = self.scorer.predict_match_score(target, &candidate)?;
                let (interest_overlap, shared_interests) =
                    interest_overlap(&target.interests, &candidate.interests);

                Ok(ScoredCandidate {
                    user: candidate,
                    match_score,
                    shared_interests,
                    interest_overlap,
                })
            })
            .collect()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_fallback_scoring()
    }
}

/// Keep the top `limit / 2` verbatim and fill the rest by weighted sampling
///
/// `ranked` is sorted descending.
fn apply_diversity<R: Rng + ?Sized>(
    mut ranked: Vec<ScoredCandidate>,
    limit: usize,
    diversity_factor: f64,
    rng: &mut R,
) -> Result<Vec<ScoredCandidate>> {
    let window = (limit * WINDOW_MULTIPLIER).min(ranked.len());
    ranked.truncate(window);

    let secure_count = limit / 2;
    let pool: Vec<ScoredCandidate> = ranked.split_off(secure_count.min(ranked.len()));
    let mut selected = ranked;

    if pool.is_empty() {
        return Ok(selected);
    }

    let scores: Vec<f64> = pool.iter().map(|c| c.match_score).collect();
    let weights = diversity_weights(&scores, diversity_factor);
    let picked = sample_without_replacement(&weights, limit - selected.len(), rng)?;

    let mut pool: Vec<Option<ScoredCandidate>> = pool.into_iter().map(Some).collect();
    selected.extend(picked.into_iter().filter_map(|i| pool[i].take()));

    Ok(selected)
}
