// Integration tests for Lume Affinity

use lume_affinity::config::ModelSettings;
use lume_affinity::core::{MatchError, Matcher};
use lume_affinity::models::{RankRequest, UserProfile, FEATURE_COUNT, FEATURE_NAMES};
use lume_affinity::services::ModelRegistry;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::io::Write;

fn create_test_profile(id: &str, angle: f64) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        personality_vector: Some(vec![0.6, 0.4, 0.5, 0.7, 0.3]),
        interest_embedding: Some(vec![angle.cos(), angle.sin()]),
        ..UserProfile::default()
    }
}

fn create_target(diversity: f64) -> UserProfile {
    UserProfile {
        pref_diversity_factor: Some(diversity),
        ..create_test_profile("current_user", 0.0)
    }
}

/// Twenty candidates with strictly decreasing scores, shuffled out of order
fn create_pool() -> Vec<UserProfile> {
    let mut pool: Vec<UserProfile> = (0..20)
        .map(|i| create_test_profile(&format!("c{:02}", i), i as f64 * 0.06))
        .collect();
    pool.reverse();
    pool.swap(3, 11);
    pool
}

fn ids(matches: &[lume_affinity::ScoredCandidate]) -> Vec<String> {
    matches.iter().map(|m| m.user.id.clone()).collect()
}

fn write_artifact(dir: &tempfile::TempDir, name: &str, json: serde_json::Value) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(json.to_string().as_bytes()).unwrap();
    path.display().to_string()
}

#[test]
fn test_integration_small_pool_returns_everything_sorted() {
    let matcher = Matcher::default();
    let target = create_target(0.2);
    let candidates = vec![
        create_test_profile("far", 1.2),
        create_target(0.2),
        create_test_profile("near", 0.1),
        create_test_profile("mid", 0.6),
    ];

    let result = matcher.find_matches(&target, candidates, 5, None).unwrap();

    assert_eq!(ids(&result.matches), vec!["near", "mid", "far"]);
    assert_eq!(result.total_candidates, 3);
    assert!(!result.diversified);
}

#[test]
fn test_integration_diversity_scenario() {
    let matcher = Matcher::default();
    let target = create_target(0.3);
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let window: HashSet<String> = (2..8).map(|i| format!("c{:02}", i)).collect();

    for _ in 0..25 {
        let result = matcher
            .find_matches_with_rng(&target, create_pool(), 4, None, &mut rng)
            .unwrap();
        let ids = ids(&result.matches);

        assert!(result.diversified);
        assert_eq!(ids.len(), 4);
        assert_eq!(&ids[..2], &["c00", "c01"]);
        assert!(ids[2..].iter().all(|id| window.contains(id)), "{:?}", ids);
        assert_ne!(ids[2], ids[3]);
    }
}

#[test]
fn test_integration_diversity_reaches_beyond_top_k() {
    let matcher = Matcher::default();
    let target = create_target(1.0);
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let top_k: HashSet<&str> = ["c00", "c01", "c02", "c03"].into_iter().collect();

    let mut saw_lower_ranked = false;
    for _ in 0..50 {
        let result = matcher
            .find_matches_with_rng(&target, create_pool(), 4, None, &mut rng)
            .unwrap();
        if result.matches.iter().any(|m| !top_k.contains(m.user.id.as_str())) {
            saw_lower_ranked = true;
            break;
        }
    }

    assert!(saw_lower_ranked);
}

#[test]
fn test_integration_zero_diversity_is_deterministic() {
    let matcher = Matcher::default();
    let target = create_target(0.0);

    let first = matcher.find_matches(&target, create_pool(), 6, None).unwrap();
    let second = matcher.find_matches(&target, create_pool(), 6, Some(0.0)).unwrap();

    let expected: Vec<String> = (0..6).map(|i| format!("c{:02}", i)).collect();
    assert_eq!(ids(&first.matches), expected);
    assert_eq!(ids(&second.matches), expected);
}

#[test]
fn test_integration_seeded_ranking_is_reproducible() {
    let matcher = Matcher::default();
    let target = create_target(0.4);

    let a = matcher
        .find_matches_with_rng(&target, create_pool(), 6, None, &mut ChaCha8Rng::seed_from_u64(5))
        .unwrap();
    let b = matcher
        .find_matches_with_rng(&target, create_pool(), 6, None, &mut ChaCha8Rng::seed_from_u64(5))
        .unwrap();

    assert_eq!(ids(&a.matches), ids(&b.matches));
}

#[test]
fn test_integration_request_limit_clamping() {
    let request: RankRequest = serde_json::from_str(
        r#"{"target": {"id": "current_user"}, "candidates": [{"id": "a"}, {"id": "b"}], "limit": -2}"#,
    )
    .unwrap();
    let limit = request.resolved_limit(5, 100);

    let result = Matcher::default()
        .find_matches(&request.target, request.candidates, limit, None)
        .unwrap();

    assert!(result.matches.is_empty());
}

#[test]
fn test_integration_trained_model_ranking() {
    let dir = tempfile::tempdir().unwrap();

    // Model rewards interest similarity only
    let mut weights = vec![0.0; FEATURE_COUNT];
    weights[2] = 4.0;
    let scorer_path = write_artifact(
        &dir,
        "match_model_latest.json",
        serde_json::json!({
            "version": "20240601_120000",
            "featureNames": FEATURE_NAMES,
            "weights": weights,
            "bias": -2.0,
        }),
    );
    let scaler_path = write_artifact(
        &dir,
        "feature_scaler.json",
        serde_json::json!({
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
        }),
    );

    let registry = ModelRegistry::load(&ModelSettings {
        scorer_path: Some(scorer_path),
        scaler_path: Some(scaler_path),
    })
    .unwrap();
    assert_eq!(registry.version().as_deref(), Some("20240601_120000"));

    let target = create_target(0.0);
    let result = registry
        .matcher()
        .find_matches(&target, create_pool(), 3, None)
        .unwrap();

    assert_eq!(ids(&result.matches), vec!["c00", "c01", "c02"]);

    // identical profiles: sigmoid(4 - 2) blended with preference 1.0
    let top = result.matches[0].match_score;
    let expected = 0.7 / (1.0 + (-2.0f64).exp()) + 0.3;
    assert!((top - expected).abs() < 1e-9);
}

#[test]
fn test_integration_scaler_mismatch_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let scaler_path = write_artifact(
        &dir,
        "feature_scaler.json",
        serde_json::json!({ "mean": [0.0, 0.0], "scale": [1.0, 1.0] }),
    );

    let loaded = ModelRegistry::load(&ModelSettings {
        scorer_path: None,
        scaler_path: Some(scaler_path),
    });

    assert!(loaded.is_err());
}

#[test]
fn test_integration_dimension_mismatch_surfaces_from_ranking() {
    use lume_affinity::core::{MatchScorer, Scorer};
    use lume_affinity::models::FeatureVector;
    use std::sync::Arc;

    struct LegacyScorer;

    impl Scorer for LegacyScorer {
        fn predict(&self, features: &[FeatureVector]) -> lume_affinity::core::Result<Vec<f64>> {
            Ok(vec![0.5; features.len()])
        }

        fn expected_features(&self) -> usize {
            9
        }
    }

    let matcher = Matcher::new(Arc::new(MatchScorer::with_scorer(Arc::new(LegacyScorer))));
    let err = matcher
        .find_matches(&create_target(0.2), create_pool(), 4, None)
        .unwrap_err();

    assert!(matches!(err, MatchError::DimensionMismatch { expected: 9, actual: 12 }));
}
