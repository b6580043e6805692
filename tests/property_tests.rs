//! Property-based tests for scoring and ranking.
//!
//! # Invariants tested
//!
//! - **Cosine bounds:** a vector is fully similar to itself and fully
//!   dissimilar to its negation.
//! - **Fixed width:** feature vectors always carry twelve values.
//! - **No self matches:** the target never appears in its own ranking.
//! - **No duplicates:** diversity sampling never repeats a candidate.
//! - **Length:** results never exceed the limit and fill it when the pool allows.
//! - **Clustering coverage:** every profile lands in exactly one cluster or is skipped.

use std::collections::HashSet;

use lume_affinity::core::similarity::{cosine_similarity, jaccard_overlap};
use lume_affinity::core::{build_features, cluster_users, Matcher};
use lume_affinity::models::{UserProfile, FEATURE_COUNT};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn nonzero_vector(dim: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0f64..1.0, dim)
        .prop_filter("vector must have non-zero magnitude", |v| {
            v.iter().map(|x| x * x).sum::<f64>() > 1e-6
        })
}

fn profile_strategy() -> impl Strategy<Value = UserProfile> {
    (
        "[a-z]{1,6}",
        prop::option::of(prop::collection::vec(0.0f64..1.0, 5)),
        prop::option::of(prop::collection::vec(-1.0f64..1.0, 3)),
        prop::option::of(0.0f64..1.0),
        prop::option::of(0.0f64..1.0),
        prop::option::of(0.0f64..1.0),
        prop::option::of(0.0f64..1.0),
    )
        .prop_map(|(id, personality, interests, score, p_weight, i_weight, diversity)| {
            UserProfile {
                id,
                personality_vector: personality,
                interest_embedding: interests,
                user_score: score,
                pref_personality_weight: p_weight,
                pref_interests_weight: i_weight,
                pref_diversity_factor: diversity,
                ..UserProfile::default()
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn cosine_self_and_negation(v in (1usize..16).prop_flat_map(nonzero_vector)) {
        let negated: Vec<f64> = v.iter().map(|x| -x).collect();

        prop_assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
        prop_assert!((cosine_similarity(&v, &negated) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn jaccard_self_is_one(set in prop::collection::hash_set(0u32..50, 1..20)) {
        prop_assert_eq!(jaccard_overlap(&set, &set), 1.0);
    }

    #[test]
    fn features_have_fixed_width(a in profile_strategy(), b in profile_strategy()) {
        let features = build_features(&a, &b);

        prop_assert_eq!(features.as_slice().len(), FEATURE_COUNT);
        prop_assert!(features.as_slice().iter().all(|f| f.is_finite()));
        prop_assert_eq!(features[3], a.score());
        prop_assert_eq!(features[11], b.diversity_factor());
    }

    #[test]
    fn ranking_invariants(
        target in profile_strategy(),
        pool in prop::collection::vec(profile_strategy(), 0..30),
        limit in 0usize..10,
        diversity in 0.0f64..1.0,
        seed in any::<u64>(),
    ) {
        let mut pool = pool;
        pool.push(target.clone());
        let eligible = pool.iter().filter(|c| c.id != target.id).count();

        let result = Matcher::default()
            .find_matches_with_rng(&target, pool, limit, Some(diversity), &mut ChaCha8Rng::seed_from_u64(seed))
            .expect("fallback scoring never fails");

        prop_assert!(result.matches.iter().all(|m| m.user.id != target.id));
        prop_assert_eq!(result.total_candidates, eligible);
        prop_assert_eq!(result.matches.len(), limit.min(eligible));
    }

    #[test]
    fn distinct_candidates_never_repeat(
        count in 5usize..40,
        limit in 1usize..10,
        diversity in 0.01f64..1.0,
        seed in any::<u64>(),
    ) {
        let target = UserProfile {
            interest_embedding: Some(vec![1.0, 0.0]),
            ..UserProfile::new("target")
        };
        let pool: Vec<UserProfile> = (0..count)
            .map(|i| UserProfile {
                interest_embedding: Some(vec![1.0, i as f64 * 0.1]),
                ..UserProfile::new(format!("c{i}"))
            })
            .collect();

        let result = Matcher::default()
            .find_matches_with_rng(&target, pool, limit, Some(diversity), &mut ChaCha8Rng::seed_from_u64(seed))
            .expect("fallback scoring never fails");

        let unique: HashSet<&str> = result.matches.iter().map(|m| m.user.id.as_str()).collect();
        prop_assert_eq!(unique.len(), result.matches.len());
        prop_assert_eq!(result.matches.len(), limit.min(count));

        if count > limit && limit >= 2 {
            prop_assert_eq!(result.matches[0].user.id.as_str(), "c0");
        }
    }

    #[test]
    fn clustering_covers_every_profile(
        pool in prop::collection::vec(profile_strategy(), 0..25),
        n_clusters in 0usize..8,
        seed in any::<u64>(),
    ) {
        let total = pool.len();
        let clusterable = pool.iter().filter(|p| p.interest_embedding().is_some()).count();

        let result = cluster_users(pool, n_clusters, &mut ChaCha8Rng::seed_from_u64(seed))
            .expect("equal-width embeddings never mismatch");

        let clustered: usize = result.clusters.iter().map(|c| c.members.len()).sum();
        prop_assert_eq!(clustered, clusterable);
        prop_assert_eq!(clustered + result.skipped, total);
        prop_assert!(result.clusters.len() <= n_clusters.min(clusterable));
        prop_assert!(result.clusters.iter().all(|c| !c.members.is_empty()));
    }
}
