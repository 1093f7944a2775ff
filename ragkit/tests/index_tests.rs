//! Property and unit tests for brute-force index ranking.

use std::collections::HashMap;

use proptest::prelude::*;
use ragkit::{BruteForceIndex, DistanceMetric, Fragment, RagError, VectorIndex};

fn fragment(id: &str, embedding: Vec<f32>) -> Fragment {
    Fragment {
        id: id.to_string(),
        text: format!("text for {}", if id.is_empty() { "anonymous" } else { id }),
        metadata: HashMap::new(),
        embedding,
    }
}

/// **Ranking property**: for any set of stored vectors and any query, results
/// come back ascending by distance and the result count is exactly
/// `min(top_k, stored)`.
mod prop_query_ordering {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ascending_and_bounded(
            embeddings in proptest::collection::vec(
                proptest::collection::vec(-1.0f32..1.0, DIM),
                1..20,
            ),
            query in proptest::collection::vec(-1.0f32..1.0, DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let stored = embeddings.len();
            let results = rt.block_on(async {
                let index = BruteForceIndex::new(DIM, DistanceMetric::L2).unwrap();
                let fragments: Vec<Fragment> =
                    embeddings.into_iter().map(|e| fragment("", e)).collect();
                index.insert(&fragments).await.unwrap();
                index.query(&query, top_k).await.unwrap()
            });

            prop_assert_eq!(results.len(), top_k.min(stored));
            for window in results.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not ascending: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
        }
    }
}

#[tokio::test]
async fn self_query_returns_entry_first_with_zero_distance() {
    for metric in [DistanceMetric::L2, DistanceMetric::Cosine] {
        let index = BruteForceIndex::new(4, metric).unwrap();
        index
            .insert(&[
                fragment("a", vec![1.0, 0.0, 0.0, 0.0]),
                fragment("b", vec![0.0, 1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap();

        let results = index.query(&[1.0, 0.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fragment.id, "a");
        assert!(results[0].distance.abs() < 1e-6, "metric {metric}: {}", results[0].distance);
    }
}

#[tokio::test]
async fn ties_are_broken_by_insertion_order() {
    let index = BruteForceIndex::new(2, DistanceMetric::L2).unwrap();
    index
        .insert(&[
            fragment("first", vec![1.0, 0.0]),
            fragment("second", vec![1.0, 0.0]),
            fragment("third", vec![0.0, 1.0]),
        ])
        .await
        .unwrap();

    let results = index.query(&[1.0, 0.0], 2).await.unwrap();
    assert_eq!(results[0].fragment.id, "first");
    assert_eq!(results[1].fragment.id, "second");
}

#[tokio::test]
async fn wrong_length_query_is_a_dimension_mismatch() {
    // A 3-dimensional query against a 384-dimensional index.
    let index = BruteForceIndex::new(384, DistanceMetric::Cosine).unwrap();
    index.insert(&[fragment("a", vec![0.5; 384])]).await.unwrap();

    let err = index.query(&[1.0, 2.0, 3.0], 5).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 384, actual: 3 }));
}

#[tokio::test]
async fn wrong_length_insert_commits_nothing() {
    let index = BruteForceIndex::new(4, DistanceMetric::L2).unwrap();
    let err = index
        .insert(&[
            fragment("good", vec![1.0, 0.0, 0.0, 0.0]),
            fragment("bad", vec![1.0, 0.0, 0.0]),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, RagError::DimensionMismatch { expected: 4, actual: 3 }));
    assert_eq!(index.len().await, 0);
}

#[tokio::test]
async fn querying_a_fresh_index_reports_empty_index() {
    let index = BruteForceIndex::new(4, DistanceMetric::Cosine).unwrap();
    let err = index.query(&[0.0, 0.0, 1.0, 0.0], 5).await.unwrap_err();
    assert!(matches!(err, RagError::EmptyIndex));
}

#[tokio::test]
async fn k_is_truncated_to_index_size() {
    let index = BruteForceIndex::new(2, DistanceMetric::L2).unwrap();
    index
        .insert(&[
            fragment("a", vec![1.0, 0.0]),
            fragment("b", vec![0.0, 1.0]),
            fragment("c", vec![1.0, 1.0]),
        ])
        .await
        .unwrap();

    let results = index.query(&[1.0, 0.0], 10).await.unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn zero_k_is_rejected() {
    let index = BruteForceIndex::new(2, DistanceMetric::L2).unwrap();
    index.insert(&[fragment("a", vec![1.0, 0.0])]).await.unwrap();

    let err = index.query(&[1.0, 0.0], 0).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidConfiguration(_)));
}

#[tokio::test]
async fn dot_metric_ranks_larger_products_closer() {
    let index = BruteForceIndex::new(2, DistanceMetric::Dot).unwrap();
    index
        .insert(&[fragment("short", vec![1.0, 0.0]), fragment("long", vec![2.0, 0.0])])
        .await
        .unwrap();

    let results = index.query(&[1.0, 0.0], 2).await.unwrap();
    assert_eq!(results[0].fragment.id, "long");
    assert!((results[0].distance + 2.0).abs() < 1e-6);
    assert_eq!(results[1].fragment.id, "short");
}

#[tokio::test]
async fn cosine_treats_zero_vectors_as_dissimilar() {
    let index = BruteForceIndex::new(4, DistanceMetric::Cosine).unwrap();
    index.insert(&[fragment("a", vec![1.0, 0.0, 0.0, 0.0])]).await.unwrap();

    let results = index.query(&[0.0, 0.0, 0.0, 0.0], 1).await.unwrap();
    assert!((results[0].distance - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn empty_ids_are_assigned_uniquely() {
    let index = BruteForceIndex::new(1, DistanceMetric::L2).unwrap();
    let first = index
        .insert(&[fragment("", vec![1.0]), fragment("", vec![2.0])])
        .await
        .unwrap();
    let second = index.insert(&[fragment("", vec![3.0])]).await.unwrap();

    let mut all = first;
    all.extend(second);
    assert_eq!(all.len(), 3);
    let unique: std::collections::HashSet<&String> = all.iter().collect();
    assert_eq!(unique.len(), 3, "assigned ids must be unique: {all:?}");

    // Assigned ids are attached to the stored payloads.
    let results = index.query(&[1.0], 3).await.unwrap();
    assert_eq!(results[0].fragment.id, all[0]);
}

#[tokio::test]
async fn supplied_ids_are_returned_unchanged() {
    let index = BruteForceIndex::new(1, DistanceMetric::L2).unwrap();
    let ids = index.insert(&[fragment("keep-me", vec![1.0])]).await.unwrap();
    assert_eq!(ids, vec!["keep-me".to_string()]);
}

#[test]
fn zero_dimension_is_rejected() {
    assert!(matches!(
        BruteForceIndex::new(0, DistanceMetric::Cosine),
        Err(RagError::InvalidConfiguration(_))
    ));
}

#[tokio::test]
async fn accessors_reflect_construction() {
    let index = BruteForceIndex::new(16, DistanceMetric::Dot).unwrap();
    assert_eq!(index.dimension(), 16);
    assert_eq!(index.metric(), DistanceMetric::Dot);
    assert!(index.is_empty().await);
}
