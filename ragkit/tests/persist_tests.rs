//! Snapshot persistence round-trips and compatibility rejection.

use std::collections::HashMap;

use ragkit::{BruteForceIndex, DistanceMetric, Fragment, IndexSnapshot, RagError, VectorIndex};

fn fragment(id: &str, text: &str, embedding: Vec<f32>) -> Fragment {
    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), "people.csv".to_string());
    Fragment { id: id.to_string(), text: text.to_string(), metadata, embedding }
}

async fn populated_index() -> BruteForceIndex {
    let index = BruteForceIndex::new(4, DistanceMetric::Cosine).unwrap();
    index
        .insert(&[
            fragment("a", "Alice works at Acme.", vec![1.0, 0.0, 0.0, 0.0]),
            fragment("b", "Bob works at Globex.", vec![0.0, 1.0, 0.0, 0.0]),
            fragment("c", "Carol works at Acme.", vec![0.0, 0.0, 1.0, 0.0]),
        ])
        .await
        .unwrap();
    index
}

#[tokio::test]
async fn snapshot_round_trips_through_json() {
    let index = populated_index().await;
    let snapshot = IndexSnapshot::capture(&index).await;

    assert_eq!(snapshot.dimension, 4);
    assert_eq!(snapshot.metric, DistanceMetric::Cosine);
    assert_eq!(snapshot.entries.len(), 3);
    // The vector is stored once, on the entry.
    assert!(snapshot.entries.iter().all(|e| e.payload.embedding.is_empty()));
    assert_eq!(snapshot.entries[0].embedding, vec![1.0, 0.0, 0.0, 0.0]);

    let mut buffer = Vec::new();
    snapshot.write_to(&mut buffer).unwrap();
    let reloaded = IndexSnapshot::read_from(buffer.as_slice()).unwrap();
    assert_eq!(reloaded, snapshot);

    let restored = reloaded.into_index().await.unwrap();
    assert_eq!(restored.len().await, 3);

    let results = restored.query(&[1.0, 0.0, 0.0, 0.0], 1).await.unwrap();
    assert_eq!(results[0].fragment.id, "a");
    assert_eq!(results[0].fragment.text, "Alice works at Acme.");
    assert_eq!(results[0].fragment.metadata["source"], "people.csv");
    assert!(results[0].distance.abs() < 1e-6);
}

#[tokio::test]
async fn load_into_rejects_a_different_dimension() {
    let snapshot = IndexSnapshot::capture(&populated_index().await).await;
    let target = BruteForceIndex::new(8, DistanceMetric::Cosine).unwrap();

    let err = snapshot.load_into(&target).await.unwrap_err();
    assert!(matches!(err, RagError::IncompatibleIndex(_)));
    assert_eq!(target.len().await, 0);
}

#[tokio::test]
async fn load_into_rejects_a_different_metric() {
    let snapshot = IndexSnapshot::capture(&populated_index().await).await;
    let target = BruteForceIndex::new(4, DistanceMetric::L2).unwrap();

    let err = snapshot.load_into(&target).await.unwrap_err();
    assert!(matches!(err, RagError::IncompatibleIndex(_)));
}

#[test]
fn malformed_snapshot_bytes_are_a_persistence_error() {
    let err = IndexSnapshot::read_from(&b"not a snapshot"[..]).unwrap_err();
    assert!(matches!(err, RagError::Persistence(_)));
}

#[tokio::test]
async fn snapshot_of_an_empty_index_restores_an_empty_index() {
    let index = BruteForceIndex::new(4, DistanceMetric::Dot).unwrap();
    let snapshot = IndexSnapshot::capture(&index).await;

    let restored = snapshot.into_index().await.unwrap();
    assert!(restored.is_empty().await);
    assert_eq!(restored.metric(), DistanceMetric::Dot);
}
