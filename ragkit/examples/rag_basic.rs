//! # Basic ingest-and-query example
//!
//! Demonstrates the core pipeline: ingest raw segments, then run ranked
//! retrieval against the resulting index.
//!
//! Uses a deterministic hash-based mock embedder so it runs with **zero
//! API keys**.
//!
//! Run: `cargo run -p ragkit --example rag_basic`

use std::sync::Arc;

use ragkit::{Embedder, RagConfig, RagPipeline, RawSegment, WindowFragmenter};

// ---------------------------------------------------------------------------
// MockEmbedder — deterministic hash-based embeddings for demos/tests
// ---------------------------------------------------------------------------

struct MockEmbedder {
    dimensions: usize,
}

#[async_trait::async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> ragkit::Result<Vec<f32>> {
        // Deterministic embedding: hash the text bytes, then generate a
        // normalised vector whose direction depends on the content.
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        // L2-normalise so cosine similarity is just the dot product.
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // chunk_size=200 keeps fragments small for this demo; overlap=50 shares
    // context between adjacent fragments; top_k=3 returns the three most
    // relevant results.
    let config = RagConfig::builder().chunk_size(200).chunk_overlap(50).top_k(3).build()?;

    let pipeline = RagPipeline::builder()
        .config(config)
        .embedder(Arc::new(MockEmbedder { dimensions: 64 }))
        .fragmenter(Arc::new(WindowFragmenter::new(200, 50)?))
        .build()?;

    let segments = vec![
        RawSegment::new(
            "Rust is a systems programming language focused on safety, speed, \
             and concurrency. It achieves memory safety without a garbage collector \
             through its ownership system.",
        )
        .with_metadata("topic", "rust"),
        RawSegment::new(
            "Python is a high-level, interpreted programming language known for \
             its readability and versatility. It is widely used in data science, \
             web development, and automation.",
        )
        .with_metadata("topic", "python"),
        RawSegment::new(
            "Retrieval-Augmented Generation (RAG) combines a retrieval system \
             with a language model. Documents are split, embedded, and stored \
             in a vector index. At query time the most relevant fragments are \
             retrieved and fed to the model as context.",
        )
        .with_metadata("topic", "rag"),
    ];

    println!("Ingesting {} segments...", segments.len());
    let (index, report) = pipeline.ingest(&segments).await?;
    println!("  indexed {} of {} fragments", report.indexed, report.requested);

    let queries = ["memory safety in programming", "data science language", "vector index"];

    for query in &queries {
        println!("\nQuery: \"{query}\"");
        let results = pipeline.query(&index, query, 3).await?;
        for (i, result) in results.iter().enumerate() {
            println!(
                "  {}. [distance={:.4}] topic={} | {}",
                i + 1,
                result.distance,
                result.fragment.metadata["topic"],
                // Show a short preview of the fragment text.
                &result.fragment.text[..result.fragment.text.len().min(70)],
            );
        }
    }

    println!("\nDone.");
    Ok(())
}
