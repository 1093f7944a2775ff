//! # Grounded answering example
//!
//! Demonstrates the full answer path: ingest, retrieve, assemble a bounded
//! context, and condition a generator on it. Both providers are
//! deterministic mocks, so it runs with **zero API keys**.
//!
//! Run: `cargo run -p ragkit --example rag_answer`

use std::sync::Arc;

use ragkit::{
    Embedder, GenerationRequest, Generator, RagConfig, RagPipeline, RawSegment,
    SegmentFragmenter,
};

/// Embeds every text along a direction picked by the product name it
/// mentions, so retrieval is exact for this demo corpus.
struct KeywordEmbedder;

#[async_trait::async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> ragkit::Result<Vec<f32>> {
        let mut emb = vec![0.0f32; 4];
        if text.contains("pricing") || text.contains("plan") {
            emb[0] = 1.0;
        } else if text.contains("language") || text.contains("multi-language") {
            emb[1] = 1.0;
        } else {
            emb[2] = 1.0;
        }
        Ok(emb)
    }
}

/// A stand-in for an LLM: quotes the top context line, or admits ignorance
/// when the context is empty.
struct QuotingGenerator;

#[async_trait::async_trait]
impl Generator for QuotingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> ragkit::Result<String> {
        match request.context.lines().next() {
            Some(line) if !line.is_empty() => {
                Ok(format!("According to the indexed documents: {line}"))
            }
            _ => Ok("The answer is not available in the indexed documents.".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::builder().top_k(2).max_context_chars(500).build()?)
        .embedder(Arc::new(KeywordEmbedder))
        .fragmenter(Arc::new(SegmentFragmenter))
        .generator(Arc::new(QuotingGenerator))
        .build()?;

    let segments = vec![
        RawSegment::new(
            "AcmeBot pricing starts at $29/month for the Starter plan which \
             includes up to 1,000 conversations per month.",
        )
        .with_metadata("category", "pricing"),
        RawSegment::new(
            "AcmeBot supports multi-language conversations in English, Spanish, \
             French, and Japanese.",
        )
        .with_metadata("category", "features"),
    ];

    let (index, report) = pipeline.ingest(&segments).await?;
    println!("indexed {} of {} fragments\n", report.indexed, report.requested);

    for question in ["What does the Starter plan cost?", "Which languages are supported?"] {
        let answer = pipeline.answer(&index, question).await?;
        println!("Q: {question}");
        println!("A: {answer}\n");
    }

    Ok(())
}
