//! Pipeline orchestration: ingest documents, query them, answer questions.
//!
//! The [`RagPipeline`] composes a [`Fragmenter`], an [`Embedder`], and an
//! optional [`Generator`] around indexes it constructs on demand.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragkit::{RagConfig, RagPipeline, WindowFragmenter};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .fragmenter(Arc::new(WindowFragmenter::new(512, 100)?))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! let (index, report) = pipeline.ingest(&segments).await?;
//! let ranked = pipeline.query(&index, "what changed in v2?", 5).await?;
//! let answer = pipeline.answer(&index, "what changed in v2?").await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::RagConfig;
use crate::document::{RawSegment, RetrievalResult, ScoredFragment};
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::fragmenter::Fragmenter;
use crate::generation::{GenerationRequest, Generator};
use crate::index::{BruteForceIndex, VectorIndex};
use crate::retriever::{MetadataFilter, Retriever};
use crate::source::DocumentSource;

/// A shared handle to an index built by the pipeline.
pub type IndexHandle = Arc<dyn VectorIndex>;

/// The fixed instruction the answering pipeline sends to the generator.
pub const DEFAULT_INSTRUCTION: &str = "Answer the question using only the provided context. \
     If the context does not contain the information needed, say that the answer is not \
     available in the indexed documents.";

/// Counts reported by an ingestion call.
///
/// `indexed < requested` never occurs on a successful return; partial
/// progress is reported through
/// [`RagError::IngestionInterrupted`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Fragments committed to the index.
    pub indexed: usize,
    /// Fragments produced by fragmentation for this call.
    pub requested: usize,
}

/// The pipeline orchestrator.
///
/// Ingestion runs fragment → embed (batched) → insert, committing each
/// successfully embedded batch before embedding the next, so a failure
/// partway leaves an internally consistent, partially-indexed index and
/// maximizes salvageable work for large documents. Querying runs
/// embed → k-NN. Answering runs retrieve → assemble bounded context →
/// generate.
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    fragmenter: Arc<dyn Fragmenter>,
    generator: Option<Arc<dyn Generator>>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedder.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Construct an empty index sized to the embedder's output.
    ///
    /// The dimension is probed once with a canonical empty string; the
    /// metric comes from the configuration.
    ///
    /// # Errors
    ///
    /// Surfaces [`RagError::EmbeddingUnavailable`] from the probe, including
    /// the case of a zero-length probe vector.
    pub async fn create_index(&self) -> Result<IndexHandle> {
        let probe = self.embedder.embed("").await?;
        if probe.is_empty() {
            return Err(RagError::EmbeddingUnavailable {
                provider: "dimension probe".to_string(),
                message: "embedder returned a zero-length vector".to_string(),
                retryable: false,
            });
        }
        let index = BruteForceIndex::new(probe.len(), self.config.metric)?;
        info!(dimension = probe.len(), metric = %self.config.metric, "created index");
        Ok(Arc::new(index))
    }

    /// Build an index from raw segments: create, then [`ingest_into`](Self::ingest_into).
    ///
    /// # Errors
    ///
    /// Surfaces probe failures from [`create_index`](Self::create_index) and
    /// ingestion failures as [`RagError::IngestionInterrupted`]. Callers that
    /// need the partially-populated index on failure should call
    /// `create_index` and `ingest_into` separately.
    pub async fn ingest(&self, segments: &[RawSegment]) -> Result<(IndexHandle, IngestReport)> {
        let index = self.create_index().await?;
        let report = self.ingest_into(&index, segments).await?;
        Ok((index, report))
    }

    /// Fragment segments, embed them in batches, and insert into `index`.
    ///
    /// Batches of `config.batch_size` are embedded and committed in order;
    /// each batch becomes visible to readers atomically. Abandoning the
    /// returned future at an embedding await point commits nothing from the
    /// in-flight batch.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestionInterrupted`] carrying the counts of
    /// fragments committed so far and requested in total, with the
    /// underlying embedding or insertion failure as its source. Batches
    /// committed before the failure remain in the index.
    pub async fn ingest_into(
        &self,
        index: &IndexHandle,
        segments: &[RawSegment],
    ) -> Result<IngestReport> {
        let fragments = self.fragmenter.split(segments);
        let requested = fragments.len();
        if requested == 0 {
            info!(segments = segments.len(), "nothing to ingest");
            return Ok(IngestReport { indexed: 0, requested: 0 });
        }

        let mut indexed = 0usize;
        for batch in fragments.chunks(self.config.batch_size) {
            let texts: Vec<&str> = batch.iter().map(|f| f.text.as_str()).collect();

            let embeddings = match self.embedder.embed_batch(&texts).await {
                Ok(embeddings) => embeddings,
                Err(e) => {
                    error!(completed = indexed, requested, error = %e, "embedding failed during ingestion");
                    return Err(RagError::IngestionInterrupted {
                        completed: indexed,
                        requested,
                        source: Box::new(e),
                    });
                }
            };
            if embeddings.len() != batch.len() {
                let e = RagError::EmbeddingUnavailable {
                    provider: "batch".to_string(),
                    message: format!(
                        "adapter returned {} embeddings for {} inputs",
                        embeddings.len(),
                        batch.len()
                    ),
                    retryable: false,
                };
                return Err(RagError::IngestionInterrupted {
                    completed: indexed,
                    requested,
                    source: Box::new(e),
                });
            }

            let mut embedded = batch.to_vec();
            for (fragment, embedding) in embedded.iter_mut().zip(embeddings) {
                fragment.embedding = embedding;
            }

            if let Err(e) = index.insert(&embedded).await {
                error!(completed = indexed, requested, error = %e, "insert failed during ingestion");
                return Err(RagError::IngestionInterrupted {
                    completed: indexed,
                    requested,
                    source: Box::new(e),
                });
            }
            indexed += embedded.len();
            debug!(indexed, requested, "committed batch");
        }

        info!(indexed, requested, "ingestion complete");
        Ok(IngestReport { indexed, requested })
    }

    /// Ingest a parsed document source into `index`.
    ///
    /// # Errors
    ///
    /// Surfaces [`RagError::DocumentUnreadable`] from the source, otherwise
    /// behaves like [`ingest_into`](Self::ingest_into).
    pub async fn ingest_source(
        &self,
        index: &IndexHandle,
        source: &dyn DocumentSource,
    ) -> Result<IngestReport> {
        let segments = source.segments()?;
        debug!(source = source.label(), segments = segments.len(), "parsed document source");
        self.ingest_into(index, &segments).await
    }

    /// Build a [`Retriever`] over `index` with the configured default k.
    pub fn retriever(&self, index: &IndexHandle) -> Result<Retriever> {
        Retriever::new(Arc::clone(&self.embedder), Arc::clone(index), self.config.top_k)
    }

    /// Retrieve the `k` fragments most relevant to `question`.
    ///
    /// # Errors
    ///
    /// Surfaces `EmbeddingUnavailable`, `DimensionMismatch`, and
    /// `EmptyIndex` unchanged.
    pub async fn query(
        &self,
        index: &IndexHandle,
        question: &str,
        k: usize,
    ) -> Result<RetrievalResult> {
        self.retriever(index)?.retrieve_k(question, k).await
    }

    /// Produce a grounded answer to `question` from `index`.
    ///
    /// Retrieves the configured `top_k` fragments, assembles a context of at
    /// most `max_context_chars` characters in ranked order, and invokes the
    /// generator with the fixed instruction template. Zero retrieved
    /// fragments still invoke generation with an empty context; deciding
    /// what an "insufficient information" answer looks like is the
    /// generator's responsibility.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if the pipeline was built
    /// without a generator; retrieval failures (including `EmptyIndex` for
    /// an unpopulated index) and [`RagError::GenerationUnavailable`]
    /// propagate unchanged.
    pub async fn answer(&self, index: &IndexHandle, question: &str) -> Result<String> {
        let ranked = self.retriever(index)?.retrieve(question).await?;
        self.generate_from(question, &ranked).await
    }

    /// Like [`answer`](Self::answer), but keeps only fragments matching
    /// every filter before assembling the context.
    ///
    /// Post-filtering can leave zero fragments; generation is still invoked
    /// with an empty context in that case.
    pub async fn answer_filtered(
        &self,
        index: &IndexHandle,
        question: &str,
        filters: &[MetadataFilter],
    ) -> Result<String> {
        let ranked = self
            .retriever(index)?
            .retrieve_filtered(question, self.config.top_k, filters)
            .await?;
        self.generate_from(question, &ranked).await
    }

    async fn generate_from(&self, question: &str, ranked: &[ScoredFragment]) -> Result<String> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            RagError::InvalidConfiguration(
                "no generator configured; build the pipeline with .generator(...) to use answer"
                    .to_string(),
            )
        })?;

        let request = GenerationRequest {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            context: assemble_context(ranked, self.config.max_context_chars),
            question: question.to_string(),
        };
        let response = generator.generate(&request).await?;
        info!(retrieved = ranked.len(), "generated grounded answer");
        Ok(response)
    }
}

/// Concatenate fragment texts in ranked order, bounded to `max_chars`
/// characters.
///
/// Fragments are joined with blank lines; the first fragment that does not
/// fit whole is truncated to the remaining budget and ends the context.
pub fn assemble_context(results: &[ScoredFragment], max_chars: usize) -> String {
    let mut context = String::new();
    let mut used = 0usize;
    for scored in results {
        let separator = if context.is_empty() { 0 } else { 2 };
        let budget = max_chars.saturating_sub(used + separator);
        if budget == 0 {
            break;
        }
        if separator > 0 {
            context.push_str("\n\n");
            used += separator;
        }
        let text = &scored.fragment.text;
        let length = text.chars().count();
        if length <= budget {
            context.push_str(text);
            used += length;
        } else {
            context.extend(text.chars().take(budget));
            break;
        }
    }
    context
}

/// Builder for constructing a [`RagPipeline`].
///
/// The embedder and fragmenter are required; the generator is optional (a
/// retrieval-only pipeline is legal, but `answer` will fail). The config
/// defaults to [`RagConfig::default()`].
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    fragmenter: Option<Arc<dyn Fragmenter>>,
    generator: Option<Arc<dyn Generator>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding adapter.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the fragmenter.
    pub fn fragmenter(mut self, fragmenter: Arc<dyn Fragmenter>) -> Self {
        self.fragmenter = Some(fragmenter);
        self
    }

    /// Set an optional generator for grounded answering.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`RagPipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if the embedder or
    /// fragmenter is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self.embedder.ok_or_else(|| {
            RagError::InvalidConfiguration("an embedder is required".to_string())
        })?;
        let fragmenter = self.fragmenter.ok_or_else(|| {
            RagError::InvalidConfiguration("a fragmenter is required".to_string())
        })?;

        Ok(RagPipeline { config, embedder, fragmenter, generator: self.generator })
    }
}
