//! Text-generation boundary for grounded answering.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A structured prompt for the generation capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// The fixed instruction the answering pipeline conditions on.
    pub instruction: String,
    /// Retrieved fragment texts, concatenated in ranked order. May be empty.
    pub context: String,
    /// The user's question.
    pub question: String,
}

impl GenerationRequest {
    /// Render the request as a single prompt string, for providers that take
    /// flat text rather than structured messages.
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\nContext:\n{}\n\nQuestion: {}",
            self.instruction, self.context, self.question
        )
    }
}

/// A provider that produces a text response from a structured prompt.
///
/// Implementations wrap specific generation backends. Failures surface as
/// [`RagError::GenerationUnavailable`](crate::RagError::GenerationUnavailable).
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a response for the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
