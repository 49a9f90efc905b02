/// Errors from the external embedding/generation service.
///
/// Callers match on the kind; user-facing wording is the surrounding
/// application's job.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("service request timed out")]
    Timeout,
    #[error("service returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Maps a query string to a fixed-dimension embedding vector.
///
/// Implementations must return a vector whose dimension matches the
/// index's embedding dimension; the matcher reports a mismatch otherwise.
pub trait QueryEmbedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
}

/// Produces a grounded answer from a query and the matched narrative.
pub trait AnswerGenerator: Send + Sync {
    fn generate(&self, query: &str, narrative: &str) -> Result<String, ServiceError>;
}

/// Deterministic embedder that returns the same fixed vector for every
/// input. Useful for tests and wiring checks without a network.
pub struct FixedEmbedder(pub Vec<f32>);

impl QueryEmbedder for FixedEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
        Ok(self.0.clone())
    }
}

/// Generator that echoes the matched narrative instead of calling a model.
pub struct EchoGenerator;

impl AnswerGenerator for EchoGenerator {
    fn generate(&self, _query: &str, narrative: &str) -> Result<String, ServiceError> {
        Ok(narrative.to_string())
    }
}
