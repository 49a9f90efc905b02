use crate::matcher::{MatchError, find_best_match};
use crate::record::SearchIndex;
use crate::service::{AnswerGenerator, QueryEmbedder, ServiceError};

/// The generated answer plus the narrative it was grounded in.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub narrative: String,
    pub score: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The query was empty or whitespace. A caller-side condition, unlike
    /// the other kinds.
    #[error("empty query")]
    EmptyQuery,
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Full flow for one request: embed the query, scan the index for the
/// nearest narrative, have the generator explain it.
///
/// Pure apart from the two collaborator calls; the index is only read.
pub fn answer_query(
    embedder: &dyn QueryEmbedder,
    generator: &dyn AnswerGenerator,
    index: &SearchIndex,
    query: &str,
) -> Result<Answer, QueryError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    let vector = embedder.embed(query)?;
    let matched = find_best_match(&vector, index)?;
    let text = generator.generate(query, &matched.text)?;
    Ok(Answer {
        text,
        narrative: matched.text,
        score: matched.score,
    })
}
