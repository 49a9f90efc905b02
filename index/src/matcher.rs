use crate::record::SearchIndex;

/// The winning narrative and its raw dot-product score.
///
/// The score is unnormalized (not cosine), so it is only comparable across
/// records embedded by the same model as the query.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Every record in the index lacked a usable embedding; the index is
    /// unusable as a whole.
    #[error("no records with a usable embedding in the index")]
    NoValidEmbeddings,
    /// A candidate embedding's length differs from the query vector's.
    #[error("embedding dimension mismatch: query has {expected}, record has {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Raw dot product of two equal-length vectors, accumulated in f64.
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut sum = 0.0f64;
    for i in 0..a.len() {
        sum += a[i] as f64 * b[i] as f64;
    }
    sum as f32
}

/// Return the text and score of the record most similar to `query`.
///
/// Records without an embedding are skipped (partially corrupt ingestion
/// output must not sink the whole request); if none remain the index is
/// reported unusable. Ties break to the lowest original index, so the
/// result is deterministic for identical input.
pub fn find_best_match(query: &[f32], index: &SearchIndex) -> Result<MatchResult, MatchError> {
    let candidates: Vec<(&str, &[f32])> = index
        .records()
        .iter()
        .filter_map(|r| r.embedding.as_deref().map(|e| (r.text.as_str(), e)))
        .collect();
    if candidates.is_empty() {
        return Err(MatchError::NoValidEmbeddings);
    }

    let mut scores = Vec::with_capacity(candidates.len());
    for (_, embedding) in &candidates {
        if embedding.len() != query.len() {
            return Err(MatchError::DimensionMismatch {
                expected: query.len(),
                got: embedding.len(),
            });
        }
        scores.push(dot_product(query, embedding));
    }

    // Stable argmax: strict > keeps the first occurrence on ties.
    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
    }

    Ok(MatchResult {
        text: candidates[best].0.to_string(),
        score: scores[best],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NarrativeRecord;

    fn rec(text: &str, embedding: Option<Vec<f32>>) -> NarrativeRecord {
        NarrativeRecord {
            text: text.to_string(),
            embedding,
            file_name: None,
        }
    }

    #[test]
    fn picks_highest_dot_product() {
        let index = SearchIndex::new(vec![
            rec("A", Some(vec![1.0, 0.0])),
            rec("B", Some(vec![0.0, 1.0])),
        ]);
        let m = find_best_match(&[0.9, 0.1], &index).unwrap();
        assert_eq!(m.text, "A");
        assert!((m.score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn tie_breaks_to_first_occurrence() {
        let index = SearchIndex::new(vec![
            rec("A", Some(vec![1.0, 0.0])),
            rec("B", Some(vec![1.0, 0.0])),
        ]);
        let m = find_best_match(&[1.0, 0.0], &index).unwrap();
        assert_eq!(m.text, "A");
        assert!((m.score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn winner_dominates_all_candidates() {
        let index = SearchIndex::new(vec![
            rec("a", Some(vec![0.2, 0.3, 0.1])),
            rec("b", Some(vec![0.9, -0.4, 0.5])),
            rec("c", Some(vec![-0.1, 0.8, 0.2])),
            rec("d", Some(vec![0.4, 0.4, 0.4])),
        ]);
        let query = [0.6, 0.1, 0.3];
        let m = find_best_match(&query, &index).unwrap();
        for r in index.records() {
            let s = dot_product(&query, r.embedding.as_deref().unwrap());
            assert!(m.score >= s);
        }
    }

    #[test]
    fn records_without_embeddings_are_never_returned() {
        let index = SearchIndex::new(vec![
            rec("A", Some(vec![0.1, 0.0])),
            rec("no-vec", None),
            rec("C", Some(vec![1.0, 0.0])),
        ]);
        let m = find_best_match(&[1.0, 0.0], &index).unwrap();
        assert_eq!(m.text, "C");
    }

    #[test]
    fn all_invalid_yields_no_valid_embeddings() {
        let index = SearchIndex::new(vec![rec("x", None), rec("y", None)]);
        let err = find_best_match(&[1.0], &index).unwrap_err();
        assert_eq!(err, MatchError::NoValidEmbeddings);
    }

    #[test]
    fn empty_index_yields_no_valid_embeddings() {
        let index = SearchIndex::default();
        let err = find_best_match(&[1.0], &index).unwrap_err();
        assert_eq!(err, MatchError::NoValidEmbeddings);
    }

    #[test]
    fn mismatched_dimension_is_reported() {
        let index = SearchIndex::new(vec![
            rec("A", Some(vec![1.0, 0.0, 0.0])),
            rec("B", Some(vec![0.0, 1.0])),
        ]);
        let err = find_best_match(&[1.0, 0.0, 0.0], &index).unwrap_err();
        assert_eq!(
            err,
            MatchError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn dot_product_matches_manual_sum() {
        let s = dot_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert!((s - 32.0).abs() < 1e-6);
    }
}
