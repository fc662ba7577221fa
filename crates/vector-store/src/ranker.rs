use crate::embeddings::validate_embedding;
use crate::error::{Result, VectorStoreError};
use crate::types::{IndexedChunk, RetrievalResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Number of results to keep
    pub top_k: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

impl RankerConfig {
    pub fn validate(&self) -> Result<()> {
        validate_top_k(self.top_k)
    }
}

fn validate_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(VectorStoreError::invalid_config("top_k must be a positive integer"));
    }
    Ok(())
}

/// Cosine similarity of two equal-length vectors.
///
/// Defined as 0 when either vector has zero norm. Unequal lengths are an error.
/// Accumulates in `f64`, where no finite `f32` square overflows or underflows,
/// and never returns `-0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(VectorStoreError::InvalidDimension {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0);
    // + 0.0 folds -0.0 into 0.0 so total_cmp sees them as equal
    Ok(similarity as f32 + 0.0)
}

/// Score every entry against `query` and return the best `top_k`, highest first.
///
/// Full O(n) scan. Equal scores keep insertion order. An empty `entries` slice
/// gives an empty result, not an error. A query with NaN or infinite
/// components is rejected.
pub fn rank<'a>(
    query: &[f32],
    entries: &'a [IndexedChunk],
    top_k: usize,
) -> Result<Vec<RetrievalResult<'a>>> {
    validate_top_k(top_k)?;
    validate_embedding(query, query.len())?;

    let mut scored = entries
        .iter()
        .map(|entry| {
            cosine_similarity(query, &entry.embedding).map(|score| RetrievalResult { entry, score })
        })
        .collect::<Result<Vec<_>>>()?;

    // Stable sort: ties stay in insertion order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);

    log::debug!(
        "Ranked {} entries, kept {} (top_k={})",
        entries.len(),
        scored.len(),
        top_k
    );
    Ok(scored)
}

/// Turn an empty ranking into [`VectorStoreError::EmptyIndex`] for callers that need results
pub fn require_results(results: Vec<RetrievalResult<'_>>) -> Result<Vec<RetrievalResult<'_>>> {
    if results.is_empty() {
        return Err(VectorStoreError::EmptyIndex);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_chunker::Chunk;
    use pretty_assertions::assert_eq;

    fn entries(vectors: &[Vec<f32>]) -> Vec<IndexedChunk> {
        vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| IndexedChunk {
                id,
                chunk: Chunk::new("doc", id, format!("chunk {id}")),
                embedding: vector.clone(),
                word_count: 2,
                char_count: 7,
                created_at_ms: 0,
                preview: format!("chunk {id}"),
            })
            .collect()
    }

    fn ids(results: &[RetrievalResult<'_>]) -> Vec<usize> {
        results.iter().map(|r| r.entry.id).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        let v = [0.3, -1.2, 4.0];
        let neg: Vec<f32> = v.iter().map(|x| -x).collect();
        let w = [2.0, 0.5, -1.0];

        assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&v, &neg).unwrap() + 1.0).abs() < 1e-6);
        assert_eq!(
            cosine_similarity(&v, &w).unwrap(),
            cosine_similarity(&w, &v).unwrap()
        );
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &v).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&v, &[0.0, 0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::InvalidDimension {
                expected: 2,
                actual: 3
            }
        ));

        let stored = entries(&[vec![1.0, 0.0, 0.0]]);
        assert!(rank(&[1.0, 0.0], &stored, 1).is_err());
    }

    #[test]
    fn test_rank_top_k() {
        let stored = entries(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        let results = rank(&[1.0, 0.0], &stored, 2).unwrap();

        assert_eq!(ids(&results), vec![0, 2]);
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!((results[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let stored = entries(&[
            vec![0.0, 1.0],
            vec![2.0, 0.0],
            vec![0.0, 3.0],
            vec![1.0, 0.0],
            vec![5.0, 0.0],
        ]);
        let results = rank(&[1.0, 0.0], &stored, 5).unwrap();
        assert_eq!(ids(&results), vec![1, 3, 4, 0, 2]);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_top_k_larger_than_store() {
        let stored = entries(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(rank(&[1.0, 1.0], &stored, 10).unwrap().len(), 2);
    }

    #[test]
    fn test_zero_vectors_score_zero() {
        let stored = entries(&[vec![0.0, 0.0], vec![-1.0, 0.5], vec![1.0, 0.1]]);
        let results = rank(&[1.0, 0.0], &stored, 3).unwrap();
        assert_eq!(ids(&results), vec![2, 0, 1]);
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn test_extreme_magnitudes_stay_finite() {
        let huge = [1e20_f32, 0.0];
        let tiny = [1e-25_f32, 0.0];
        assert!((cosine_similarity(&huge, &huge).unwrap() - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&tiny, &tiny).unwrap() - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&huge, &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&tiny, &[1.0, 0.0]).unwrap() - 1.0).abs() < 1e-6);

        let stored = entries(&[vec![1.0, 0.0], vec![1e20, 1e20]]);
        let results = rank(&[1.0, 0.0], &stored, 2).unwrap();
        assert_eq!(ids(&results), vec![0, 1]);
        assert!((results[1].score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!(results.iter().all(|r| r.score.is_finite()));
    }

    #[test]
    fn test_negative_zero_ties_keep_insertion_order() {
        let score = cosine_similarity(&[0.0, -1.0], &[-1.0, 0.0]).unwrap();
        assert_eq!(score, 0.0);
        assert!(score.is_sign_positive());

        let stored = entries(&[vec![0.0, -1.0], vec![0.0, 1.0]]);
        let results = rank(&[-1.0, 0.0], &stored, 2).unwrap();
        assert_eq!(ids(&results), vec![0, 1]);
    }

    #[test]
    fn test_non_finite_query_rejected() {
        let stored = entries(&[vec![1.0, 0.0]]);
        assert!(matches!(
            rank(&[f32::NAN, 0.0], &stored, 1),
            Err(VectorStoreError::NonFiniteValue { position: 0, .. })
        ));
        assert!(matches!(
            rank(&[1.0, f32::INFINITY], &stored, 1),
            Err(VectorStoreError::NonFiniteValue { position: 1, .. })
        ));
    }

    #[test]
    fn test_empty_and_invalid_top_k() {
        assert!(rank(&[1.0], &[], 3).unwrap().is_empty());
        assert!(matches!(
            rank(&[1.0], &[], 0),
            Err(VectorStoreError::InvalidConfig(_))
        ));
        assert!(matches!(
            require_results(vec![]),
            Err(VectorStoreError::EmptyIndex)
        ));
    }
}
