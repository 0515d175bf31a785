use std::collections::HashMap;

use thiserror::Error;

use crate::models::{EmbeddingRecord, Neighbor, Neighbors};

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("no embeddings to search")]
    Empty,

    #[error("vector for '{word}' has {actual} components, expected {expected}")]
    RaggedRecords {
        word: String,
        expected: usize,
        actual: usize,
    },

    #[error("query vector has {actual} components, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Cosine-similarity index over an in-memory embedding set.
///
/// Ties keep the order the records were supplied in.
#[derive(Debug)]
pub struct Searcher {
    records: Vec<EmbeddingRecord>,
    norms: Vec<f32>,
    index: HashMap<String, usize>,
    dimension: usize,
}

impl Searcher {
    pub fn new(records: Vec<EmbeddingRecord>) -> Result<Self, SearchError> {
        let dimension = records.first().map(|r| r.dimension()).ok_or(SearchError::Empty)?;

        if let Some(bad) = records.iter().find(|r| r.dimension() != dimension) {
            return Err(SearchError::RaggedRecords {
                word: bad.word.clone(),
                expected: dimension,
                actual: bad.dimension(),
            });
        }

        let norms = records.iter().map(|r| norm(&r.vector)).collect();
        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.word.clone(), i))
            .collect();

        Ok(Self {
            records,
            norms,
            index,
            dimension,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&i| self.records[i].vector.as_slice())
    }

    /// The `k` words closest to `word`, excluding `word` itself.
    ///
    /// Returns an empty ranking when `word` is not in the vocabulary.
    pub fn search_internal(&self, word: &str, k: usize) -> Neighbors {
        let Some(&origin) = self.index.get(word) else {
            return Neighbors::default();
        };
        self.rank(&self.records[origin].vector, self.norms[origin], Some(origin), k)
    }

    /// The `k` words closest to an arbitrary vector
    pub fn search_vector(&self, vector: &[f32], k: usize) -> Result<Neighbors, SearchError> {
        if vector.len() != self.dimension {
            return Err(SearchError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(self.rank(vector, norm(vector), None, k))
    }

    fn rank(&self, query: &[f32], query_norm: f32, skip: Option<usize>, k: usize) -> Neighbors {
        let mut scored: Vec<(usize, f32)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .map(|(i, r)| (i, cosine(query, query_norm, &r.vector, self.norms[i])))
            .collect();

        // stable: equal scores stay in record order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Neighbors::new(
            scored
                .into_iter()
                .enumerate()
                .map(|(rank, (i, similarity))| Neighbor {
                    rank: rank + 1,
                    word: self.records[i].word.clone(),
                    similarity,
                })
                .collect(),
        )
    }
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
