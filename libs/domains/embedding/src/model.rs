use std::io::BufRead;

use crate::error::BoxError;
use crate::models::EmbeddingRecord;

/// A trainable word-embedding model.
///
/// The trainer only needs to feed a corpus in and read vectors out; the
/// algorithm behind it is swappable.
pub trait EmbeddingModel {
    /// Train on a whitespace-tokenised corpus, one sentence per line.
    fn train(&mut self, corpus: &mut dyn BufRead) -> Result<(), BoxError>;

    /// Learned vectors, one per vocabulary word.
    fn embeddings(&self) -> Vec<EmbeddingRecord>;

    /// Vector width this model produces.
    fn dimension(&self) -> usize;
}
