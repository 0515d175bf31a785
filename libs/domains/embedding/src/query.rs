use std::path::Path;

use tracing::{instrument, warn};

use crate::error::{EmbeddingResult, FileError};
use crate::models::Neighbors;
use crate::persistence::load_embeddings;
use crate::search::Searcher;

pub const DEFAULT_NEIGHBORS: usize = 10;

/// Loads `path` and ranks the `k` words most similar to `word`.
///
/// A word missing from the vocabulary is not an error: the ranking comes
/// back empty and a warning is logged.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn query_similar(word: &str, path: impl AsRef<Path>, k: usize) -> EmbeddingResult<Neighbors> {
    let path = path.as_ref();
    let records = load_embeddings(path)?;
    let searcher = Searcher::new(records).map_err(|e| FileError::model_search(path, e))?;

    if !searcher.contains(word) {
        warn!(word, "Word not in vocabulary; no neighbours returned");
        return Ok(Neighbors::default());
    }

    Ok(searcher.search_internal(word, k))
}
