//! Word embeddings: train vectors from a text corpus, persist them as plain
//! text, and rank nearest neighbours by cosine similarity.
//!
//! ```ignore
//! use domain_embedding::{query_similar, train, DEFAULT_NEIGHBORS};
//!
//! train("corpus.txt", "vectors.txt")?;
//! let neighbors = query_similar("cat", "vectors.txt", DEFAULT_NEIGHBORS)?;
//! println!("{}", neighbors.describe());
//! ```

pub mod error;
pub mod model;
pub mod models;
pub mod persistence;
pub mod query;
pub mod search;
pub mod trainer;
pub mod word2vec;

pub use error::{BoxError, EmbeddingResult, FileError, FileErrorKind, is_kind};
pub use model::EmbeddingModel;
pub use models::{EmbeddingRecord, Neighbor, Neighbors};
pub use persistence::{load_embeddings, read_embeddings, save_embeddings};
pub use query::{DEFAULT_NEIGHBORS, query_similar};
pub use search::{SearchError, Searcher};
pub use trainer::{train, train_with};
pub use word2vec::{Word2Vec, Word2VecConfig};
