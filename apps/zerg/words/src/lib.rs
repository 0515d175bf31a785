//! Word Embedding Pipeline
//!
//! Trains word vectors from a corpus, answers a nearest-neighbour query
//! locally, then stores the vectors in Milvus and repeats the lookup there.
//!
//! ## Flow
//!
//! ```text
//! corpus.txt
//!   ↓ train (word2vec CBOW, negative sampling)
//! vectors.txt ──→ query_similar (local cosine ranking)
//!   ↓ load_embeddings
//! MilvusRepository
//!   ↓ create → insert → index (IVF_FLAT, L2) → load
//! search (query word's vector) → scalar query → optional drop
//! ```
//!
//! ## Modules
//!
//! - `config`: environment-driven settings for the pipeline
//! - `pipeline`: step sequencing, timing and the failure-policy boundary

pub mod config;
pub mod pipeline;

pub use config::WordsConfig;
pub use pipeline::run;
