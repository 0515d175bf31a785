//! Vector Domain Library
//!
//! Collection lifecycle, insertion and similarity search against a Milvus
//! vector database, behind a repository trait so the orchestration logic can
//! be tested without a server.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐   ┌─────────────────┐
//! │ CollectionLifecycle │   │    DataPlane    │  ← validation, polling, ranking
//! └──────────┬──────────┘   └────────┬────────┘
//!            └────────────┬──────────┘
//!                ┌────────▼────────┐
//!                │ VectorRepository│
//!                │     (trait)     │
//!                └────────┬────────┘
//!                ┌────────▼────────┐
//!                │ MilvusRepository│  ← REST v2 via vectordb-client
//!                └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_vector::{
//!     CollectionLifecycle, DataPlane, MetricType, MilvusConfig, MilvusRepository, SearchRequest,
//!     schema::{SchemaBuilder, float_vector_field, scalar_varchar_field},
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MilvusConfig::from_env()?;
//! let repository = Arc::new(MilvusRepository::connect(&config).await?);
//!
//! let lifecycle = CollectionLifecycle::from_shared(repository.clone());
//! let schema = SchemaBuilder::new()
//!     .with_name("words")
//!     .with_fields([
//!         scalar_varchar_field("word", 64, true, false),
//!         float_vector_field("embedding", 10),
//!     ])
//!     .build();
//! lifecycle.create(&schema).await?;
//! lifecycle.create_index("words", "embedding", MetricType::L2, 1024).await?;
//! lifecycle.load("words").await?;
//!
//! let data = DataPlane::from_shared(repository);
//! let request = SearchRequest::new("words", "embedding", vec![vec![0.1; 10]], 10);
//! let results = data.search(&request).await?;
//! # Ok(())
//! # }
//! ```

pub mod conversions;
pub mod data_plane;
pub mod error;
pub mod lifecycle;
pub mod milvus;
pub mod models;
pub mod repository;
pub mod schema;

pub use data_plane::{DataPlane, validate_batch};
pub use error::{VectorError, VectorErrorKind, VectorResult};
pub use lifecycle::{CollectionLifecycle, CreateOutcome};
pub use milvus::{MilvusConfig, MilvusRepository};
pub use models::{
    CollectionSchema, Column, ColumnBatch, ColumnData, FieldKind, FieldSpec, IndexSpec, IndexState,
    IndexType, InsertReceipt, LoadState, MetricType, PrimaryKey, QueryRequest, QueryResult,
    RankedResultSet, ResultColumn, SearchHit, SearchRequest,
};
pub use repository::VectorRepository;
pub use schema::SchemaBuilder;
