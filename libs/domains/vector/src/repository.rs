use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{
    CollectionSchema, ColumnBatch, IndexSpec, IndexState, InsertReceipt, LoadState, QueryRequest,
    QueryResult, RankedResultSet, SearchRequest,
};

/// Repository trait for the remote vector database
///
/// One method per remote call. Implementations do no sequencing, polling or
/// validation; that belongs to `CollectionLifecycle` and `DataPlane`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    // ===== Collection Management =====

    /// Names of every collection in the database
    async fn list_collections(&self) -> VectorResult<Vec<String>>;

    /// Schema of a collection, `None` if it does not exist
    async fn describe_collection(&self, name: &str) -> VectorResult<Option<CollectionSchema>>;

    async fn create_collection(&self, schema: &CollectionSchema) -> VectorResult<()>;

    async fn drop_collection(&self, name: &str) -> VectorResult<()>;

    // ===== Index & Load =====

    /// Submit an index build; returns once the server has accepted it
    async fn create_index(&self, collection: &str, index: &IndexSpec) -> VectorResult<()>;

    async fn index_state(&self, collection: &str, index_name: &str) -> VectorResult<IndexState>;

    /// Request loading into serving memory; returns once accepted
    async fn load_collection(&self, name: &str) -> VectorResult<()>;

    async fn load_state(&self, name: &str) -> VectorResult<LoadState>;

    // ===== Data =====

    async fn insert(&self, batch: &ColumnBatch) -> VectorResult<InsertReceipt>;

    async fn query(&self, request: &QueryRequest) -> VectorResult<QueryResult>;

    /// One result set per query vector, in request order
    async fn search(&self, request: &SearchRequest) -> VectorResult<Vec<RankedResultSet>>;
}
