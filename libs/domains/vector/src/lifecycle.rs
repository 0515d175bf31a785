use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::{VectorError, VectorResult};
use crate::models::{CollectionSchema, IndexSpec, IndexState, LoadState, MetricType};
use crate::repository::VectorRepository;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Collection creation, indexing, loading and removal
///
/// `create_index` and `load` return only once the server reports the work
/// finished (or the operation timeout expires).
pub struct CollectionLifecycle<R: VectorRepository> {
    repository: Arc<R>,
    poll_interval: Duration,
    operation_timeout: Duration,
}

impl<R: VectorRepository> CollectionLifecycle<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self {
            repository,
            poll_interval: DEFAULT_POLL_INTERVAL,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Validates `schema` and creates the collection unless one with the same
    /// name already exists.
    #[instrument(skip(self, schema), fields(collection = %schema.name))]
    pub async fn create(&self, schema: &CollectionSchema) -> VectorResult<CreateOutcome> {
        schema
            .validate()
            .map_err(|e| VectorError::SchemaInvalid(e.to_string()))?;

        let existing = self.repository.list_collections().await?;
        if existing.iter().any(|name| name == &schema.name) {
            info!(collection = %schema.name, "Collection already exists, skipping create");
            return Ok(CreateOutcome::AlreadyExists);
        }

        self.repository.create_collection(schema).await?;
        info!(
            collection = %schema.name,
            shards = schema.shard_count,
            fields = schema.fields.len(),
            "Collection created"
        );
        Ok(CreateOutcome::Created)
    }

    #[instrument(skip(self))]
    pub async fn drop(&self, name: &str) -> VectorResult<()> {
        self.repository.drop_collection(name).await?;
        info!(collection = name, "Collection dropped");
        Ok(())
    }

    /// Drops every collection in the database, returning the dropped names.
    ///
    /// Stops at the first failure. Collections dropped before it stay dropped.
    #[instrument(skip(self))]
    pub async fn drop_all(&self) -> VectorResult<Vec<String>> {
        let names = self.repository.list_collections().await?;
        let mut dropped = Vec::with_capacity(names.len());

        for name in names {
            if let Err(e) = self.repository.drop_collection(&name).await {
                warn!(
                    collection = %name,
                    dropped = dropped.len(),
                    error = %e,
                    "Drop-all aborted"
                );
                return Err(e);
            }
            info!(collection = %name, "Collection dropped");
            dropped.push(name);
        }

        Ok(dropped)
    }

    /// Builds an IVF_FLAT index on `field` and waits for it to finish
    pub async fn create_index(
        &self,
        collection: &str,
        field: &str,
        metric: MetricType,
        nlist: u32,
    ) -> VectorResult<()> {
        let spec = IndexSpec::ivf_flat(field, metric, nlist);
        self.create_index_with(collection, &spec, true).await
    }

    #[instrument(skip(self, spec), fields(field = %spec.field_name, index_type = %spec.index_type))]
    pub async fn create_index_with(
        &self,
        collection: &str,
        spec: &IndexSpec,
        wait: bool,
    ) -> VectorResult<()> {
        self.repository.create_index(collection, spec).await?;
        if !wait {
            return Ok(());
        }

        self.wait_until("create_index", collection, move || async move {
            match self.repository.index_state(collection, &spec.index_name).await? {
                IndexState::Finished => Ok(true),
                IndexState::Failed(reason) => Err(VectorError::Internal(format!(
                    "index '{}' on '{}' failed: {}",
                    spec.index_name, collection, reason
                ))),
                IndexState::None | IndexState::InProgress { .. } => Ok(false),
            }
        })
        .await?;

        info!(collection, index = %spec.index_name, "Index built");
        Ok(())
    }

    /// Loads the collection into serving memory and waits until it is queryable
    pub async fn load(&self, collection: &str) -> VectorResult<()> {
        self.load_with(collection, true).await
    }

    #[instrument(skip(self))]
    pub async fn load_with(&self, collection: &str, wait: bool) -> VectorResult<()> {
        self.repository.load_collection(collection).await?;
        if !wait {
            return Ok(());
        }

        self.wait_until("load", collection, move || async move {
            match self.repository.load_state(collection).await? {
                LoadState::Loaded => Ok(true),
                LoadState::NotExist => Err(VectorError::NotFound(format!("collection '{}'", collection))),
                LoadState::NotLoaded | LoadState::Loading { .. } => Ok(false),
            }
        })
        .await?;

        info!(collection, "Collection loaded");
        Ok(())
    }

    /// Polls `probe` until it reports done, bounded by the operation timeout
    async fn wait_until<F, Fut>(&self, operation: &str, target: &str, mut probe: F) -> VectorResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = VectorResult<bool>>,
    {
        let poll = async {
            loop {
                if probe().await? {
                    return Ok::<(), VectorError>(());
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };

        match tokio::time::timeout(self.operation_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(VectorError::OperationTimeout {
                operation: operation.to_string(),
                target: target.to_string(),
                timeout: self.operation_timeout,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VectorErrorKind;
    use crate::repository::MockVectorRepository;
    use crate::schema::{float_vector_field, scalar_varchar_field, SchemaBuilder};
    use mockall::predicate::*;
    use mockall::Sequence;
    use vectordb_client::ClientError;

    fn words_schema() -> CollectionSchema {
        SchemaBuilder::new()
            .with_name("words")
            .with_fields([
                scalar_varchar_field("word", 64, true, false),
                float_vector_field("embedding", 3),
            ])
            .build()
    }

    fn fast(mock: MockVectorRepository) -> CollectionLifecycle<MockVectorRepository> {
        CollectionLifecycle::new(mock)
            .with_poll_interval(Duration::from_millis(1))
            .with_operation_timeout(Duration::from_millis(200))
    }

    fn remote_failure(operation: &str) -> VectorError {
        VectorError::from_client(
            operation,
            ClientError::Api {
                code: 65535,
                message: "boom".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_create_new_collection() {
        let mut mock = MockVectorRepository::new();
        mock.expect_list_collections()
            .times(1)
            .returning(|| Ok(vec!["books".to_string()]));
        mock.expect_create_collection()
            .withf(|schema| schema.name == "words" && schema.shard_count == 2)
            .times(1)
            .returning(|_| Ok(()));

        let outcome = fast(mock).create(&words_schema()).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Created);
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let mut mock = MockVectorRepository::new();
        mock.expect_list_collections()
            .returning(|| Ok(vec!["words".to_string()]));
        mock.expect_create_collection().times(0);

        let lifecycle = fast(mock);
        assert_eq!(
            lifecycle.create(&words_schema()).await.unwrap(),
            CreateOutcome::AlreadyExists
        );
        assert_eq!(
            lifecycle.create(&words_schema()).await.unwrap(),
            CreateOutcome::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_invalid_schema_never_reaches_server() {
        let mut mock = MockVectorRepository::new();
        mock.expect_list_collections().times(0);
        mock.expect_create_collection().times(0);

        let schema = SchemaBuilder::new()
            .with_name("words")
            .with_field(float_vector_field("embedding", 3))
            .build();

        let err = fast(mock).create(&schema).await.unwrap_err();
        assert_eq!(err.kind(), VectorErrorKind::SchemaInvalid);
    }

    #[tokio::test]
    async fn test_create_propagates_list_failure() {
        let mut mock = MockVectorRepository::new();
        mock.expect_list_collections()
            .returning(|| Err(remote_failure("list_collections")));
        mock.expect_create_collection().times(0);

        let err = fast(mock).create(&words_schema()).await.unwrap_err();
        assert_eq!(err.kind(), VectorErrorKind::Remote);
        assert!(err.to_string().contains("list_collections"));
    }

    #[tokio::test]
    async fn test_drop_all_drops_everything() {
        let mut mock = MockVectorRepository::new();
        let mut seq = Sequence::new();
        mock.expect_list_collections()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec!["words".to_string(), "books".to_string()]));
        mock.expect_drop_collection()
            .with(eq("words"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_drop_collection()
            .with(eq("books"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let dropped = fast(mock).drop_all().await.unwrap();
        assert_eq!(dropped, vec!["words", "books"]);
    }

    #[tokio::test]
    async fn test_drop_all_aborts_on_first_failure() {
        let mut mock = MockVectorRepository::new();
        mock.expect_list_collections()
            .returning(|| Ok(vec!["a".to_string(), "b".to_string(), "c".to_string()]));
        mock.expect_drop_collection()
            .with(eq("a"))
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_drop_collection()
            .with(eq("b"))
            .times(1)
            .returning(|_| Err(remote_failure("drop_collection")));
        mock.expect_drop_collection().with(eq("c")).times(0);

        let err = fast(mock).drop_all().await.unwrap_err();
        assert_eq!(err.kind(), VectorErrorKind::Remote);
    }

    #[tokio::test]
    async fn test_create_index_waits_for_finish() {
        let mut mock = MockVectorRepository::new();
        mock.expect_create_index()
            .withf(|collection, spec| {
                collection == "words"
                    && spec.field_name == "embedding"
                    && spec.metric == MetricType::L2
                    && spec.params["nlist"] == 1024
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut polls = 0;
        mock.expect_index_state().times(3).returning(move |_, _| {
            polls += 1;
            Ok(match polls {
                1 => IndexState::None,
                2 => IndexState::InProgress {
                    indexed_rows: 2,
                    total_rows: 5,
                },
                _ => IndexState::Finished,
            })
        });

        fast(mock)
            .create_index("words", "embedding", MetricType::L2, 1024)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_index_failure_surfaces_reason() {
        let mut mock = MockVectorRepository::new();
        mock.expect_create_index().returning(|_, _| Ok(()));
        mock.expect_index_state()
            .returning(|_, _| Ok(IndexState::Failed("out of memory".to_string())));

        let err = fast(mock)
            .create_index("words", "embedding", MetricType::L2, 1024)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out of memory"));
    }

    #[tokio::test]
    async fn test_async_index_skips_polling() {
        let mut mock = MockVectorRepository::new();
        mock.expect_create_index().times(1).returning(|_, _| Ok(()));
        mock.expect_index_state().times(0);

        let spec = IndexSpec::ivf_flat("embedding", MetricType::L2, 128);
        fast(mock)
            .create_index_with("words", &spec, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_load_times_out() {
        let mut mock = MockVectorRepository::new();
        mock.expect_load_collection()
            .with(eq("words"))
            .returning(|_| Ok(()));
        mock.expect_load_state()
            .returning(|_| Ok(LoadState::Loading { progress: 10 }));

        let err = fast(mock).load("words").await.unwrap_err();
        assert_eq!(err.kind(), VectorErrorKind::OperationTimeout);
        assert!(err.to_string().contains("words"));
    }

    #[tokio::test]
    async fn test_load_succeeds_once_loaded() {
        let mut mock = MockVectorRepository::new();
        mock.expect_load_collection().times(1).returning(|_| Ok(()));
        mock.expect_load_state()
            .times(1)
            .returning(|_| Ok(LoadState::Loaded));

        fast(mock).load("words").await.unwrap();
    }
}
