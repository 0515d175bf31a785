use async_trait::async_trait;
use serde_json::Value;
use vectordb_client::{ClientError, Session, connect_with_config};

use super::MilvusConfig;
use super::wire::{self, Row};
use crate::conversions::{batch_rows, index_state, rows_to_columns, search_hit};
use crate::error::{ClientResultExt, VectorError, VectorResult};
use crate::models::{
    CollectionSchema, ColumnBatch, IndexSpec, IndexState, InsertReceipt, LoadState, QueryRequest,
    QueryResult, RankedResultSet, SearchRequest,
};
use crate::repository::VectorRepository;

/// Milvus-backed implementation of VectorRepository, over REST v2
#[derive(Debug, Clone)]
pub struct MilvusRepository {
    session: Session,
}

impl MilvusRepository {
    /// Connects with the fail-fast handshake from `config`
    pub async fn connect(config: &MilvusConfig) -> VectorResult<Self> {
        let session = connect_with_config(config.url.clone(), config.session_config())
            .await
            .during("connect")?;
        Ok(Self { session })
    }

    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn close(self) {
        self.session.close();
    }

    fn db(&self) -> &str {
        self.session.database()
    }

    fn collection_ref<'a>(&'a self, name: &'a str) -> wire::CollectionRef<'a> {
        wire::CollectionRef {
            db_name: self.db(),
            collection_name: name,
        }
    }

    async fn primary_field(&self, collection: &str) -> VectorResult<String> {
        let schema = self
            .describe_collection(collection)
            .await?
            .ok_or_else(|| VectorError::NotFound(format!("collection '{}'", collection)))?;
        schema
            .primary_key()
            .map(|pk| pk.name.clone())
            .ok_or_else(|| VectorError::Internal(format!("collection '{}' has no primary key", collection)))
    }
}

#[async_trait]
impl VectorRepository for MilvusRepository {
    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        let body = wire::DatabaseRef { db_name: self.db() };
        self.session
            .post(wire::LIST_COLLECTIONS, &body)
            .await
            .during("list_collections")
    }

    async fn describe_collection(&self, name: &str) -> VectorResult<Option<CollectionSchema>> {
        let result: Result<wire::CollectionDescription, ClientError> = self
            .session
            .post(wire::DESCRIBE_COLLECTION, &self.collection_ref(name))
            .await;

        match result.during("describe_collection") {
            Ok(desc) => CollectionSchema::try_from(desc).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> VectorResult<()> {
        let body = wire::CreateCollectionBody {
            db_name: self.db(),
            collection_name: &schema.name,
            description: &schema.description,
            schema: wire::SchemaBody::from(schema),
            params: wire::CreateParams {
                shards_num: schema.shard_count,
            },
        };
        let _: Value = self
            .session
            .post(wire::CREATE_COLLECTION, &body)
            .await
            .during("create_collection")?;
        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> VectorResult<()> {
        let _: Value = self
            .session
            .post(wire::DROP_COLLECTION, &self.collection_ref(name))
            .await
            .during("drop_collection")?;
        Ok(())
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> VectorResult<()> {
        let body = wire::CreateIndexBody {
            db_name: self.db(),
            collection_name: collection,
            index_params: vec![wire::IndexParamBody::from(index)],
        };
        let _: Value = self
            .session
            .post(wire::CREATE_INDEX, &body)
            .await
            .during("create_index")?;
        Ok(())
    }

    async fn index_state(&self, collection: &str, index_name: &str) -> VectorResult<IndexState> {
        let body = wire::DescribeIndexBody {
            db_name: self.db(),
            collection_name: collection,
            index_name,
        };
        let result: Result<Vec<wire::IndexDescription>, ClientError> =
            self.session.post(wire::DESCRIBE_INDEX, &body).await;

        match result.during("describe_index") {
            Ok(indexes) => Ok(index_state(index_name, indexes)),
            // the index may not be registered yet right after submission
            Err(e) if e.is_not_found() => Ok(IndexState::None),
            Err(e) => Err(e),
        }
    }

    async fn load_collection(&self, name: &str) -> VectorResult<()> {
        let _: Value = self
            .session
            .post(wire::LOAD_COLLECTION, &self.collection_ref(name))
            .await
            .during("load_collection")?;
        Ok(())
    }

    async fn load_state(&self, name: &str) -> VectorResult<LoadState> {
        let body: wire::LoadStateBody = self
            .session
            .post(wire::GET_LOAD_STATE, &self.collection_ref(name))
            .await
            .during("get_load_state")?;
        Ok(LoadState::from(body))
    }

    async fn insert(&self, batch: &ColumnBatch) -> VectorResult<InsertReceipt> {
        let body = wire::InsertBody {
            db_name: self.db(),
            collection_name: &batch.collection_name,
            partition_name: &batch.partition_name,
            data: batch_rows(batch),
        };
        let response: wire::InsertResponse = self
            .session
            .post(wire::INSERT, &body)
            .await
            .during("insert")?;
        Ok(InsertReceipt::from(response))
    }

    async fn query(&self, request: &QueryRequest) -> VectorResult<QueryResult> {
        let body = wire::QueryBody {
            db_name: self.db(),
            collection_name: &request.collection_name,
            filter: &request.filter,
            output_fields: &request.output_fields,
            partition_names: &request.partition_names,
            limit: request.limit,
        };
        let rows: Vec<Row> = self
            .session
            .post(wire::QUERY, &body)
            .await
            .during("query")?;
        Ok(rows_to_columns(rows, &request.output_fields))
    }

    async fn search(&self, request: &SearchRequest) -> VectorResult<Vec<RankedResultSet>> {
        let primary = self.primary_field(&request.collection_name).await?;
        let mut results = Vec::with_capacity(request.vectors.len());

        for vector in &request.vectors {
            let body = wire::SearchBody {
                db_name: self.db(),
                collection_name: &request.collection_name,
                data: [vector.as_slice()],
                anns_field: &request.vector_field,
                limit: request.top_k,
                output_fields: &request.output_fields,
                filter: request.filter.as_deref(),
                partition_names: &request.partition_names,
                search_params: wire::SearchParams {
                    metric_type: request.metric,
                    params: &request.params,
                },
            };
            let data: wire::SearchData = self
                .session
                .post(wire::SEARCH, &body)
                .await
                .during("search")?;

            let hits = data
                .into_first()
                .into_iter()
                .map(|row| search_hit(row, &primary))
                .collect::<VectorResult<Vec<_>>>()?;
            results.push(RankedResultSet::new(hits));
        }

        Ok(results)
    }
}
