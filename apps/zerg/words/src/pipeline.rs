//! Step sequencing for the word embedding pipeline
//!
//! Embedding failures are always returned to the caller. Failures from the
//! vector database go through [`FailurePolicy::enforce`] first, so under the
//! default fail-fast policy they stop the process with a diagnostic naming the
//! failing operation.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{Environment, FailurePolicy, FromEnv};
use domain_embedding::{EmbeddingRecord, load_embeddings, query_similar, train};
use domain_vector::schema::{float_vector_field, scalar_varchar_field};
use domain_vector::{
    CollectionLifecycle, CollectionSchema, Column, ColumnBatch, DataPlane, MetricType,
    MilvusConfig, MilvusRepository, QueryRequest, SchemaBuilder, SearchRequest, VectorError,
    VectorResult,
};
use eyre::{Result, WrapErr};
use tracing::{info, warn};

use crate::config::WordsConfig;

pub const WORD_FIELD: &str = "word";
pub const EMBEDDING_FIELD: &str = "embedding";
/// Longest word stored; longer tokens are skipped at insert time
pub const WORD_MAX_LENGTH: usize = 512;
pub const INDEX_NLIST: u32 = 1024;

/// Run the pipeline
///
/// 1. Installs color-eyre and structured logging (JSON for prod, pretty for dev)
/// 2. Loads `WORDS_*`, `MILVUS_*` and `VECTORDB_FAILURE_POLICY` settings
/// 3. Trains and queries embeddings locally
/// 4. Stores them in Milvus and searches there
///
/// # Errors
///
/// Returns an error if configuration is invalid, training or the local query
/// fails, or (under the `propagate` policy) any vector database call fails.
pub async fn run() -> Result<()> {
    install_color_eyre();
    let environment = Environment::from_env();
    init_tracing(&environment);

    let config = WordsConfig::from_env().wrap_err("Failed to load pipeline configuration")?;
    let milvus = MilvusConfig::from_env().wrap_err("Failed to load Milvus configuration")?;
    let policy = FailurePolicy::from_env().wrap_err("Failed to load failure policy")?;

    info!(
        corpus = %config.corpus_path.display(),
        collection = %config.collection,
        milvus = %milvus.url,
        ?policy,
        "Starting word embedding pipeline"
    );

    let records = embed(&config).await?;
    store_and_search(&config, &milvus, policy, &records).await
}

/// Awaits `step`, logging how long it took
async fn timed<T>(step: &str, fut: impl Future<Output = T>) -> T {
    let started = Instant::now();
    let output = fut.await;
    info!(
        step,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Step finished"
    );
    output
}

/// Routes a vector database result through the failure policy
fn remote<T>(policy: FailurePolicy, operation: &str, result: VectorResult<T>) -> Result<T> {
    policy
        .enforce(operation, result)
        .wrap_err_with(|| format!("Vector database operation '{}' failed", operation))
}

async fn embed(config: &WordsConfig) -> Result<Vec<EmbeddingRecord>> {
    let corpus: PathBuf = config.corpus_path.clone();
    let vectors: PathBuf = config.vectors_path.clone();

    timed("train", async move {
        tokio::task::spawn_blocking(move || train(&corpus, &vectors))
            .await
            .wrap_err("Training task panicked")?
            .wrap_err("Failed to train embeddings")
    })
    .await?;

    let neighbors = timed("query_similar", async {
        query_similar(&config.query, &config.vectors_path, config.top_k)
    })
    .await
    .wrap_err_with(|| format!("Failed to query neighbours of '{}'", config.query))?;

    if neighbors.is_empty() {
        warn!(word = %config.query, "No local neighbours found");
    } else {
        info!(word = %config.query, "Local neighbours\n{}", neighbors.describe());
    }

    load_embeddings(&config.vectors_path).wrap_err("Failed to reload trained embeddings")
}

pub fn words_schema(collection: &str, dimension: usize) -> CollectionSchema {
    SchemaBuilder::new()
        .with_name(collection)
        .with_description("word embeddings")
        .with_fields([
            scalar_varchar_field(WORD_FIELD, WORD_MAX_LENGTH, true, false),
            float_vector_field(EMBEDDING_FIELD, dimension),
        ])
        .build()
}

/// Splits records into insert batches, skipping words too long to store
pub fn insert_batches(
    collection: &str,
    records: &[EmbeddingRecord],
    batch_size: usize,
) -> Vec<ColumnBatch> {
    let storable: Vec<&EmbeddingRecord> = records
        .iter()
        .filter(|r| r.word.len() <= WORD_MAX_LENGTH)
        .collect();
    let skipped = records.len() - storable.len();
    if skipped > 0 {
        warn!(skipped, max_length = WORD_MAX_LENGTH, "Skipping over-long words");
    }

    storable
        .chunks(batch_size.max(1))
        .map(|chunk| {
            ColumnBatch::new(collection)
                .with_column(Column::varchar(
                    WORD_FIELD,
                    chunk.iter().map(|r| r.word.clone()).collect(),
                ))
                .with_column(Column::float_vector(
                    EMBEDDING_FIELD,
                    chunk.iter().map(|r| r.vector.clone()).collect(),
                ))
        })
        .collect()
}

/// `word in ['a','b']` with single quotes escaped
pub fn word_filter<'a>(words: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = words
        .into_iter()
        .map(|w| format!("'{}'", w.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("{} in [{}]", WORD_FIELD, quoted.join(","))
}

async fn store_and_search(
    config: &WordsConfig,
    milvus: &MilvusConfig,
    policy: FailurePolicy,
    records: &[EmbeddingRecord],
) -> Result<()> {
    let Some(dimension) = records.first().map(EmbeddingRecord::dimension) else {
        warn!("No embeddings to store");
        return Ok(());
    };

    let repository = timed("connect", MilvusRepository::connect(milvus)).await;
    let repository = Arc::new(remote(policy, "connect", repository)?);

    let lifecycle = CollectionLifecycle::from_shared(repository.clone())
        .with_operation_timeout(milvus.operation_timeout());
    let data = DataPlane::from_shared(repository.clone());
    let collection = config.collection.as_str();

    let schema = words_schema(collection, dimension);
    let outcome = timed("create_collection", lifecycle.create(&schema)).await;
    remote(policy, "create_collection", outcome)?;

    let batches = insert_batches(collection, records, config.insert_batch_size);
    let inserted = timed("insert", async {
        let mut inserted = 0u64;
        for batch in &batches {
            inserted += data.insert(batch).await?.insert_count;
        }
        Ok::<u64, VectorError>(inserted)
    })
    .await;
    let inserted = remote(policy, "insert", inserted)?;
    info!(collection, inserted, batches = batches.len(), "Embeddings stored");

    let indexed = timed(
        "create_index",
        lifecycle.create_index(collection, EMBEDDING_FIELD, MetricType::L2, INDEX_NLIST),
    )
    .await;
    remote(policy, "create_index", indexed)?;

    let loaded = timed("load_collection", lifecycle.load(collection)).await;
    remote(policy, "load_collection", loaded)?;

    match records.iter().find(|r| r.word == config.query) {
        Some(record) => {
            let request = SearchRequest::new(
                collection,
                EMBEDDING_FIELD,
                vec![record.vector.clone()],
                config.top_k,
            )
            .with_metric(MetricType::L2)
            .with_output_fields([WORD_FIELD]);

            let results = timed("search", data.search(&request)).await;
            let results = remote(policy, "search", results)?;
            for (rank, hit) in results.iter().flat_map(|set| set.hits.iter()).enumerate() {
                info!(rank = rank + 1, id = %hit.id, distance = hit.score, "Search hit");
            }

            let neighbours: Vec<String> = results
                .iter()
                .flat_map(|set| set.hits.iter())
                .map(|hit| hit.id.to_string())
                .collect();
            let request = QueryRequest::new(collection)
                .with_filter(word_filter(neighbours.iter().map(String::as_str)))
                .with_output_fields([WORD_FIELD]);
            let rows = timed("query", data.query(&request)).await;
            let rows = remote(policy, "query", rows)?;
            if let Some(column) = rows.column(WORD_FIELD) {
                let words: Vec<String> = (0..column.len())
                    .filter_map(|i| column.get_as_string(i))
                    .collect();
                info!(rows = column.len(), words = ?words, "Query returned");
            }
        }
        None => warn!(word = %config.query, "Query word not in vocabulary, skipping search"),
    }

    if config.drop_on_exit {
        let dropped = timed("drop_collection", lifecycle.drop(collection)).await;
        remote(policy, "drop_collection", dropped)?;
    }

    drop(lifecycle);
    drop(data);
    if let Ok(repository) = Arc::try_unwrap(repository) {
        repository.close();
    }
    Ok(())
}
