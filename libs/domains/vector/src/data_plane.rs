use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::{VectorError, VectorResult};
use crate::models::{
    CollectionSchema, ColumnBatch, ColumnData, FieldKind, FieldSpec, InsertReceipt, QueryRequest,
    QueryResult, RankedResultSet, SearchRequest,
};
use crate::repository::VectorRepository;

/// Insert, scalar query and similarity search against existing collections
pub struct DataPlane<R: VectorRepository> {
    repository: Arc<R>,
}

impl<R: VectorRepository> DataPlane<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    async fn schema(&self, collection: &str) -> VectorResult<CollectionSchema> {
        self.repository
            .describe_collection(collection)
            .await?
            .ok_or_else(|| VectorError::NotFound(format!("collection '{}'", collection)))
    }

    /// Checks `batch` against the collection schema, then inserts it
    #[instrument(skip(self, batch), fields(collection = %batch.collection_name, rows = batch.num_rows()))]
    pub async fn insert(&self, batch: &ColumnBatch) -> VectorResult<InsertReceipt> {
        let schema = self.schema(&batch.collection_name).await?;
        validate_batch(&schema, batch)?;

        let receipt = self.repository.insert(batch).await?;
        info!(
            collection = %batch.collection_name,
            inserted = receipt.insert_count,
            "Rows inserted"
        );
        Ok(receipt)
    }

    /// Scalar query; an empty filter matches every row up to the limit
    #[instrument(skip(self, request), fields(collection = %request.collection_name, filter = %request.filter))]
    pub async fn query(&self, request: &QueryRequest) -> VectorResult<QueryResult> {
        if request.collection_name.is_empty() {
            return Err(VectorError::Validation("collection name is required".to_string()));
        }
        if request.limit == 0 {
            return Err(VectorError::Validation("query limit must be positive".to_string()));
        }

        let result = self.repository.query(request).await?;
        debug!(rows = result.num_rows(), columns = result.columns.len(), "Query complete");
        Ok(result)
    }

    /// Nearest-neighbour search, one ranked set per query vector
    #[instrument(
        skip(self, request),
        fields(collection = %request.collection_name, field = %request.vector_field, top_k = request.top_k)
    )]
    pub async fn search(&self, request: &SearchRequest) -> VectorResult<Vec<RankedResultSet>> {
        if request.top_k == 0 {
            return Err(VectorError::Validation("top_k must be positive".to_string()));
        }
        if request.vectors.is_empty() {
            return Err(VectorError::Validation("at least one query vector is required".to_string()));
        }

        let schema = self.schema(&request.collection_name).await?;
        let dim = vector_dimension(&schema, &request.vector_field)?;
        if let Some((i, v)) = request.vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(VectorError::Validation(format!(
                "query vector {} has {} components, field '{}' expects {}",
                i,
                v.len(),
                request.vector_field,
                dim
            )));
        }

        let results = self.repository.search(request).await?;
        Ok(results
            .into_iter()
            .map(|set| set.ranked(request.metric, request.top_k))
            .collect())
    }
}

fn vector_dimension(schema: &CollectionSchema, field_name: &str) -> VectorResult<usize> {
    let field = schema.field(field_name).ok_or_else(|| {
        VectorError::Validation(format!(
            "collection '{}' has no field '{}'",
            schema.name, field_name
        ))
    })?;
    field.dimension().ok_or_else(|| {
        VectorError::Validation(format!(
            "field '{}' is {}, not a vector field",
            field_name,
            field.kind.data_type()
        ))
    })
}

fn check_column(field: &FieldSpec, data: &ColumnData) -> Result<(), String> {
    match (&field.kind, data) {
        (FieldKind::Int64, ColumnData::Int64(_)) => Ok(()),
        (FieldKind::VarChar { max_length }, ColumnData::VarChar(values)) => {
            match values.iter().position(|s| s.len() > *max_length) {
                Some(row) => Err(format!(
                    "row {} of '{}' exceeds max length {}",
                    row, field.name, max_length
                )),
                None => Ok(()),
            }
        }
        (FieldKind::FloatVector { dim }, ColumnData::FloatVector(values)) => {
            match values.iter().position(|v| v.len() != *dim) {
                Some(row) => Err(format!(
                    "row {} of '{}' has {} components, expected {}",
                    row,
                    field.name,
                    values[row].len(),
                    dim
                )),
                None => Ok(()),
            }
        }
        (kind, data) => Err(format!(
            "column '{}' holds {} values but the field is {}",
            field.name,
            data.type_name(),
            kind.data_type()
        )),
    }
}

/// Shape and type checks for a column batch against its target schema
pub fn validate_batch(schema: &CollectionSchema, batch: &ColumnBatch) -> VectorResult<()> {
    let invalid = |msg: String| VectorError::Validation(format!("{}: {}", batch.collection_name, msg));

    if batch.columns.is_empty() || batch.num_rows() == 0 {
        return Err(invalid("batch has no rows".to_string()));
    }

    let rows = batch.num_rows();
    let mut names = HashSet::new();
    for column in &batch.columns {
        if !names.insert(column.name.as_str()) {
            return Err(invalid(format!("column '{}' appears more than once", column.name)));
        }
        if column.len() != rows {
            return Err(invalid(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                rows
            )));
        }
        match schema.field(&column.name) {
            Some(field) => check_column(field, &column.data).map_err(&invalid)?,
            None if schema.enable_dynamic_field => {}
            None => return Err(invalid(format!("unknown field '{}'", column.name))),
        }
    }

    for field in &schema.fields {
        let present = names.contains(field.name.as_str());
        if field.is_primary_key && field.auto_id {
            if present {
                return Err(invalid(format!(
                    "primary key '{}' is generated by the server and must not be supplied",
                    field.name
                )));
            }
        } else if !present {
            return Err(invalid(format!("missing column for field '{}'", field.name)));
        }
    }

    Ok(())
}
