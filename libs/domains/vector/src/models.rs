use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use validator::Validate;

use crate::schema::validate_fields;

/// Rows returned by a scalar query when the caller sets no limit
pub const DEFAULT_QUERY_LIMIT: u64 = 16_384;

// ===== Schema =====

/// Storage type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Int64,
    VarChar { max_length: usize },
    FloatVector { dim: usize },
}

impl FieldKind {
    pub fn is_vector(&self) -> bool {
        matches!(self, FieldKind::FloatVector { .. })
    }

    /// Name used on the wire
    pub fn data_type(&self) -> &'static str {
        match self {
            FieldKind::Int64 => "Int64",
            FieldKind::VarChar { .. } => "VarChar",
            FieldKind::FloatVector { .. } => "FloatVector",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub auto_id: bool,
    /// Additional type params sent alongside `dim` / `max_length`
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            is_primary_key: false,
            auto_id: false,
            extra_params: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_primary_key(mut self, auto_id: bool) -> Self {
        self.is_primary_key = true;
        self.auto_id = auto_id;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }

    pub fn dimension(&self) -> Option<usize> {
        match self.kind {
            FieldKind::FloatVector { dim } => Some(dim),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CollectionSchema {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1), custom(function = "validate_fields"))]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub enable_dynamic_field: bool,
    #[validate(range(min = 1))]
    pub shard_count: u32,
}

impl CollectionSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn primary_key(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.is_primary_key)
    }

    pub fn vector_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.kind.is_vector())
    }
}

// ===== Index =====

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum MetricType {
    #[default]
    L2,
    Ip,
    Cosine,
}

impl MetricType {
    /// L2 is a distance; IP and COSINE are similarities
    pub fn higher_is_closer(&self) -> bool {
        !matches!(self, MetricType::L2)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexType {
    Flat,
    #[default]
    IvfFlat,
    Hnsw,
    AutoIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub field_name: String,
    pub index_name: String,
    pub index_type: IndexType,
    pub metric: MetricType,
    /// Build parameters, e.g. `nlist`
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

impl IndexSpec {
    pub fn new(field_name: impl Into<String>, index_type: IndexType, metric: MetricType) -> Self {
        let field_name = field_name.into();
        Self {
            index_name: field_name.clone(),
            field_name,
            index_type,
            metric,
            params: BTreeMap::new(),
        }
    }

    /// Inverted-file flat index with `nlist` clusters
    pub fn ivf_flat(field_name: impl Into<String>, metric: MetricType, nlist: u32) -> Self {
        Self::new(field_name, IndexType::IvfFlat, metric).with_param("nlist", nlist)
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexState {
    /// Server knows no index by that name yet
    None,
    InProgress { indexed_rows: u64, total_rows: u64 },
    Finished,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotExist,
    NotLoaded,
    Loading { progress: u8 },
    Loaded,
}

// ===== Data =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Int64(i64),
    VarChar(String),
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryKey::Int64(v) => write!(f, "{}", v),
            PrimaryKey::VarChar(v) => f.write_str(v),
        }
    }
}

/// Values of one column, all of a single type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int64(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    VarChar(Vec<String>),
    FloatVector(Vec<Vec<f32>>),
    Json(Vec<Value>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::VarChar(v) => v.len(),
            ColumnData::FloatVector(v) => v.len(),
            ColumnData::Json(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Int64(_) => "Int64",
            ColumnData::Float(_) => "Float",
            ColumnData::Bool(_) => "Bool",
            ColumnData::VarChar(_) => "VarChar",
            ColumnData::FloatVector(_) => "FloatVector",
            ColumnData::Json(_) => "JSON",
        }
    }

    /// Element `i` as JSON, for row-oriented wire formats
    pub fn value_at(&self, i: usize) -> Option<Value> {
        match self {
            ColumnData::Int64(v) => v.get(i).map(|x| Value::from(*x)),
            ColumnData::Float(v) => v.get(i).map(|x| Value::from(*x)),
            ColumnData::Bool(v) => v.get(i).map(|x| Value::from(*x)),
            ColumnData::VarChar(v) => v.get(i).map(|x| Value::from(x.as_str())),
            ColumnData::FloatVector(v) => v.get(i).map(|x| Value::from(x.clone())),
            ColumnData::Json(v) => v.get(i).cloned(),
        }
    }

    /// Element `i` rendered for display
    pub fn get_as_string(&self, i: usize) -> Option<String> {
        match self {
            ColumnData::Int64(v) => v.get(i).map(|x| x.to_string()),
            ColumnData::Float(v) => v.get(i).map(|x| x.to_string()),
            ColumnData::Bool(v) => v.get(i).map(|x| x.to_string()),
            ColumnData::VarChar(v) => v.get(i).cloned(),
            ColumnData::FloatVector(v) => v.get(i).map(|x| format!("{:?}", x)),
            ColumnData::Json(v) => v.get(i).map(|x| x.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn int64(name: impl Into<String>, values: Vec<i64>) -> Self {
        Self::new(name, ColumnData::Int64(values))
    }

    pub fn varchar(name: impl Into<String>, values: Vec<String>) -> Self {
        Self::new(name, ColumnData::VarChar(values))
    }

    pub fn float_vector(name: impl Into<String>, values: Vec<Vec<f32>>) -> Self {
        Self::new(name, ColumnData::FloatVector(values))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get_as_string(&self, i: usize) -> Option<String> {
        self.data.get_as_string(i)
    }
}

/// Query output is column-wise as well
pub type ResultColumn = Column;

/// Column-oriented rows bound for one collection
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBatch {
    pub collection_name: String,
    /// Empty means the default partition
    pub partition_name: String,
    pub columns: Vec<Column>,
}

impl ColumnBatch {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            partition_name: String::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_partition(mut self, partition_name: impl Into<String>) -> Self {
        self.partition_name = partition_name.into();
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Row count, taken from the first column
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InsertReceipt {
    pub insert_count: u64,
    pub ids: Vec<PrimaryKey>,
}

// ===== Query / Search =====

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub collection_name: String,
    /// Boolean expression; empty matches every row
    pub filter: String,
    pub output_fields: Vec<String>,
    pub partition_names: Vec<String>,
    pub limit: u64,
}

impl QueryRequest {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            filter: String::new(),
            output_fields: Vec::new(),
            partition_names: Vec::new(),
            limit: DEFAULT_QUERY_LIMIT,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_output_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<ResultColumn>,
}

impl QueryResult {
    pub fn column(&self, name: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub collection_name: String,
    pub vector_field: String,
    pub vectors: Vec<Vec<f32>>,
    pub top_k: usize,
    pub output_fields: Vec<String>,
    pub filter: Option<String>,
    pub metric: MetricType,
    /// Query-time parameters, e.g. `nprobe`
    pub params: BTreeMap<String, Value>,
    pub partition_names: Vec<String>,
}

impl SearchRequest {
    pub fn new(
        collection_name: impl Into<String>,
        vector_field: impl Into<String>,
        vectors: Vec<Vec<f32>>,
        top_k: usize,
    ) -> Self {
        Self {
            collection_name: collection_name.into(),
            vector_field: vector_field.into(),
            vectors,
            top_k,
            output_fields: Vec::new(),
            filter: None,
            metric: MetricType::default(),
            params: BTreeMap::new(),
            partition_names: Vec::new(),
        }
    }

    pub fn with_metric(mut self, metric: MetricType) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_output_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: PrimaryKey,
    /// Distance for L2, similarity for IP / COSINE
    pub score: f32,
    pub fields: BTreeMap<String, Value>,
}

impl SearchHit {
    pub fn field_as_string(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Hits for one query vector, nearest first
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedResultSet {
    pub hits: Vec<SearchHit>,
}

impl RankedResultSet {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn top(&self) -> Option<&SearchHit> {
        self.hits.first()
    }

    pub fn ids(&self) -> Vec<&PrimaryKey> {
        self.hits.iter().map(|h| &h.id).collect()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.hits.iter().map(|h| h.score).collect()
    }

    /// Orders hits nearest-first for `metric` and keeps at most `top_k`.
    ///
    /// The sort is stable, so equal scores keep the server's order.
    pub fn ranked(mut self, metric: MetricType, top_k: usize) -> Self {
        if metric.higher_is_closer() {
            self.hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        } else {
            self.hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        }
        self.hits.truncate(top_k);
        self
    }
}
