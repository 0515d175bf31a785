//! Request and response bodies of the Milvus REST v2 API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::MetricType;

pub(crate) const LIST_COLLECTIONS: &str = "/v2/vectordb/collections/list";
pub(crate) const DESCRIBE_COLLECTION: &str = "/v2/vectordb/collections/describe";
pub(crate) const CREATE_COLLECTION: &str = "/v2/vectordb/collections/create";
pub(crate) const DROP_COLLECTION: &str = "/v2/vectordb/collections/drop";
pub(crate) const LOAD_COLLECTION: &str = "/v2/vectordb/collections/load";
pub(crate) const GET_LOAD_STATE: &str = "/v2/vectordb/collections/get_load_state";
pub(crate) const CREATE_INDEX: &str = "/v2/vectordb/indexes/create";
pub(crate) const DESCRIBE_INDEX: &str = "/v2/vectordb/indexes/describe";
pub(crate) const INSERT: &str = "/v2/vectordb/entities/insert";
pub(crate) const QUERY: &str = "/v2/vectordb/entities/query";
pub(crate) const SEARCH: &str = "/v2/vectordb/entities/search";

pub(crate) type Row = Map<String, Value>;

// ===== Requests =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatabaseRef<'a> {
    pub db_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CollectionRef<'a> {
    pub db_name: &'a str,
    pub collection_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCollectionBody<'a> {
    pub db_name: &'a str,
    pub collection_name: &'a str,
    pub description: &'a str,
    pub schema: SchemaBody,
    pub params: CreateParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SchemaBody {
    pub auto_id: bool,
    pub enable_dynamic_field: bool,
    pub fields: Vec<FieldBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FieldBody {
    pub field_name: String,
    pub data_type: &'static str,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub element_type_params: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateParams {
    pub shards_num: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateIndexBody<'a> {
    pub db_name: &'a str,
    pub collection_name: &'a str,
    pub index_params: Vec<IndexParamBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IndexParamBody {
    pub field_name: String,
    pub index_name: String,
    pub metric_type: MetricType,
    /// Always carries `index_type` plus the build parameters
    pub params: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeIndexBody<'a> {
    pub db_name: &'a str,
    pub collection_name: &'a str,
    pub index_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InsertBody<'a> {
    pub db_name: &'a str,
    pub collection_name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub partition_name: &'a str,
    pub data: Vec<Row>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QueryBody<'a> {
    pub db_name: &'a str,
    pub collection_name: &'a str,
    pub filter: &'a str,
    pub output_fields: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub partition_names: &'a [String],
    pub limit: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchBody<'a> {
    pub db_name: &'a str,
    pub collection_name: &'a str,
    pub data: [&'a [f32]; 1],
    pub anns_field: &'a str,
    pub limit: usize,
    pub output_fields: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub partition_names: &'a [String],
    pub search_params: SearchParams<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchParams<'a> {
    pub metric_type: MetricType,
    pub params: &'a BTreeMap<String, Value>,
}

// ===== Responses =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CollectionDescription {
    pub collection_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enable_dynamic_field: bool,
    #[serde(default)]
    pub fields: Vec<FieldDescription>,
    #[serde(default = "default_shards")]
    pub shards_num: u32,
}

fn default_shards() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FieldDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_id: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub params: Vec<KeyValue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyValue {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct IndexDescription {
    pub index_name: String,
    pub index_state: String,
    pub indexed_rows: u64,
    pub total_rows: u64,
    pub fail_reason: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct LoadStateBody {
    pub load_state: String,
    pub load_progress: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct InsertResponse {
    pub insert_count: u64,
    pub insert_ids: Vec<Value>,
}

/// Search `data` is flat for a single query vector and nested otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchData {
    Nested(Vec<Vec<Row>>),
    Flat(Vec<Row>),
}

impl SearchData {
    pub fn into_first(self) -> Vec<Row> {
        match self {
            SearchData::Flat(rows) => rows,
            SearchData::Nested(mut sets) if !sets.is_empty() => sets.swap_remove(0),
            SearchData::Nested(_) => Vec::new(),
        }
    }
}
