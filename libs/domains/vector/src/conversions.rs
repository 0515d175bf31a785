use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{VectorError, VectorResult};
use crate::milvus::wire::{
    CollectionDescription, FieldBody, IndexDescription, IndexParamBody, InsertResponse, KeyValue,
    LoadStateBody, Row, SchemaBody,
};
use crate::models::{
    CollectionSchema, Column, ColumnBatch, ColumnData, FieldKind, FieldSpec, IndexSpec,
    IndexState, InsertReceipt, LoadState, PrimaryKey, QueryResult, SearchHit,
};

/// Key under which search hits carry their score
const DISTANCE_KEY: &str = "distance";

// ===== Schema =====

impl From<&FieldSpec> for FieldBody {
    fn from(field: &FieldSpec) -> Self {
        let mut element_type_params = field.extra_params.clone();
        match field.kind {
            FieldKind::VarChar { max_length } => {
                element_type_params.insert("max_length".to_string(), max_length.to_string());
            }
            FieldKind::FloatVector { dim } => {
                element_type_params.insert("dim".to_string(), dim.to_string());
            }
            FieldKind::Int64 => {}
        }

        FieldBody {
            field_name: field.name.clone(),
            data_type: field.kind.data_type(),
            is_primary: field.is_primary_key,
            description: field.description.clone(),
            element_type_params,
        }
    }
}

impl From<&CollectionSchema> for SchemaBody {
    fn from(schema: &CollectionSchema) -> Self {
        SchemaBody {
            auto_id: schema.primary_key().is_some_and(|pk| pk.auto_id),
            enable_dynamic_field: schema.enable_dynamic_field,
            fields: schema.fields.iter().map(FieldBody::from).collect(),
        }
    }
}

fn param_usize(params: &[KeyValue], key: &str) -> Option<usize> {
    params.iter().find(|kv| kv.key == key).and_then(|kv| match &kv.value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(|v| v as usize),
        _ => None,
    })
}

impl TryFrom<CollectionDescription> for CollectionSchema {
    type Error = VectorError;

    fn try_from(desc: CollectionDescription) -> Result<Self, Self::Error> {
        let mut fields = Vec::with_capacity(desc.fields.len());

        for field in desc.fields {
            let kind = match field.data_type.as_str() {
                "Int64" => FieldKind::Int64,
                "VarChar" => FieldKind::VarChar {
                    max_length: param_usize(&field.params, "max_length").unwrap_or(0),
                },
                "FloatVector" => FieldKind::FloatVector {
                    dim: param_usize(&field.params, "dim").ok_or_else(|| {
                        VectorError::Internal(format!(
                            "vector field '{}' of '{}' has no dimension",
                            field.name, desc.collection_name
                        ))
                    })?,
                },
                other => {
                    return Err(VectorError::Internal(format!(
                        "field '{}' of '{}' has unsupported type {}",
                        field.name, desc.collection_name, other
                    )));
                }
            };

            let mut spec = FieldSpec::new(field.name, kind).with_description(field.description);
            if field.primary_key {
                spec = spec.with_primary_key(field.auto_id);
            }
            fields.push(spec);
        }

        Ok(CollectionSchema {
            name: desc.collection_name,
            description: desc.description,
            fields,
            enable_dynamic_field: desc.enable_dynamic_field,
            shard_count: desc.shards_num,
        })
    }
}

// ===== Index & Load =====

impl From<&IndexSpec> for IndexParamBody {
    fn from(spec: &IndexSpec) -> Self {
        let mut params = spec.params.clone();
        params.insert("index_type".to_string(), Value::from(spec.index_type.to_string()));

        IndexParamBody {
            field_name: spec.field_name.clone(),
            index_name: spec.index_name.clone(),
            metric_type: spec.metric,
            params,
        }
    }
}

pub(crate) fn index_state(index_name: &str, indexes: Vec<IndexDescription>) -> IndexState {
    let Some(index) = indexes
        .into_iter()
        .find(|i| i.index_name.is_empty() || i.index_name == index_name)
    else {
        return IndexState::None;
    };

    match index.index_state.as_str() {
        "Finished" => IndexState::Finished,
        "Failed" => IndexState::Failed(index.fail_reason),
        "" | "IndexStateNone" => IndexState::None,
        _ => IndexState::InProgress {
            indexed_rows: index.indexed_rows,
            total_rows: index.total_rows,
        },
    }
}

impl From<LoadStateBody> for LoadState {
    fn from(body: LoadStateBody) -> Self {
        match body.load_state.as_str() {
            "LoadStateLoaded" => LoadState::Loaded,
            "LoadStateLoading" => LoadState::Loading {
                progress: body.load_progress.unwrap_or(0),
            },
            "LoadStateNotExist" => LoadState::NotExist,
            _ => LoadState::NotLoaded,
        }
    }
}

// ===== Data =====

fn primary_key(value: &Value) -> Option<PrimaryKey> {
    match value {
        Value::Number(n) => n.as_i64().map(PrimaryKey::Int64),
        Value::String(s) => Some(PrimaryKey::VarChar(s.clone())),
        _ => None,
    }
}

impl From<InsertResponse> for InsertReceipt {
    fn from(response: InsertResponse) -> Self {
        InsertReceipt {
            insert_count: response.insert_count,
            ids: response.insert_ids.iter().filter_map(primary_key).collect(),
        }
    }
}

/// Transposes a column batch into the row objects the insert endpoint takes
pub(crate) fn batch_rows(batch: &ColumnBatch) -> Vec<Row> {
    (0..batch.num_rows())
        .map(|i| {
            batch
                .columns
                .iter()
                .filter_map(|c| c.data.value_at(i).map(|v| (c.name.clone(), v)))
                .collect()
        })
        .collect()
}

fn as_float_vector(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|x| x.as_f64().map(|f| f as f32))
        .collect()
}

/// Picks the narrowest column type every value fits, falling back to JSON
fn column_data(values: Vec<Value>) -> ColumnData {
    if values.iter().all(|v| v.is_i64()) {
        return ColumnData::Int64(values.iter().filter_map(Value::as_i64).collect());
    }
    if values.iter().all(|v| v.is_number()) {
        return ColumnData::Float(values.iter().filter_map(Value::as_f64).collect());
    }
    if values.iter().all(|v| v.is_boolean()) {
        return ColumnData::Bool(values.iter().filter_map(Value::as_bool).collect());
    }
    if values.iter().all(|v| v.is_string()) {
        return ColumnData::VarChar(
            values
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        );
    }
    let vectors: Option<Vec<Vec<f32>>> = values.iter().map(as_float_vector).collect();
    match vectors {
        Some(vectors) if !vectors.is_empty() => ColumnData::FloatVector(vectors),
        _ => ColumnData::Json(values),
    }
}

/// Turns query rows into result columns.
///
/// Requested output fields come first in request order, then whatever else
/// the server returned.
pub(crate) fn rows_to_columns(rows: Vec<Row>, output_fields: &[String]) -> QueryResult {
    let mut names: Vec<String> = output_fields.to_vec();
    for row in &rows {
        for key in row.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .filter(|name| rows.iter().any(|r| r.contains_key(name)))
        .map(|name| {
            let values: Vec<Value> = rows
                .iter()
                .map(|r| r.get(&name).cloned().unwrap_or(Value::Null))
                .collect();
            Column::new(name, column_data(values))
        })
        .collect();

    QueryResult { columns }
}

pub(crate) fn search_hit(mut row: Row, primary_field: &str) -> VectorResult<SearchHit> {
    let score = row
        .remove(DISTANCE_KEY)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| VectorError::Internal("search hit without a distance".to_string()))?;

    let id_value = row
        .get(primary_field)
        .or_else(|| row.get("id"))
        .cloned()
        .ok_or_else(|| {
            VectorError::Internal(format!("search hit without primary key '{}'", primary_field))
        })?;
    let id = primary_key(&id_value)
        .ok_or_else(|| VectorError::Internal(format!("unsupported primary key {}", id_value)))?;

    let fields: BTreeMap<String, Value> = row.into_iter().collect();
    Ok(SearchHit {
        id,
        score: score as f32,
        fields,
    })
}
