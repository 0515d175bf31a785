use std::borrow::Cow;
use std::collections::HashSet;

use validator::ValidationError;

use crate::models::{CollectionSchema, FieldKind, FieldSpec};

pub const DEFAULT_SHARD_COUNT: u32 = 2;
pub const MAX_VARCHAR_LENGTH: usize = 65_535;

/// Builds a [`CollectionSchema`] one step at a time.
///
/// Every `with_*` call consumes the builder and returns the next value, and
/// fields accumulate across calls. Nothing is checked here; validation runs
/// when the schema is handed to the lifecycle.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    description: String,
    fields: Vec<FieldSpec>,
    enable_dynamic_field: bool,
    shard_count: u32,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            fields: Vec::new(),
            enable_dynamic_field: false,
            shard_count: DEFAULT_SHARD_COUNT,
        }
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_dynamic_field(mut self, enabled: bool) -> Self {
        self.enable_dynamic_field = enabled;
        self
    }

    pub fn with_shard_count(mut self, shard_count: u32) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn build(self) -> CollectionSchema {
        CollectionSchema {
            name: self.name,
            description: self.description,
            fields: self.fields,
            enable_dynamic_field: self.enable_dynamic_field,
            shard_count: self.shard_count,
        }
    }
}

pub fn int64_field(name: impl Into<String>, is_primary_key: bool, auto_id: bool) -> FieldSpec {
    let field = FieldSpec::new(name, FieldKind::Int64);
    if is_primary_key {
        field.with_primary_key(auto_id)
    } else {
        field
    }
}

pub fn scalar_varchar_field(
    name: impl Into<String>,
    max_length: usize,
    is_primary_key: bool,
    auto_id: bool,
) -> FieldSpec {
    let field = FieldSpec::new(name, FieldKind::VarChar { max_length });
    if is_primary_key {
        field.with_primary_key(auto_id)
    } else {
        field
    }
}

pub fn float_vector_field(name: impl Into<String>, dim: usize) -> FieldSpec {
    FieldSpec::new(name, FieldKind::FloatVector { dim })
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

/// Field-level rules for a collection schema
pub(crate) fn validate_fields(fields: &[FieldSpec]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(invalid("empty_field_name", "field name must not be empty".to_string()));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(invalid(
                "duplicate_field",
                format!("field '{}' is declared more than once", field.name),
            ));
        }
        match field.kind {
            FieldKind::FloatVector { dim: 0 } => {
                return Err(invalid(
                    "invalid_dimension",
                    format!("vector field '{}' must have a positive dimension", field.name),
                ));
            }
            FieldKind::VarChar { max_length } if max_length == 0 || max_length > MAX_VARCHAR_LENGTH => {
                return Err(invalid(
                    "invalid_max_length",
                    format!(
                        "VarChar field '{}' max length must be between 1 and {}",
                        field.name, MAX_VARCHAR_LENGTH
                    ),
                ));
            }
            _ => {}
        }
        if field.auto_id && !field.is_primary_key {
            return Err(invalid(
                "auto_id_without_primary_key",
                format!("autoId is set on non-primary field '{}'", field.name),
            ));
        }
    }

    let primaries: Vec<&FieldSpec> = fields.iter().filter(|f| f.is_primary_key).collect();
    let primary = match primaries.as_slice() {
        [only] => *only,
        [] => return Err(invalid("missing_primary_key", "schema has no primary key".to_string())),
        _ => {
            return Err(invalid(
                "multiple_primary_keys",
                format!("schema has {} primary keys, expected exactly one", primaries.len()),
            ));
        }
    };

    match primary.kind {
        FieldKind::Int64 => Ok(()),
        FieldKind::VarChar { .. } if !primary.auto_id => Ok(()),
        FieldKind::VarChar { .. } => Err(invalid(
            "auto_id_on_varchar",
            format!("autoId requires an Int64 primary key, '{}' is VarChar", primary.name),
        )),
        FieldKind::FloatVector { .. } => Err(invalid(
            "invalid_primary_key_type",
            format!("primary key '{}' must be Int64 or VarChar", primary.name),
        )),
    }
}
