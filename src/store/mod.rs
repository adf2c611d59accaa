//! Persistence boundary: record store trait plus model introspection.
//!
//! Records are plain `serde_json::Value` objects keyed by the model's
//! primary-key field. The pipeline never talks to a database directly;
//! it goes through [`Store`], so any backend (or test double) plugs in.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("backend: {0}")]
    Backend(String),
}

/// Field type, used for form value coercion and SQL binding casts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Bool,
    DateTime,
    Date,
    Uuid,
    Json,
}

/// Declarative per-field constraints, enforced by the bound form.
#[derive(Clone, Debug, Default)]
pub struct FieldRule {
    pub format: Option<String>,
    pub max_length: Option<u32>,
    pub min_length: Option<u32>,
    pub pattern: Option<String>,
    pub allowed: Option<Vec<Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct FieldMeta {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Whether the backend supplies a value when the field is omitted.
    pub has_default: bool,
    pub rule: FieldRule,
}

impl FieldMeta {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        FieldMeta {
            name: name.to_string(),
            kind,
            required: false,
            has_default: false,
            rule: FieldRule::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rule = rule;
        self
    }
}

/// Model description: everything the generated views need to know about
/// the record type they operate on.
#[derive(Clone, Debug)]
pub struct ModelMeta {
    pub app_label: String,
    pub object_name: String,
    /// Backend table name; defaults to `{app_label}_{model_name}`.
    pub table_name: Option<String>,
    pub schema_name: Option<String>,
    pub pk_field: String,
    pub fields: Vec<FieldMeta>,
}

impl ModelMeta {
    pub fn new(app_label: &str, object_name: &str, fields: Vec<FieldMeta>) -> Self {
        ModelMeta {
            app_label: app_label.to_string(),
            object_name: object_name.to_string(),
            table_name: None,
            schema_name: None,
            pk_field: "id".to_string(),
            fields,
        }
    }

    pub fn table_name(mut self, name: &str) -> Self {
        self.table_name = Some(name.to_string());
        self
    }

    pub fn pk_field(mut self, name: &str) -> Self {
        self.pk_field = name.to_string();
        self
    }

    /// Lowercased object name; used for default base paths, name
    /// prefixes, and template names.
    pub fn model_name(&self) -> String {
        self.object_name.to_lowercase()
    }

    pub fn table(&self) -> String {
        self.table_name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.app_label, self.model_name()))
    }

    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn pk_kind(&self) -> FieldKind {
        self.field(&self.pk_field)
            .map(|f| f.kind)
            .unwrap_or(FieldKind::Integer)
    }

    /// Parse a raw path-segment id into the JSON value the store expects.
    pub fn parse_pk(&self, raw: &str) -> Result<Value, StoreError> {
        match self.pk_kind() {
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .map_err(|_| StoreError::InvalidKey(raw.to_string())),
            FieldKind::Uuid => uuid::Uuid::parse_str(raw)
                .map(|u| Value::String(u.to_string()))
                .map_err(|_| StoreError::InvalidKey(raw.to_string())),
            _ => Ok(Value::String(raw.to_string())),
        }
    }
}

/// Record store consumed by the request pipeline.
///
/// `get` returns `Ok(None)` for a missing record; the pipeline converts
/// that to a 404. Backend failures are `StoreError` and surface as 500.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, meta: &ModelMeta, pk: &Value) -> Result<Option<Value>, StoreError>;

    async fn list(
        &self,
        meta: &ModelMeta,
        filters: &[(String, Value)],
    ) -> Result<Vec<Value>, StoreError>;

    async fn create(&self, meta: &ModelMeta, data: &Map<String, Value>) -> Result<Value, StoreError>;

    async fn update(
        &self,
        meta: &ModelMeta,
        pk: &Value,
        data: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError>;

    async fn delete(&self, meta: &ModelMeta, pk: &Value) -> Result<Option<Value>, StoreError>;
}
