//! Form boundary: binds request payloads to records, validates, saves.
//!
//! The pipeline only sees the [`Form`] and [`FormFactory`] traits; the
//! shipped [`ModelForm`] covers the common case of editing a record's
//! fields with per-field rules from the model metadata.

mod model_form;
mod validation;

pub use model_form::{ModelForm, ModelFormFactory};
pub use validation::validate_value;

use crate::error::ViewError;
use crate::store::{ModelMeta, Store};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Input widget hint, carried into the render context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Widget {
    TextInput,
    Textarea,
    Select,
    Checkbox,
    HiddenInput,
    PasswordInput,
    Custom(String),
}

impl Widget {
    pub fn as_str(&self) -> &str {
        match self {
            Widget::TextInput => "text",
            Widget::Textarea => "textarea",
            Widget::Select => "select",
            Widget::Checkbox => "checkbox",
            Widget::HiddenInput => "hidden",
            Widget::PasswordInput => "password",
            Widget::Custom(name) => name,
        }
    }
}

/// Per-field presentation/constraint overrides resolved from the action
/// options (`labels`, `widgets`, `help_text`, `required`).
#[derive(Clone, Debug, Default)]
pub struct FieldOverrides {
    pub labels: HashMap<String, String>,
    pub widgets: HashMap<String, Widget>,
    pub help_text: HashMap<String, String>,
    pub required: HashMap<String, bool>,
}

/// Per-field error lists, ordered by field name for stable output.
#[derive(Clone, Debug, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    Value::Array(v.iter().map(|m| Value::String(m.clone())).collect()),
                )
            })
            .collect();
        Value::Object(map)
    }
}

/// Everything a factory needs to construct a form for one request.
pub struct FormInit<'a> {
    pub meta: &'a ModelMeta,
    /// Field subset; `None` means all non-pk fields.
    pub fields: Option<&'a [String]>,
    pub exclude: Option<&'a [String]>,
    pub overrides: &'a FieldOverrides,
    /// Initial values for unbound rendering (seeded from the query string).
    pub initial: Map<String, Value>,
    /// Existing record when editing.
    pub instance: Option<&'a Value>,
    /// Submitted payload; `Some` makes the form bound.
    pub data: Option<&'a Map<String, Value>>,
}

#[async_trait]
pub trait Form: Send + Sync {
    fn is_bound(&self) -> bool;

    /// Run validation; idempotent. Per-field errors are readable via
    /// [`Form::errors`] afterwards.
    fn is_valid(&mut self) -> bool;

    fn errors(&self) -> &FieldErrors;

    /// Persist the bound data. Only called after `is_valid()` returned
    /// true. Returns the saved record.
    async fn save(&self, store: &dyn Store) -> Result<Value, ViewError>;

    /// JSON description of the form for the render context.
    fn to_context(&self) -> Value;
}

pub trait FormFactory: Send + Sync {
    fn build(&self, init: FormInit<'_>) -> Result<Box<dyn Form>, ViewError>;
}
