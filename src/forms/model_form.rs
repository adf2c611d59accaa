//! Default form: binds a payload to the model's fields, coerces string
//! input per field kind, validates rules, and saves through the store.

use super::{validate_value, FieldErrors, Form, FormFactory, FormInit, Widget};
use crate::error::ViewError;
use crate::store::{FieldKind, FieldRule, ModelMeta, Store};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

struct BoundField {
    name: String,
    label: String,
    help_text: Option<String>,
    required: bool,
    widget: Widget,
    kind: FieldKind,
    rule: FieldRule,
}

pub struct ModelForm {
    meta: ModelMeta,
    fields: Vec<BoundField>,
    initial: Map<String, Value>,
    instance: Option<Value>,
    /// Coerced submitted payload; `Some` iff bound.
    data: Option<Map<String, Value>>,
    errors: FieldErrors,
    validated: bool,
}

impl ModelForm {
    fn field_value(&self, name: &str) -> Value {
        if let Some(data) = &self.data {
            if let Some(v) = data.get(name) {
                return v.clone();
            }
        }
        if let Some(instance) = &self.instance {
            if let Some(v) = instance.get(name) {
                return v.clone();
            }
        }
        self.initial.get(name).cloned().unwrap_or(Value::Null)
    }
}

#[async_trait]
impl Form for ModelForm {
    fn is_bound(&self) -> bool {
        self.data.is_some()
    }

    fn is_valid(&mut self) -> bool {
        if self.validated {
            return self.errors.is_empty();
        }
        self.validated = true;
        let Some(data) = self.data.clone() else {
            return false;
        };
        for field in &self.fields {
            let value = data.get(&field.name);
            let missing = match value {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                _ => false,
            };
            if missing {
                if field.required {
                    self.errors.add(&field.name, format!("{} is required", field.name));
                }
                continue;
            }
            if let Some(v) = value {
                if let Err(message) = validate_value(&field.name, v, &field.rule) {
                    self.errors.add(&field.name, message);
                }
            }
        }
        self.errors.is_empty()
    }

    fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    async fn save(&self, store: &dyn Store) -> Result<Value, ViewError> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| ViewError::Internal("save called on unbound form".into()))?;
        let mut payload = Map::new();
        for field in &self.fields {
            if let Some(v) = data.get(&field.name) {
                payload.insert(field.name.clone(), v.clone());
            }
        }
        let existing_pk = self
            .instance
            .as_ref()
            .and_then(|i| i.get(&self.meta.pk_field))
            .filter(|v| !v.is_null())
            .cloned();
        let saved = match existing_pk {
            Some(pk) => store
                .update(&self.meta, &pk, &payload)
                .await
                .map_err(ViewError::Store)?
                .ok_or_else(|| ViewError::NotFound(pk.to_string()))?,
            None => store
                .create(&self.meta, &payload)
                .await
                .map_err(ViewError::Store)?,
        };
        Ok(saved)
    }

    fn to_context(&self) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "label": f.label,
                    "help_text": f.help_text,
                    "required": f.required,
                    "widget": f.widget.as_str(),
                    "value": self.field_value(&f.name),
                })
            })
            .collect();
        json!({
            "is_bound": self.is_bound(),
            "fields": fields,
            "errors": self.errors.to_value(),
        })
    }
}

/// Builds [`ModelForm`]s from model metadata plus the action's field
/// subset and per-field overrides.
pub struct ModelFormFactory;

impl FormFactory for ModelFormFactory {
    fn build(&self, init: FormInit<'_>) -> Result<Box<dyn Form>, ViewError> {
        let selected: Vec<&crate::store::FieldMeta> = init
            .meta
            .fields
            .iter()
            .filter(|f| f.name != init.meta.pk_field)
            .filter(|f| match init.fields {
                Some(names) => names.iter().any(|n| *n == f.name),
                None => true,
            })
            .filter(|f| match init.exclude {
                Some(names) => !names.iter().any(|n| *n == f.name),
                None => true,
            })
            .collect();
        if selected.is_empty() {
            return Err(ViewError::Internal(format!(
                "no editable fields for {}",
                init.meta.object_name
            )));
        }

        let fields = selected
            .iter()
            .map(|f| {
                let ov = init.overrides;
                BoundField {
                    name: f.name.clone(),
                    label: ov
                        .labels
                        .get(&f.name)
                        .cloned()
                        .unwrap_or_else(|| title_label(&f.name)),
                    help_text: ov.help_text.get(&f.name).cloned(),
                    required: ov.required.get(&f.name).copied().unwrap_or(f.required),
                    widget: ov
                        .widgets
                        .get(&f.name)
                        .cloned()
                        .unwrap_or_else(|| default_widget(f.kind)),
                    kind: f.kind,
                    rule: f.rule.clone(),
                }
            })
            .collect::<Vec<_>>();

        let data = init.data.map(|raw| coerce(raw, &fields));
        Ok(Box::new(ModelForm {
            meta: init.meta.clone(),
            fields,
            initial: init.initial,
            instance: init.instance.cloned(),
            data,
            errors: FieldErrors::default(),
            validated: false,
        }))
    }
}

fn title_label(name: &str) -> String {
    let mut out = name.replace('_', " ");
    if let Some(first) = out.get(0..1) {
        let upper = first.to_uppercase();
        out.replace_range(0..1, &upper);
    }
    out
}

fn default_widget(kind: FieldKind) -> Widget {
    match kind {
        FieldKind::Bool => Widget::Checkbox,
        FieldKind::Json => Widget::Textarea,
        _ => Widget::TextInput,
    }
}

/// HTML forms submit strings; coerce them to the field's kind so rules
/// and stores see typed values. Unparseable input is left as-is and
/// caught by validation or the backend.
fn coerce(raw: &Map<String, Value>, fields: &[BoundField]) -> Map<String, Value> {
    let mut out = Map::new();
    for field in fields {
        let Some(v) = raw.get(&field.name) else { continue };
        let coerced = match (&field.kind, v) {
            (FieldKind::Integer, Value::String(s)) => s
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .unwrap_or_else(|_| v.clone()),
            (FieldKind::Float, Value::String(s)) => s
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| v.clone()),
            (FieldKind::Bool, Value::String(s)) => match s.as_str() {
                "true" | "on" | "1" => Value::Bool(true),
                "false" | "off" | "0" | "" => Value::Bool(false),
                _ => v.clone(),
            },
            (FieldKind::Json, Value::String(s)) => {
                serde_json::from_str(s).unwrap_or_else(|_| v.clone())
            }
            _ => v.clone(),
        };
        out.insert(field.name.clone(), coerced);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FieldOverrides;
    use crate::store::{FieldMeta, MemoryStore};

    fn meta() -> ModelMeta {
        ModelMeta::new(
            "pages",
            "Page",
            vec![
                FieldMeta::new("id", FieldKind::Integer).with_default(),
                FieldMeta::new("title", FieldKind::Text).required().rule(FieldRule {
                    max_length: Some(10),
                    ..Default::default()
                }),
                FieldMeta::new("views", FieldKind::Integer),
            ],
        )
    }

    fn build(data: Option<&Map<String, Value>>, instance: Option<&Value>) -> Box<dyn Form> {
        let meta = meta();
        let overrides = FieldOverrides::default();
        ModelFormFactory
            .build(FormInit {
                meta: &meta,
                fields: None,
                exclude: None,
                overrides: &overrides,
                initial: Map::new(),
                instance,
                data,
            })
            .unwrap()
    }

    #[test]
    fn unbound_form_is_never_valid() {
        let mut form = build(None, None);
        assert!(!form.is_bound());
        assert!(!form.is_valid());
    }

    #[test]
    fn missing_required_field_collects_error() {
        let data = json!({"views": "3"});
        let mut form = build(data.as_object(), None);
        assert!(form.is_bound());
        assert!(!form.is_valid());
        assert!(!form.errors().is_empty());
    }

    #[test]
    fn rule_violation_collects_error() {
        let data = json!({"title": "way too long title"});
        let mut form = build(data.as_object(), None);
        assert!(!form.is_valid());
    }

    #[test]
    fn string_input_is_coerced_per_kind() {
        let data = json!({"title": "ok", "views": "42"});
        let mut form = build(data.as_object(), None);
        assert!(form.is_valid());
        let ctx = form.to_context();
        let views = ctx["fields"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == "views")
            .unwrap();
        assert_eq!(views["value"], json!(42));
    }

    #[tokio::test]
    async fn save_creates_without_instance_and_updates_with() {
        let store = MemoryStore::new();
        let data = json!({"title": "first"});
        let mut form = build(data.as_object(), None);
        assert!(form.is_valid());
        let created = form.save(&store).await.unwrap();
        assert_eq!(created["title"], json!("first"));
        let pk = created["id"].clone();

        let data = json!({"title": "second"});
        let mut form = build(data.as_object(), Some(&created));
        assert!(form.is_valid());
        let updated = form.save(&store).await.unwrap();
        assert_eq!(updated["id"], pk);
        assert_eq!(updated["title"], json!("second"));
    }
}
