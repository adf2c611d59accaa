//! Shared result context accumulated across pipeline stages.

use crate::forms::Form;
use serde_json::{Map, Value};

/// Created fresh per request, discarded after the response. Stages fill
/// the well-known slots; anything else goes through `extra`.
#[derive(Default)]
pub struct Context {
    pub obj: Option<Value>,
    pub objects_list: Option<Vec<Value>>,
    pub form: Option<Box<dyn Form>>,
    pub form_saved: bool,
    pub extra: Map<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.extra.insert(key.to_string(), value);
    }

    /// Render view of the context: well-known slots plus extras, extras
    /// winning on key clashes.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(obj) = &self.obj {
            map.insert("obj".to_string(), obj.clone());
        }
        if let Some(list) = &self.objects_list {
            map.insert("objects_list".to_string(), Value::Array(list.clone()));
        }
        if let Some(form) = &self.form {
            map.insert("form".to_string(), form.to_context());
        }
        map.insert("form_saved".to_string(), Value::Bool(self.form_saved));
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}
