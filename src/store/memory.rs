//! In-process store: integer keys, exact-match filters. Used by the
//! demos and the test suite; not meant for production data.

use super::{ModelMeta, Store, StoreError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Value>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one record, assigning a pk if the body has none. Returns the
    /// stored record.
    pub fn seed(&self, meta: &ModelMeta, data: Value) -> Value {
        let Value::Object(map) = data else {
            panic!("seed expects a JSON object");
        };
        self.insert(meta, &map)
    }

    fn insert(&self, meta: &ModelMeta, data: &Map<String, Value>) -> Value {
        let mut tables = self.tables.write().unwrap();
        let table = tables.entry(meta.table()).or_default();
        let id = match data.get(&meta.pk_field).and_then(Value::as_i64) {
            Some(id) => {
                table.next_id = table.next_id.max(id);
                id
            }
            None => {
                table.next_id += 1;
                table.next_id
            }
        };
        let mut row = data.clone();
        row.insert(meta.pk_field.clone(), Value::Number(id.into()));
        let row = Value::Object(row);
        table.rows.insert(id, row.clone());
        row
    }

    fn key(pk: &Value) -> Result<i64, StoreError> {
        match pk {
            Value::Number(n) => n.as_i64().ok_or_else(|| StoreError::InvalidKey(n.to_string())),
            Value::String(s) => s.parse().map_err(|_| StoreError::InvalidKey(s.clone())),
            other => Err(StoreError::InvalidKey(other.to_string())),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, meta: &ModelMeta, pk: &Value) -> Result<Option<Value>, StoreError> {
        let id = Self::key(pk)?;
        let tables = self.tables.read().unwrap();
        Ok(tables.get(&meta.table()).and_then(|t| t.rows.get(&id).cloned()))
    }

    async fn list(
        &self,
        meta: &ModelMeta,
        filters: &[(String, Value)],
    ) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().unwrap();
        let Some(table) = tables.get(&meta.table()) else {
            return Ok(Vec::new());
        };
        let rows = table
            .rows
            .values()
            .filter(|row| {
                filters
                    .iter()
                    .all(|(k, v)| row.get(k).map(|have| have == v).unwrap_or(false))
            })
            .cloned()
            .collect();
        Ok(rows)
    }

    async fn create(&self, meta: &ModelMeta, data: &Map<String, Value>) -> Result<Value, StoreError> {
        Ok(self.insert(meta, data))
    }

    async fn update(
        &self,
        meta: &ModelMeta,
        pk: &Value,
        data: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        let id = Self::key(pk)?;
        let mut tables = self.tables.write().unwrap();
        let Some(row) = tables.get_mut(&meta.table()).and_then(|t| t.rows.get_mut(&id)) else {
            return Ok(None);
        };
        let Value::Object(map) = row else {
            return Err(StoreError::Backend("row is not an object".into()));
        };
        for (k, v) in data {
            if *k == meta.pk_field {
                continue;
            }
            map.insert(k.clone(), v.clone());
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, meta: &ModelMeta, pk: &Value) -> Result<Option<Value>, StoreError> {
        let id = Self::key(pk)?;
        let mut tables = self.tables.write().unwrap();
        Ok(tables.get_mut(&meta.table()).and_then(|t| t.rows.remove(&id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FieldKind, FieldMeta};
    use serde_json::json;

    fn meta() -> ModelMeta {
        ModelMeta::new(
            "pages",
            "Page",
            vec![
                FieldMeta::new("id", FieldKind::Integer),
                FieldMeta::new("title", FieldKind::Text).required(),
            ],
        )
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let meta = meta();
        let a = store.create(&meta, json!({"title": "a"}).as_object().unwrap()).await.unwrap();
        let b = store.create(&meta, json!({"title": "b"}).as_object().unwrap()).await.unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
    }

    #[tokio::test]
    async fn get_update_delete_round_trip() {
        let store = MemoryStore::new();
        let meta = meta();
        let row = store.seed(&meta, json!({"id": 5, "title": "t"}));
        assert_eq!(row["id"], json!(5));

        let got = store.get(&meta, &json!(5)).await.unwrap().unwrap();
        assert_eq!(got["title"], json!("t"));

        let updated = store
            .update(&meta, &json!(5), json!({"title": "u"}).as_object().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["title"], json!("u"));

        assert!(store.delete(&meta, &json!(5)).await.unwrap().is_some());
        assert!(store.get(&meta, &json!(5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_applies_exact_filters() {
        let store = MemoryStore::new();
        let meta = meta();
        store.seed(&meta, json!({"title": "x", "kind": "draft"}));
        store.seed(&meta, json!({"title": "y", "kind": "live"}));
        let all = store.list(&meta, &[]).await.unwrap();
        assert_eq!(all.len(), 2);
        let drafts = store
            .list(&meta, &[("kind".to_string(), json!("draft"))])
            .await
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0]["title"], json!("x"));
    }
}
