//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from model metadata.

use crate::store::{FieldKind, ModelMeta};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Quote identifier for PostgreSQL (safe: only from model metadata).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name; schema defaults to public.
fn qualified_table(meta: &ModelMeta) -> String {
    match meta.schema_name.as_deref() {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&meta.table())),
        None => quoted(&meta.table()),
    }
}

/// SQL cast for string-bound values of typed columns (e.g. `$n::timestamptz`).
fn cast_for(kind: FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::DateTime => Some("timestamptz"),
        FieldKind::Date => Some("date"),
        FieldKind::Uuid => Some("uuid"),
        _ => None,
    }
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    fn placeholder(&mut self, v: Value, kind: Option<FieldKind>) -> String {
        let n = self.push_param(v);
        match kind.and_then(cast_for) {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }
}

fn select_column_list(meta: &ModelMeta) -> String {
    meta.fields
        .iter()
        .map(|f| quoted(&f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key. Caller binds the pk as the sole param.
pub fn select_by_pk(meta: &ModelMeta) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_column_list(meta),
        qualified_table(meta),
        quoted(&meta.pk_field)
    );
    q
}

/// SELECT list with optional filters (exact match per field), ORDER BY pk,
/// optional LIMIT/OFFSET. Filters naming unknown fields are skipped.
pub fn select_list(
    meta: &ModelMeta,
    filters: &[(String, Value)],
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let known: HashSet<&str> = meta.fields.iter().map(|f| f.name.as_str()).collect();

    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if known.contains(col.as_str()) {
            let kind = meta.field(col).map(|f| f.kind);
            let ph = q.placeholder(val.clone(), kind);
            where_parts.push(format!("{} = {}", quoted(col), ph));
        }
    }

    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n.min(1000))).unwrap_or_default();
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}{}{}",
        select_column_list(meta),
        qualified_table(meta),
        where_clause,
        quoted(&meta.pk_field),
        limit_clause,
        offset_clause
    );
    q
}

/// INSERT: columns and placeholders from metadata; values from body.
/// Omits columns with a backend default when the body does not provide a
/// value, and omits the pk unless the body carries one.
pub fn insert(meta: &ModelMeta, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for f in &meta.fields {
        let is_pk = f.name == meta.pk_field;
        let val = body.get(&f.name).cloned();
        if val.is_none() && (is_pk || f.has_default) {
            continue;
        }
        let ph = q.placeholder(val.unwrap_or(Value::Null), Some(f.kind));
        cols.push(quoted(&f.name));
        placeholders.push(ph);
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(meta),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(meta)
    );
    q
}

/// UPDATE by pk: SET only fields present in body (and known to the model).
pub fn update(meta: &ModelMeta, pk: &Value, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(meta);
    let mut sets = Vec::new();
    for (k, v) in body {
        if *k == meta.pk_field {
            continue;
        }
        let Some(f) = meta.field(k) else { continue };
        let rhs = q.placeholder(v.clone(), Some(f.kind));
        sets.push(format!("{} = {}", quoted(k), rhs));
    }
    if sets.is_empty() {
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            select_column_list(meta),
            table,
            quoted(&meta.pk_field)
        );
        q.params.push(pk.clone());
        return q;
    }
    let pk_param = q.push_param(pk.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        sets.join(", "),
        quoted(&meta.pk_field),
        pk_param,
        select_column_list(meta)
    );
    q
}

/// DELETE by pk. Caller binds the pk as the sole param.
pub fn delete(meta: &ModelMeta) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        qualified_table(meta),
        quoted(&meta.pk_field),
        select_column_list(meta)
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldMeta;
    use serde_json::json;

    fn meta() -> ModelMeta {
        ModelMeta::new(
            "pages",
            "Page",
            vec![
                FieldMeta::new("id", FieldKind::Integer).with_default(),
                FieldMeta::new("title", FieldKind::Text).required(),
                FieldMeta::new("published_at", FieldKind::DateTime),
            ],
        )
    }

    #[test]
    fn select_by_pk_targets_default_table() {
        let q = select_by_pk(&meta());
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"title\", \"published_at\" FROM \"pages_page\" WHERE \"id\" = $1"
        );
    }

    #[test]
    fn select_list_skips_unknown_filters_and_casts_typed_ones() {
        let filters = vec![
            ("published_at".to_string(), json!("2024-01-01T00:00:00Z")),
            ("nope".to_string(), json!(1)),
        ];
        let q = select_list(&meta(), &filters, Some(10), None);
        assert!(q.sql.contains("WHERE \"published_at\" = $1::timestamptz"));
        assert!(!q.sql.contains("nope"));
        assert!(q.sql.ends_with("ORDER BY \"id\" LIMIT 10"));
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn insert_omits_defaulted_pk_when_absent() {
        let body = json!({"title": "hello"});
        let q = insert(&meta(), body.as_object().unwrap());
        assert!(q.sql.starts_with("INSERT INTO \"pages_page\" (\"title\") VALUES ($1)"));
        assert_eq!(q.params, vec![json!("hello")]);
    }

    #[test]
    fn update_sets_only_known_fields() {
        let body = json!({"title": "x", "bogus": 1, "id": 9});
        let q = update(&meta(), &json!(5), body.as_object().unwrap());
        assert_eq!(
            q.sql,
            "UPDATE \"pages_page\" SET \"title\" = $1 WHERE \"id\" = $2 RETURNING \"id\", \"title\", \"published_at\""
        );
        assert_eq!(q.params, vec![json!("x"), json!(5)]);
    }

    #[test]
    fn schema_qualified_table() {
        let mut m = meta();
        m.schema_name = Some("site".into());
        let q = delete(&m);
        assert!(q.sql.starts_with("DELETE FROM \"site\".\"pages_page\""));
    }
}
