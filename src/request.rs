//! Request-side view of an incoming HTTP call: method, query, payload,
//! path captures, AJAX flag, and the authenticated principal if any.

use crate::error::ViewError;
use axum::extract::{FromRequest, FromRequestParts, Query, RawPathParams, Request};
use axum::http::{header::CONTENT_TYPE, Method};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Permission-checking capability attached to the request by the
/// surrounding application (an auth middleware inserting a
/// [`PrincipalRef`] extension). Absent principal means anonymous.
pub trait Principal: Send + Sync {
    fn has_perm(&self, perm: &str) -> bool;
}

pub type PrincipalRef = Arc<dyn Principal>;

/// Flat request context handed to every pipeline stage.
pub struct RequestCtx {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Parsed body: urlencoded-form or JSON object. Empty on GET.
    pub payload: Map<String, Value>,
    pub params: HashMap<String, String>,
    pub is_ajax: bool,
    pub principal: Option<PrincipalRef>,
}

impl RequestCtx {
    /// Whether this is a submit request (POST-equivalent).
    pub fn is_submit(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn has_perm(&self, perm: &str) -> bool {
        self.principal.as_ref().map(|p| p.has_perm(perm)).unwrap_or(false)
    }

    pub async fn extract(req: Request) -> Result<Self, ViewError> {
        let (mut parts, body) = req.into_parts();

        let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Err(_) => HashMap::new(),
        };

        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let is_ajax = parts
            .headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
            .unwrap_or(false);

        let principal = parts.extensions.get::<PrincipalRef>().cloned();
        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let req = Request::from_parts(parts, body);

        let payload = if content_type.starts_with("application/json") {
            let axum::Json(value) = axum::Json::<Value>::from_request(req, &())
                .await
                .map_err(|e| ViewError::BadRequest(e.to_string()))?;
            match value {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                _ => return Err(ViewError::BadRequest("body must be a JSON object".into())),
            }
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let axum::Form(fields) = axum::Form::<HashMap<String, String>>::from_request(req, &())
                .await
                .map_err(|e| ViewError::BadRequest(e.to_string()))?;
            fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        } else {
            Map::new()
        };

        Ok(RequestCtx {
            method,
            path,
            query,
            payload,
            params,
            is_ajax,
            principal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    struct Anyone;
    impl Principal for Anyone {
        fn has_perm(&self, _perm: &str) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn extracts_query_ajax_and_principal() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/pages/?title=hi")
            .header("x-requested-with", "XMLHttpRequest")
            .extension(Arc::new(Anyone) as PrincipalRef)
            .body(Body::empty())
            .unwrap();
        let ctx = RequestCtx::extract(req).await.unwrap();
        assert!(ctx.is_ajax);
        assert!(!ctx.is_submit());
        assert_eq!(ctx.query.get("title").map(String::as_str), Some("hi"));
        assert!(ctx.has_perm("anything"));
    }

    #[tokio::test]
    async fn parses_urlencoded_payload() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/pages/add/")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("title=hello&views=3"))
            .unwrap();
        let ctx = RequestCtx::extract(req).await.unwrap();
        assert!(ctx.is_submit());
        assert_eq!(ctx.payload.get("title"), Some(&Value::String("hello".into())));
    }

    #[tokio::test]
    async fn rejects_non_object_json() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/pages/add/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("[1,2]"))
            .unwrap();
        assert!(RequestCtx::extract(req).await.is_err());
    }
}
