//! Rendering boundary. Template engines are injectable; the shipped
//! [`JsonRenderer`] serves APIs, demos, and the test suite.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

/// Renders a template search list with the accumulated context.
/// `templates` is ordered most-specific first; engines should use the
/// first one they can load.
pub trait Renderer: Send + Sync {
    fn render(&self, templates: &[String], context: &Value) -> Response;
}

/// Template-less renderer: returns the context as JSON. The selected
/// template name is exposed in the `x-template` header so callers (and
/// tests) can observe template resolution.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, templates: &[String], context: &Value) -> Response {
        let mut response = (StatusCode::OK, Json(context.clone())).into_response();
        if let Some(name) = templates.first() {
            if let Ok(value) = name.parse() {
                response.headers_mut().insert("x-template", value);
            }
        }
        response
    }
}
