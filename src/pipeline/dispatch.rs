//! Handler construction: one boxed dispatcher per (view-set, action),
//! wrapped by the action's decorators before route registration.

use super::{Context, StageFlow};
use crate::error::ViewError;
use crate::request::RequestCtx;
use crate::routes::BoundViews;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A fully built request handler. Decorators receive and return this
/// shape, so they compose freely.
pub type BoxedHandler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Request-wrapping decorator (login-required, throttling, ...). Applied
/// after the dispatcher closure is built; the last declared decorator
/// ends up outermost.
pub trait Decorator: Send + Sync {
    fn decorate(&self, inner: BoxedHandler) -> BoxedHandler;
}

/// Build the bare dispatcher for one action.
pub(crate) fn make_handler(view: Arc<BoundViews>, action_index: usize) -> BoxedHandler {
    Arc::new(move |req| {
        let view = view.clone();
        Box::pin(run(view, action_index, req))
    })
}

pub(crate) fn apply_decorators(
    handler: BoxedHandler,
    decorators: &[Arc<dyn Decorator>],
) -> BoxedHandler {
    let mut handler = handler;
    for decorator in decorators {
        handler = decorator.decorate(handler);
    }
    handler
}

async fn run(view: Arc<BoundViews>, action_index: usize, req: Request) -> Response {
    let Some(action) = view.action(action_index) else {
        return ViewError::Internal(format!("no action at index {action_index}")).into_response();
    };
    let request = match RequestCtx::extract(req).await {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    tracing::debug!(action = %action.name, path = %request.path, method = %request.method, "dispatch");

    let mut ctx = Context::new();
    for stage in &action.pipeline {
        let runner = view.stage_runner(&action.name, *stage);
        match runner.run(&view, action, &request, &mut ctx).await {
            Ok(StageFlow::Continue) => {}
            Ok(StageFlow::Respond(response)) => return response,
            Err(e) => {
                tracing::debug!(action = %action.name, stage = stage.as_str(), error = %e, "stage error");
                return e.into_response();
            }
        }
    }
    ViewError::Internal("pipeline completed without a response".into()).into_response()
}
