//! Stage interface: the pipeline's single polymorphism point.

use super::Context;
use crate::error::ViewError;
use crate::options::ActionOptions;
use crate::request::RequestCtx;
use crate::routes::BoundViews;
use async_trait::async_trait;
use axum::response::Response;

/// The five pipeline stages, in default order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    Prepare,
    Form,
    Post,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Prepare => "prepare",
            Stage::Form => "form",
            Stage::Post => "post",
            Stage::Done => "done",
        }
    }
}

/// Outcome of one stage: keep going, or end the request with this
/// response. Context updates happen through the `&mut Context` argument.
pub enum StageFlow {
    Continue,
    Respond(Response),
}

/// One step of request processing. Implementations are shared across
/// requests, so state lives in the [`Context`], not in the stage.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    async fn run(
        &self,
        view: &BoundViews,
        action: &ActionOptions,
        req: &RequestCtx,
        ctx: &mut Context,
    ) -> Result<StageFlow, ViewError>;
}

/// Adapter for synchronous stage overrides written as closures.
pub struct FnStage<F>(pub F);

#[async_trait]
impl<F> PipelineStage for FnStage<F>
where
    F: Fn(&BoundViews, &ActionOptions, &RequestCtx, &mut Context) -> Result<StageFlow, ViewError>
        + Send
        + Sync,
{
    async fn run(
        &self,
        view: &BoundViews,
        action: &ActionOptions,
        req: &RequestCtx,
        ctx: &mut Context,
    ) -> Result<StageFlow, ViewError> {
        (self.0)(view, action, req, ctx)
    }
}
