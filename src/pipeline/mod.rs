//! Per-request processing: an ordered stage sequence with early exit.
//!
//! Every action runs `init → prepare → form → post → done` (or its
//! `pipeline` option override). A stage either mutates the shared
//! [`Context`] and continues, or produces a terminal response that ends
//! the request. Per-(action, stage) overrides are an explicit table
//! resolved at construction; the defaults live in [`defaults`].

mod context;
mod defaults;
mod dispatch;
mod stage;

pub use context::Context;
pub use defaults::{default_redirect, default_stage, TemplateAjax};
pub use dispatch::{BoxedHandler, Decorator, HandlerFuture};
pub use stage::{FnStage, PipelineStage, Stage, StageFlow};

pub(crate) use dispatch::{apply_decorators, make_handler};
