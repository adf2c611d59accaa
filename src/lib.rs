//! Viewset SDK: declarative CRUD view-sets and routing for axum.

pub mod error;
pub mod forms;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod reverse;
pub mod routes;
pub mod site;
pub mod sql;
pub mod store;
pub mod viewset;

pub use error::{SetupError, ViewError};
pub use forms::{Form, FormFactory, ModelForm, ModelFormFactory, Widget};
pub use options::{ActionDecl, ActionKind, ActionOptions, FormOpt, Options, Redirect, TemplateOpt};
pub use pipeline::{
    BoxedHandler, Context, Decorator, FnStage, HandlerFuture, PipelineStage, Stage, StageFlow,
};
pub use render::{JsonRenderer, Renderer};
pub use request::{Principal, PrincipalRef, RequestCtx};
pub use reverse::{ReverseError, Reverser};
pub use routes::{BoundViews, RouteSpec};
pub use site::Site;
pub use store::{FieldKind, FieldMeta, FieldRule, MemoryStore, ModelMeta, PgStore, Store};
pub use viewset::{ViewSet, ViewSetBuilder};
