//! Route building: per-action patterns, reversible names, and the
//! bound view handed to pipeline stages.

use crate::error::SetupError;
use crate::options::{ActionOptions, TemplateOpt};
use crate::pipeline::{apply_decorators, make_handler, BoxedHandler, PipelineStage, Stage};
use crate::render::Renderer;
use crate::reverse::{Reverser, ReverseError};
use crate::store::{ModelMeta, Store};
use crate::viewset::ViewSet;
use axum::extract::Request;
use axum::routing::any;
use axum::Router;
use std::sync::Arc;

/// One generated route: metadata only, usable for introspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteSpec {
    pub action: String,
    pub pattern: String,
    pub name: String,
}

/// A view-set bound to its registration: base path, full name prefix,
/// and the site-wide reverser. This is the `view` stages receive.
pub struct BoundViews {
    views: Arc<ViewSet>,
    prefix: String,
    delim: String,
    base_path: String,
    reverser: Arc<Reverser>,
}

impl BoundViews {
    pub(crate) fn new(
        views: Arc<ViewSet>,
        prefix: String,
        delim: String,
        base_path: String,
        reverser: Arc<Reverser>,
    ) -> Self {
        BoundViews {
            views,
            prefix,
            delim,
            base_path,
            reverser,
        }
    }

    pub fn meta(&self) -> &ModelMeta {
        self.views.meta()
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        self.views.store()
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        self.views.renderer()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn reverser(&self) -> &Arc<Reverser> {
        &self.reverser
    }

    /// Resolved options for an enabled action.
    pub fn options(&self, action: &str) -> Result<&ActionOptions, SetupError> {
        self.views.options(action)
    }

    pub(crate) fn action(&self, index: usize) -> Option<&ActionOptions> {
        self.views.action_at(index)
    }

    /// Reversible route name: `prefix + delim + action`.
    pub fn route_name(&self, action: &str) -> String {
        format!("{}{}{}", self.prefix, self.delim, action)
    }

    /// Reverse an action of this view-set into a path.
    pub fn url(&self, action: &str, params: &[(&str, &str)]) -> Result<String, ReverseError> {
        self.reverser.reverse(&self.route_name(action), params)
    }

    pub(crate) fn stage_runner(&self, action: &str, stage: Stage) -> Arc<dyn PipelineStage> {
        self.views
            .stage_override(action, stage)
            .unwrap_or_else(|| crate::pipeline::default_stage(stage))
    }

    /// Template search list for an action, `{app}`/`{model}`/`{action}`
    /// substituted. Lists are filtered by AJAX-ness; a single pattern is
    /// used as-is.
    pub fn template_names(&self, action: &ActionOptions, is_ajax: bool) -> Vec<String> {
        let meta = self.meta();
        let model = meta.model_name();
        let subst = |t: &str| {
            t.replace("{app}", &meta.app_label)
                .replace("{model}", &model)
                .replace("{action}", &action.name)
        };
        match &action.template {
            TemplateOpt::Single(t) => vec![subst(t)],
            TemplateOpt::List(list) => list
                .iter()
                .filter(|t| t.contains("ajax") == is_ajax)
                .map(|t| subst(t))
                .collect(),
        }
    }
}

pub(crate) fn join_pattern(base_path: &str, fragment: &str) -> String {
    format!("{}{}", base_path, fragment)
}

/// Route metadata for one registration, in emission order.
pub(crate) fn route_specs(
    views: &ViewSet,
    base_path: &str,
    prefix: &str,
    delim: &str,
) -> Vec<RouteSpec> {
    views
        .actions()
        .map(|action| RouteSpec {
            action: action.name.clone(),
            pattern: join_pattern(base_path, &action.url),
            name: format!("{}{}{}", prefix, delim, action.name),
        })
        .collect()
}

/// Build `(spec, handler)` pairs for one bound view-set. Handlers are
/// dispatcher closures over the action index, wrapped by the action's
/// decorators (first declared innermost).
pub(crate) fn build_routes(bound: &Arc<BoundViews>) -> Vec<(RouteSpec, BoxedHandler)> {
    bound
        .views
        .actions()
        .enumerate()
        .map(|(index, action)| {
            let spec = RouteSpec {
                action: action.name.clone(),
                pattern: join_pattern(&bound.base_path, &action.url),
                name: bound.route_name(&action.name),
            };
            let handler = apply_decorators(make_handler(bound.clone(), index), &action.decorators);
            (spec, handler)
        })
        .collect()
}

/// Mount one boxed handler on a method-agnostic route.
pub(crate) fn mount(router: Router, pattern: &str, handler: BoxedHandler) -> Router {
    router.route(
        pattern,
        any(move |req: Request| {
            let handler = handler.clone();
            async move { handler.as_ref()(req).await }
        }),
    )
}
