//! Raw option declarations: one layer of the merge (built-in base,
//! view-level defaults, or a per-action override).

use crate::forms::{FormFactory, Widget};
use crate::pipeline::{Context, Decorator, Stage};
use crate::request::RequestCtx;
use crate::routes::BoundViews;
use axum::response::Response;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Template option: a single pattern is used verbatim; a list is
/// filtered at render time by AJAX-ness. Patterns may use the
/// `{app}`, `{model}` and `{action}` placeholders.
#[derive(Clone)]
pub enum TemplateOpt {
    Single(String),
    List(Vec<String>),
}

/// Form option: the model-backed default form, no form at all, or a
/// caller-supplied factory.
#[derive(Clone)]
pub enum FormOpt {
    Model,
    Disabled,
    Custom(Arc<dyn FormFactory>),
}

pub type RedirectFn = dyn Fn(&BoundViews, &RequestCtx, &Context) -> String + Send + Sync;

/// Post-save redirect target: a literal path, or a callable evaluated
/// lazily with the view, request, and accumulated context.
#[derive(Clone)]
pub enum Redirect {
    Path(String),
    Computed(Arc<RedirectFn>),
}

/// Responder used for AJAX requests instead of the regular done stage.
pub trait AjaxResponder: Send + Sync {
    fn respond(
        &self,
        view: &BoundViews,
        action: &super::ActionOptions,
        req: &RequestCtx,
        ctx: &Context,
    ) -> Response;
}

/// One options layer; every key optional. Merging picks the most
/// specific non-absent layer per key (`extra` merges key-wise).
#[derive(Clone, Default)]
pub struct Options {
    pub url: Option<String>,
    pub template: Option<TemplateOpt>,
    pub form: Option<FormOpt>,
    pub fields: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub labels: Option<HashMap<String, String>>,
    pub widgets: Option<HashMap<String, Widget>>,
    pub required: Option<HashMap<String, bool>>,
    pub help_text: Option<HashMap<String, String>>,
    pub initial: Option<Vec<String>>,
    pub redirect: Option<Redirect>,
    pub permissions: Option<String>,
    pub decorators: Option<Vec<Arc<dyn Decorator>>>,
    pub pipeline: Option<Vec<Stage>>,
    pub ajax: Option<Option<Arc<dyn AjaxResponder>>>,
    pub extra: Map<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, fragment: &str) -> Self {
        self.url = Some(fragment.to_string());
        self
    }

    pub fn template(mut self, pattern: &str) -> Self {
        self.template = Some(TemplateOpt::Single(pattern.to_string()));
        self
    }

    pub fn templates<I: IntoIterator<Item = S>, S: Into<String>>(mut self, patterns: I) -> Self {
        self.template = Some(TemplateOpt::List(
            patterns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn form(mut self, factory: Arc<dyn FormFactory>) -> Self {
        self.form = Some(FormOpt::Custom(factory));
        self
    }

    pub fn no_form(mut self) -> Self {
        self.form = Some(FormOpt::Disabled);
        self
    }

    pub fn model_form(mut self) -> Self {
        self.form = Some(FormOpt::Model);
        self
    }

    pub fn fields<I: IntoIterator<Item = S>, S: Into<String>>(mut self, names: I) -> Self {
        self.fields = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I: IntoIterator<Item = S>, S: Into<String>>(mut self, names: I) -> Self {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn label(mut self, field: &str, label: &str) -> Self {
        self.labels
            .get_or_insert_with(HashMap::new)
            .insert(field.to_string(), label.to_string());
        self
    }

    pub fn widget(mut self, field: &str, widget: Widget) -> Self {
        self.widgets
            .get_or_insert_with(HashMap::new)
            .insert(field.to_string(), widget);
        self
    }

    pub fn required_field(mut self, field: &str, required: bool) -> Self {
        self.required
            .get_or_insert_with(HashMap::new)
            .insert(field.to_string(), required);
        self
    }

    pub fn help_text(mut self, field: &str, text: &str) -> Self {
        self.help_text
            .get_or_insert_with(HashMap::new)
            .insert(field.to_string(), text.to_string());
        self
    }

    pub fn initial<I: IntoIterator<Item = S>, S: Into<String>>(mut self, names: I) -> Self {
        self.initial = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn redirect_to(mut self, path: &str) -> Self {
        self.redirect = Some(Redirect::Path(path.to_string()));
        self
    }

    pub fn redirect_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&BoundViews, &RequestCtx, &Context) -> String + Send + Sync + 'static,
    {
        self.redirect = Some(Redirect::Computed(Arc::new(f)));
        self
    }

    pub fn permissions(mut self, perm: &str) -> Self {
        self.permissions = Some(perm.to_string());
        self
    }

    pub fn decorator(mut self, decorator: Arc<dyn Decorator>) -> Self {
        self.decorators.get_or_insert_with(Vec::new).push(decorator);
        self
    }

    pub fn pipeline<I: IntoIterator<Item = Stage>>(mut self, stages: I) -> Self {
        self.pipeline = Some(stages.into_iter().collect());
        self
    }

    pub fn ajax(mut self, responder: Arc<dyn AjaxResponder>) -> Self {
        self.ajax = Some(Some(responder));
        self
    }

    pub fn no_ajax(mut self) -> Self {
        self.ajax = Some(None);
        self
    }

    /// Set a free-form option key, resolved with the same precedence as
    /// the typed ones.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Overlay `over` on top of `self`: every key present in `over`
    /// wins; `extra` is merged key-wise.
    pub(crate) fn layered(mut self, over: &Options) -> Options {
        if over.url.is_some() {
            self.url = over.url.clone();
        }
        if over.template.is_some() {
            self.template = over.template.clone();
        }
        if over.form.is_some() {
            self.form = over.form.clone();
        }
        if over.fields.is_some() {
            self.fields = over.fields.clone();
        }
        if over.exclude.is_some() {
            self.exclude = over.exclude.clone();
        }
        if over.labels.is_some() {
            self.labels = over.labels.clone();
        }
        if over.widgets.is_some() {
            self.widgets = over.widgets.clone();
        }
        if over.required.is_some() {
            self.required = over.required.clone();
        }
        if over.help_text.is_some() {
            self.help_text = over.help_text.clone();
        }
        if over.initial.is_some() {
            self.initial = over.initial.clone();
        }
        if over.redirect.is_some() {
            self.redirect = over.redirect.clone();
        }
        if over.permissions.is_some() {
            self.permissions = over.permissions.clone();
        }
        if over.decorators.is_some() {
            self.decorators = over.decorators.clone();
        }
        if over.pipeline.is_some() {
            self.pipeline = over.pipeline.clone();
        }
        if over.ajax.is_some() {
            self.ajax = over.ajax.clone();
        }
        for (k, v) in &over.extra {
            self.extra.insert(k.clone(), v.clone());
        }
        self
    }
}

/// Per-action declaration on the view-set: enabled with overrides, or
/// explicitly disabled (no route, excluded from the enabled set).
#[derive(Clone)]
pub enum ActionDecl {
    Enabled(Options),
    Disabled,
}
