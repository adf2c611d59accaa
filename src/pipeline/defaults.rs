//! Shared default stage implementations, keyed off the action kind.

use super::{Context, PipelineStage, Stage, StageFlow};
use crate::error::ViewError;
use crate::forms::{FieldOverrides, FormInit, ModelFormFactory};
use crate::options::{ActionKind, ActionOptions, AjaxResponder, FormOpt, Redirect};
use crate::request::RequestCtx;
use crate::routes::BoundViews;
use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use std::sync::Arc;

pub fn default_stage(stage: Stage) -> Arc<dyn PipelineStage> {
    match stage {
        Stage::Init => Arc::new(InitStage),
        Stage::Prepare => Arc::new(PrepareStage),
        Stage::Form => Arc::new(FormStage),
        Stage::Post => Arc::new(PostStage),
        Stage::Done => Arc::new(DoneStage),
    }
}

/// Permission gate. Anonymous requests fail any required permission.
struct InitStage;

#[async_trait]
impl PipelineStage for InitStage {
    async fn run(
        &self,
        _view: &BoundViews,
        action: &ActionOptions,
        req: &RequestCtx,
        _ctx: &mut Context,
    ) -> Result<StageFlow, ViewError> {
        if let Some(perm) = &action.permissions {
            if !req.has_perm(perm) {
                return Err(ViewError::PermissionDenied(perm.clone()));
            }
        }
        Ok(StageFlow::Continue)
    }
}

/// Record preparation: list for index, pk lookup for object-scoped
/// actions. Custom actions fetch iff their URL captures `:pk`.
struct PrepareStage;

#[async_trait]
impl PipelineStage for PrepareStage {
    async fn run(
        &self,
        view: &BoundViews,
        action: &ActionOptions,
        req: &RequestCtx,
        ctx: &mut Context,
    ) -> Result<StageFlow, ViewError> {
        let meta = view.meta();
        match action.kind {
            ActionKind::Index => {
                let rows = view.store().list(meta, &[]).await?;
                ctx.objects_list = Some(rows);
            }
            ActionKind::Add => {}
            ActionKind::Details | ActionKind::Edit | ActionKind::Remove => {
                ctx.obj = Some(fetch_object(view, req).await?);
            }
            ActionKind::Custom => {
                if action.captures_pk() {
                    ctx.obj = Some(fetch_object(view, req).await?);
                }
            }
        }
        Ok(StageFlow::Continue)
    }
}

async fn fetch_object(view: &BoundViews, req: &RequestCtx) -> Result<Value, ViewError> {
    let meta = view.meta();
    let raw = req
        .param("pk")
        .ok_or_else(|| ViewError::BadRequest("missing pk".into()))?;
    // Unparseable pk means no such record, same as a failed lookup.
    let pk = match meta.parse_pk(raw) {
        Ok(pk) => pk,
        Err(_) => return Err(ViewError::NotFound(raw.to_string())),
    };
    view.store()
        .get(meta, &pk)
        .await?
        .ok_or_else(|| ViewError::NotFound(format!("{} {}", meta.model_name(), raw)))
}

/// Form construction, validation and save. For `remove`, the submit
/// request deletes the prepared record instead.
struct FormStage;

#[async_trait]
impl PipelineStage for FormStage {
    async fn run(
        &self,
        view: &BoundViews,
        action: &ActionOptions,
        req: &RequestCtx,
        ctx: &mut Context,
    ) -> Result<StageFlow, ViewError> {
        if action.kind == ActionKind::Remove {
            if req.is_submit() {
                let meta = view.meta();
                let pk = ctx
                    .obj
                    .as_ref()
                    .and_then(|o| o.get(&meta.pk_field))
                    .cloned()
                    .ok_or_else(|| ViewError::Internal("remove without object".into()))?;
                view.store().delete(meta, &pk).await?;
                // The record is gone: drop it so the redirect falls
                // back to the index instead of the dead details page.
                ctx.obj = None;
                ctx.form_saved = true;
            }
            return Ok(StageFlow::Continue);
        }

        let factory: Arc<dyn crate::forms::FormFactory> = match &action.form {
            FormOpt::Disabled => {
                ctx.form = None;
                return Ok(StageFlow::Continue);
            }
            FormOpt::Model => Arc::new(ModelFormFactory),
            FormOpt::Custom(factory) => factory.clone(),
        };

        let overrides = FieldOverrides {
            labels: action.labels.clone(),
            widgets: action.widgets.clone(),
            help_text: action.help_text.clone(),
            required: action.required.clone(),
        };
        let mut initial = Map::new();
        for name in &action.initial {
            if let Some(v) = req.query.get(name) {
                initial.insert(name.clone(), Value::String(v.clone()));
            }
        }
        let data = if req.is_submit() { Some(&req.payload) } else { None };
        let mut form = factory.build(FormInit {
            meta: view.meta(),
            fields: action.fields.as_deref(),
            exclude: action.exclude.as_deref(),
            overrides: &overrides,
            initial,
            instance: ctx.obj.as_ref(),
            data,
        })?;

        if form.is_bound() && form.is_valid() {
            let saved = form.save(view.store().as_ref()).await?;
            ctx.obj = Some(saved);
            ctx.form_saved = true;
        }
        ctx.form = Some(form);
        Ok(StageFlow::Continue)
    }
}

/// Post-processing hook; no-op unless overridden.
struct PostStage;

#[async_trait]
impl PipelineStage for PostStage {
    async fn run(
        &self,
        _view: &BoundViews,
        _action: &ActionOptions,
        _req: &RequestCtx,
        _ctx: &mut Context,
    ) -> Result<StageFlow, ViewError> {
        Ok(StageFlow::Continue)
    }
}

/// Terminal stage: AJAX responder, post-save redirect, or render.
struct DoneStage;

#[async_trait]
impl PipelineStage for DoneStage {
    async fn run(
        &self,
        view: &BoundViews,
        action: &ActionOptions,
        req: &RequestCtx,
        ctx: &mut Context,
    ) -> Result<StageFlow, ViewError> {
        if req.is_ajax {
            if let Some(responder) = &action.ajax {
                return Ok(StageFlow::Respond(responder.respond(view, action, req, ctx)));
            }
        }

        // Always redirect after a save to prevent re-submits.
        if ctx.form_saved {
            let target = match &action.redirect {
                Redirect::Path(path) => path.clone(),
                Redirect::Computed(f) => f.as_ref()(view, req, ctx),
            };
            return Ok(StageFlow::Respond(
                axum::response::Redirect::to(&target).into_response(),
            ));
        }

        let names = view.template_names(action, req.is_ajax);
        Ok(StageFlow::Respond(
            view.renderer().render(&names, &ctx.to_value()),
        ))
    }
}

/// Default post-save target: the saved record's details route when it
/// exists, the index otherwise, the base path as a last resort.
pub fn default_redirect(view: &BoundViews, _req: &RequestCtx, ctx: &Context) -> String {
    if let Some(pk) = ctx
        .obj
        .as_ref()
        .and_then(|o| o.get(&view.meta().pk_field))
    {
        let pk = value_segment(pk);
        if let Ok(url) = view.url("details", &[("pk", pk.as_str())]) {
            return url;
        }
    }
    view.url("index", &[])
        .unwrap_or_else(|_| view.base_path().to_string())
}

fn value_segment(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Default AJAX responder: render the AJAX-filtered template set.
pub struct TemplateAjax;

impl AjaxResponder for TemplateAjax {
    fn respond(
        &self,
        view: &BoundViews,
        action: &ActionOptions,
        _req: &RequestCtx,
        ctx: &Context,
    ) -> Response {
        let names = view.template_names(action, true);
        view.renderer().render(&names, &ctx.to_value())
    }
}
