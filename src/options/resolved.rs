//! Resolved per-action configuration: the three option layers merged
//! once at view-set construction into an immutable lookup table.

use super::registry::{base_options, kind_of, ActionKind, BUILTIN};
use super::types::{ActionDecl, AjaxResponder, FormOpt, Options, Redirect, TemplateOpt};
use super::validator::{validate_action_name, validate_url_fragment};
use crate::error::SetupError;
use crate::forms::Widget;
use crate::pipeline::{Decorator, Stage};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Effective options for one enabled action. Every key is concrete or
/// an explicit absence; nothing is re-resolved at request time.
#[derive(Clone)]
pub struct ActionOptions {
    pub name: String,
    pub kind: ActionKind,
    /// URL fragment relative to the base path, axum syntax (`:pk/`).
    pub url: String,
    pub template: TemplateOpt,
    pub form: FormOpt,
    pub fields: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub labels: HashMap<String, String>,
    pub widgets: HashMap<String, Widget>,
    pub required: HashMap<String, bool>,
    pub help_text: HashMap<String, String>,
    pub initial: Vec<String>,
    pub redirect: Redirect,
    pub permissions: Option<String>,
    pub decorators: Vec<Arc<dyn Decorator>>,
    pub pipeline: Vec<Stage>,
    pub ajax: Option<Arc<dyn AjaxResponder>>,
    extra: Map<String, Value>,
}

impl ActionOptions {
    /// Free-form option value, if any layer supplied it.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Free-form option value with a caller-supplied default.
    pub fn param_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.extra.get(key).unwrap_or(default)
    }

    /// Free-form option value that must be present.
    pub fn require(&self, key: &str) -> Result<&Value, SetupError> {
        self.extra.get(key).ok_or_else(|| SetupError::MissingOption {
            action: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// Whether the URL fragment captures a primary key.
    pub fn captures_pk(&self) -> bool {
        self.url.split('/').any(|seg| seg == ":pk")
    }
}

/// Immutable action table in emission order: registry order first, then
/// custom actions in declaration order.
pub struct OptionsResolver {
    actions: Vec<ActionOptions>,
    index: HashMap<String, usize>,
}

impl OptionsResolver {
    pub fn resolve(&self, action: &str) -> Result<&ActionOptions, SetupError> {
        self.index
            .get(action)
            .map(|&i| &self.actions[i])
            .ok_or_else(|| SetupError::UnknownAction(action.to_string()))
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionOptions> {
        self.actions.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ActionOptions> {
        self.actions.get(index)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Merge the three layers for every enabled action and freeze the
/// result. Declared custom actions join the built-in set; a
/// [`ActionDecl::Disabled`] declaration removes the action entirely.
pub(crate) fn resolve_actions(
    defaults: &Options,
    declared: &[(String, ActionDecl)],
) -> Result<OptionsResolver, SetupError> {
    for (name, _) in declared {
        validate_action_name(name)?;
    }

    let declared_for = |name: &str| declared.iter().find(|(n, _)| n == name).map(|(_, d)| d);

    let mut ordered: Vec<&str> = BUILTIN.iter().map(|(name, _, _)| *name).collect();
    for (name, _) in declared {
        if !ordered.contains(&name.as_str()) {
            ordered.push(name.as_str());
        }
    }

    let mut actions = Vec::new();
    let mut index = HashMap::new();
    for name in ordered {
        let overrides = match declared_for(name) {
            Some(ActionDecl::Disabled) => continue,
            Some(ActionDecl::Enabled(options)) => Some(options),
            None => None,
        };
        let mut merged = base_options(name).layered(defaults);
        if let Some(overrides) = overrides {
            merged = merged.layered(overrides);
        }
        let resolved = freeze(name, merged)?;
        index.insert(name.to_string(), actions.len());
        actions.push(resolved);
    }

    Ok(OptionsResolver { actions, index })
}

fn freeze(name: &str, merged: Options) -> Result<ActionOptions, SetupError> {
    let url = merged.url.ok_or_else(|| SetupError::MissingOption {
        action: name.to_string(),
        key: "url".to_string(),
    })?;
    validate_url_fragment(name, &url)?;
    Ok(ActionOptions {
        name: name.to_string(),
        kind: kind_of(name),
        url,
        template: merged
            .template
            .unwrap_or_else(|| TemplateOpt::List(Vec::new())),
        form: merged.form.unwrap_or(FormOpt::Disabled),
        fields: merged.fields,
        exclude: merged.exclude,
        labels: merged.labels.unwrap_or_default(),
        widgets: merged.widgets.unwrap_or_default(),
        required: merged.required.unwrap_or_default(),
        help_text: merged.help_text.unwrap_or_default(),
        initial: merged.initial.unwrap_or_default(),
        redirect: merged
            .redirect
            .unwrap_or_else(|| Redirect::Path("/".to_string())),
        permissions: merged.permissions,
        decorators: merged.decorators.unwrap_or_default(),
        pipeline: merged.pipeline.unwrap_or_else(|| {
            vec![Stage::Init, Stage::Prepare, Stage::Form, Stage::Post, Stage::Done]
        }),
        ajax: merged.ajax.unwrap_or(None),
        extra: merged.extra,
    })
}
