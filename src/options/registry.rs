//! Built-in action registry: the five generic actions, their URL
//! fragments, and the base option values every layer merges over.

use super::types::{FormOpt, Options, Redirect, TemplateOpt};
use crate::pipeline::{default_redirect, Stage, TemplateAjax};
use std::sync::Arc;

/// Classifies an action for the default stage implementations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Index,
    Details,
    Add,
    Edit,
    Remove,
    Custom,
}

/// Registry order; route emission follows it, customs come after.
pub const BUILTIN: &[(&str, ActionKind, &str)] = &[
    ("index", ActionKind::Index, ""),
    ("details", ActionKind::Details, ":pk/"),
    ("add", ActionKind::Add, "add/"),
    ("edit", ActionKind::Edit, ":pk/edit/"),
    ("remove", ActionKind::Remove, ":pk/remove/"),
];

pub fn builtin_actions() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _, _)| *name)
}

pub fn kind_of(action: &str) -> ActionKind {
    BUILTIN
        .iter()
        .find(|(name, _, _)| *name == action)
        .map(|(_, kind, _)| *kind)
        .unwrap_or(ActionKind::Custom)
}

/// Default template search list. Names containing `ajax` serve AJAX
/// requests, the rest serve regular ones.
fn default_templates() -> TemplateOpt {
    TemplateOpt::List(vec![
        "{app}/{model}/{action}.html".to_string(),
        "{app}/{model}/{action}.ajax.html".to_string(),
        "viewset/{action}.html".to_string(),
        "viewset/_form.html".to_string(),
        "viewset/_ajax.html".to_string(),
    ])
}

/// Built-in base options for one action. The lowest-precedence layer.
pub(crate) fn base_options(action: &str) -> Options {
    let kind = kind_of(action);
    let url = BUILTIN
        .iter()
        .find(|(name, _, _)| *name == action)
        .map(|(_, _, fragment)| fragment.to_string());
    let form = match kind {
        ActionKind::Add | ActionKind::Edit | ActionKind::Custom => FormOpt::Model,
        ActionKind::Index | ActionKind::Details | ActionKind::Remove => FormOpt::Disabled,
    };
    Options {
        url,
        template: Some(default_templates()),
        form: Some(form),
        redirect: Some(Redirect::Computed(Arc::new(default_redirect))),
        ajax: Some(Some(Arc::new(TemplateAjax))),
        pipeline: Some(vec![
            Stage::Init,
            Stage::Prepare,
            Stage::Form,
            Stage::Post,
            Stage::Done,
        ]),
        ..Options::default()
    }
}
