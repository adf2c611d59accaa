//! Options resolution: layering, disabling, and fail-fast validation.

use serde_json::json;
use std::sync::Arc;
use viewset_sdk::{
    FieldKind, FieldMeta, MemoryStore, ModelMeta, Options, SetupError, Store, TemplateOpt, ViewSet,
};

fn meta() -> ModelMeta {
    ModelMeta::new(
        "pages",
        "Page",
        vec![
            FieldMeta::new("id", FieldKind::Integer).with_default(),
            FieldMeta::new("title", FieldKind::Text).required(),
        ],
    )
}

fn store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

#[test]
fn per_action_override_beats_view_default_beats_base() {
    // Base url for `add` is "add/".
    let views = ViewSet::for_model(meta(), store()).build().unwrap();
    assert_eq!(views.options("add").unwrap().url, "add/");

    // View-level default overrides the base for every action.
    let views = ViewSet::for_model(meta(), store())
        .defaults(Options::new().template("custom.html"))
        .build()
        .unwrap();
    for action in ["index", "add", "edit"] {
        match &views.options(action).unwrap().template {
            TemplateOpt::Single(t) => assert_eq!(t, "custom.html"),
            TemplateOpt::List(_) => panic!("view default should have replaced the base list"),
        }
    }

    // Per-action override beats both.
    let views = ViewSet::for_model(meta(), store())
        .defaults(Options::new().template("custom.html"))
        .action("add", Options::new().template("add.html").url("create/"))
        .build()
        .unwrap();
    match &views.options("add").unwrap().template {
        TemplateOpt::Single(t) => assert_eq!(t, "add.html"),
        TemplateOpt::List(_) => panic!("per-action override lost"),
    }
    assert_eq!(views.options("add").unwrap().url, "create/");
    match &views.options("edit").unwrap().template {
        TemplateOpt::Single(t) => assert_eq!(t, "custom.html"),
        TemplateOpt::List(_) => panic!("view default lost"),
    }
}

#[test]
fn extra_keys_resolve_with_same_precedence() {
    let views = ViewSet::for_model(meta(), store())
        .defaults(Options::new().set("page_size", json!(2)))
        .action("index", Options::new().set("page_size", json!(3)))
        .build()
        .unwrap();

    let index = views.options("index").unwrap();
    assert_eq!(index.param("page_size"), Some(&json!(3)));

    // No per-action override elsewhere: the view default applies.
    let add = views.options("add").unwrap();
    assert_eq!(add.param("page_size"), Some(&json!(2)));

    // Neither layer: caller default, then MissingOption.
    let fallback = json!(1);
    assert_eq!(add.param_or("unset", &fallback), &fallback);
    assert!(matches!(
        add.require("unset"),
        Err(SetupError::MissingOption { .. })
    ));
}

#[test]
fn disabling_removes_action_from_enabled_set() {
    let views = ViewSet::for_model(meta(), store())
        .disable("remove")
        .build()
        .unwrap();
    assert!(matches!(
        views.options("remove"),
        Err(SetupError::UnknownAction(_))
    ));
    assert!(views.actions().all(|a| a.name != "remove"));
    // The rest of the built-ins stay.
    assert_eq!(views.actions().count(), 4);
}

#[test]
fn invalid_action_names_fail_at_construction() {
    for name in ["get_thing", "pub__lish", "Publish", "0day"] {
        let result = ViewSet::for_model(meta(), store())
            .action(name, Options::new().url("x/"))
            .build();
        assert!(
            matches!(result, Err(SetupError::InvalidAction(_))),
            "{name} should be rejected"
        );
    }
}

#[test]
fn custom_action_requires_url() {
    let result = ViewSet::for_model(meta(), store())
        .action("publish", Options::new())
        .build();
    match result {
        Err(SetupError::MissingOption { action, key }) => {
            assert_eq!(action, "publish");
            assert_eq!(key, "url");
        }
        _ => panic!("expected MissingOption"),
    }
}

#[test]
fn custom_action_with_url_joins_enabled_set_after_builtins() {
    let views = ViewSet::for_model(meta(), store())
        .action("publish", Options::new().url(":pk/publish/"))
        .build()
        .unwrap();
    let names: Vec<_> = views.actions().map(|a| a.name.clone()).collect();
    assert_eq!(names, ["index", "details", "add", "edit", "remove", "publish"]);
    assert!(views.options("publish").unwrap().captures_pk());
}

#[test]
fn absolute_url_fragment_is_rejected() {
    let result = ViewSet::for_model(meta(), store())
        .action("publish", Options::new().url("/abs/"))
        .build();
    assert!(matches!(result, Err(SetupError::InvalidUrl { .. })));
}

#[test]
fn unknown_stage_override_target_fails_to_build() {
    use viewset_sdk::{
        ActionOptions, BoundViews, Context, FnStage, RequestCtx, Stage, StageFlow, ViewError,
    };
    let noop = |_: &BoundViews,
                _: &ActionOptions,
                _: &RequestCtx,
                _: &mut Context|
     -> Result<StageFlow, ViewError> { Ok(StageFlow::Continue) };
    let result = ViewSet::for_model(meta(), store())
        .stage("bogus", Stage::Post, FnStage(noop))
        .build();
    assert!(matches!(result, Err(SetupError::UnknownAction(_))));
}
