//! View-set: one model, its resolved action table, stage overrides, and
//! collaborators. Built once via the builder; immutable afterwards.

use crate::error::SetupError;
use crate::options::{resolve_actions, ActionDecl, ActionOptions, Options, OptionsResolver};
use crate::pipeline::{PipelineStage, Stage};
use crate::render::{JsonRenderer, Renderer};
use crate::store::{ModelMeta, Store};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ViewSet {
    meta: ModelMeta,
    resolver: OptionsResolver,
    stages: HashMap<(String, Stage), Arc<dyn PipelineStage>>,
    store: Arc<dyn Store>,
    renderer: Arc<dyn Renderer>,
}

impl ViewSet {
    /// Start building views for one model backed by the given store.
    pub fn for_model(meta: ModelMeta, store: Arc<dyn Store>) -> ViewSetBuilder {
        ViewSetBuilder {
            meta,
            store,
            renderer: None,
            defaults: Options::default(),
            declared: Vec::new(),
            stages: HashMap::new(),
        }
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Resolved options for an enabled action; `UnknownAction` for
    /// anything disabled or never declared.
    pub fn options(&self, action: &str) -> Result<&ActionOptions, SetupError> {
        self.resolver.resolve(action)
    }

    /// Enabled actions in emission order.
    pub fn actions(&self) -> impl Iterator<Item = &ActionOptions> {
        self.resolver.actions()
    }

    pub(crate) fn action_at(&self, index: usize) -> Option<&ActionOptions> {
        self.resolver.get(index)
    }

    pub(crate) fn stage_override(
        &self,
        action: &str,
        stage: Stage,
    ) -> Option<Arc<dyn PipelineStage>> {
        self.stages.get(&(action.to_string(), stage)).cloned()
    }
}

pub struct ViewSetBuilder {
    meta: ModelMeta,
    store: Arc<dyn Store>,
    renderer: Option<Arc<dyn Renderer>>,
    defaults: Options,
    declared: Vec<(String, ActionDecl)>,
    stages: HashMap<(String, Stage), Arc<dyn PipelineStage>>,
}

impl ViewSetBuilder {
    /// View-level defaults, applied to every action unless overridden.
    pub fn defaults(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    /// Per-action overrides. Declaring an unknown name creates a custom
    /// action; it must end up with a `url`.
    pub fn action(mut self, name: &str, options: Options) -> Self {
        self.upsert(name, ActionDecl::Enabled(options));
        self
    }

    /// Exclude an action entirely: no route, reversing its name fails.
    pub fn disable(mut self, name: &str) -> Self {
        self.upsert(name, ActionDecl::Disabled);
        self
    }

    /// Override one pipeline stage for one action.
    pub fn stage<S>(mut self, action: &str, stage: Stage, implementation: S) -> Self
    where
        S: PipelineStage + 'static,
    {
        self.stages
            .insert((action.to_string(), stage), Arc::new(implementation));
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    fn upsert(&mut self, name: &str, decl: ActionDecl) {
        if let Some(entry) = self.declared.iter_mut().find(|(n, _)| n == name) {
            entry.1 = decl;
        } else {
            self.declared.push((name.to_string(), decl));
        }
    }

    /// Validate names, merge the option layers, and freeze the action
    /// table. Fails fast: a view-set that does not build is unusable.
    pub fn build(self) -> Result<ViewSet, SetupError> {
        let resolver = resolve_actions(&self.defaults, &self.declared)?;
        for (action, _stage) in self.stages.keys() {
            resolver.resolve(action)?;
        }
        Ok(ViewSet {
            meta: self.meta,
            resolver,
            stages: self.stages,
            store: self.store,
            renderer: self.renderer.unwrap_or_else(|| Arc::new(JsonRenderer)),
        })
    }
}
