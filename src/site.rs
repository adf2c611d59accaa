//! Site registry: multiple (model, view-set) registrations aggregated
//! into one router and one reversible name table.
//!
//! Registrations are write-once: there is deliberately no `unregister`,
//! route tables are built at startup and read-only afterwards.

use crate::error::SetupError;
use crate::reverse::Reverser;
use crate::routes::{build_routes, mount, route_specs, BoundViews, RouteSpec};
use crate::viewset::ViewSet;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;

struct Registration {
    views: Arc<ViewSet>,
    base_path: String,
    prefix: String,
}

pub struct Site {
    prefix: Option<String>,
    delim: String,
    registered: Vec<Registration>,
}

impl Site {
    /// Create a site. `prefix` is prepended to every route name;
    /// `delim` joins name parts and must be `-`, `_` or empty.
    pub fn new(prefix: Option<&str>, delim: &str) -> Result<Self, SetupError> {
        if !matches!(delim, "-" | "_" | "") {
            return Err(SetupError::InvalidDelimiter(delim.to_string()));
        }
        Ok(Site {
            prefix: prefix.map(str::to_string),
            delim: delim.to_string(),
            registered: Vec::new(),
        })
    }

    /// Register a view-set.
    ///
    /// Routes mount under `base_path` (default `/{model}/`, must end
    /// with `/`); names use `[site prefix][delim][views prefix][delim][action]`
    /// with the views prefix defaulting to the lowercased model name.
    pub fn register(
        &mut self,
        views: Arc<ViewSet>,
        base_path: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<(), SetupError> {
        let meta = views.meta();
        let model_name = meta.model_name();
        let model_id = format!("{}.{}", meta.app_label, meta.object_name);

        for r in &self.registered {
            let same_model = r.views.meta().app_label == meta.app_label
                && r.views.meta().object_name == meta.object_name;
            if same_model && Arc::ptr_eq(&r.views, &views) {
                return Err(SetupError::AlreadyRegistered(model_id));
            }
        }

        let base_path = match base_path {
            None => format!("/{}/", model_name),
            Some("/") => "/".to_string(),
            Some(p) => {
                if !p.ends_with('/') {
                    return Err(SetupError::InvalidBasePath(p.to_string()));
                }
                if p.starts_with('/') {
                    p.to_string()
                } else {
                    format!("/{}", p)
                }
            }
        };
        if self.registered.iter().any(|r| r.base_path == base_path) {
            return Err(SetupError::AlreadyRegistered(base_path));
        }

        let mut prefix_bits = Vec::new();
        if let Some(site_prefix) = &self.prefix {
            prefix_bits.push(site_prefix.clone());
        }
        prefix_bits.push(prefix.map(str::to_string).unwrap_or(model_name));
        let full_prefix = prefix_bits.join(&self.delim);
        if self.registered.iter().any(|r| r.prefix == full_prefix) {
            return Err(SetupError::AlreadyRegistered(full_prefix));
        }

        tracing::info!(model = %model_id, base_path = %base_path, prefix = %full_prefix, "registered views");
        self.registered.push(Registration {
            views,
            base_path,
            prefix: full_prefix,
        });
        Ok(())
    }

    /// Aggregated route metadata, in registration order.
    pub fn routes(&self) -> Vec<RouteSpec> {
        self.registered
            .iter()
            .flat_map(|r| route_specs(&r.views, &r.base_path, &r.prefix, &self.delim))
            .collect()
    }

    /// Build the axum router and the site-wide reverser. Duplicate
    /// resolved patterns across registrations are a construction error.
    pub fn into_router(self) -> Result<(Router, Arc<Reverser>), SetupError> {
        let mut patterns = HashMap::new();
        let mut seen = HashMap::new();
        for spec in self.routes() {
            if let Some(name) = seen.insert(spec.pattern.clone(), spec.name.clone()) {
                return Err(SetupError::AlreadyRegistered(format!(
                    "pattern {} ({} / {})",
                    spec.pattern, name, spec.name
                )));
            }
            patterns.insert(spec.name, spec.pattern);
        }
        let reverser = Arc::new(Reverser::new(patterns));

        let mut router = Router::new();
        for registration in self.registered {
            let bound = Arc::new(BoundViews::new(
                registration.views,
                registration.prefix,
                self.delim.clone(),
                registration.base_path,
                reverser.clone(),
            ));
            for (spec, handler) in build_routes(&bound) {
                router = mount(router, &spec.pattern, handler);
            }
        }
        Ok((router, reverser))
    }
}
