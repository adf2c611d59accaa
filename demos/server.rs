//! Example server: registers CRUD views for a Page model over the
//! in-process store and serves them with axum. Run with
//! `cargo run --example server`, then try:
//!
//!   GET  /page/           list
//!   GET  /page/1/         details
//!   POST /page/add/       create (form-urlencoded or JSON)
//!   POST /page/1/edit/    update
//!   POST /page/1/remove/  delete

use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use viewset_sdk::{
    FieldKind, FieldMeta, FieldRule, MemoryStore, ModelMeta, Options, Site, ViewSet,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("viewset_sdk=debug".parse()?))
        .init();

    let meta = ModelMeta::new(
        "pages",
        "Page",
        vec![
            FieldMeta::new("id", FieldKind::Integer).with_default(),
            FieldMeta::new("title", FieldKind::Text).required().rule(FieldRule {
                max_length: Some(120),
                ..Default::default()
            }),
            FieldMeta::new("body", FieldKind::Text),
            FieldMeta::new("published", FieldKind::Bool),
        ],
    );

    let store = Arc::new(MemoryStore::new());
    store.seed(&meta, json!({"title": "Hello", "body": "First page", "published": true}));
    store.seed(&meta, json!({"title": "Draft", "body": "Work in progress", "published": false}));

    let views = ViewSet::for_model(meta, store)
        .action("add", Options::new().label("title", "Headline"))
        .build()?;

    let mut site = Site::new(None, "-")?;
    site.register(Arc::new(views), None, None)?;
    let (app, reverser) = site.into_router()?;
    tracing::info!(index = %reverser.reverse("page-index", &[])?, "routes mounted");

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
