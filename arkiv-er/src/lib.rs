//! arkiv-er library - item entity REST service
//!
//! Exposes repository items, their metadata and related resources over HTTP.
//! Core logic lives in [`metadata`], [`projection`] and [`related`] and only
//! talks to the contracts in [`store`].

use std::sync::Arc;

use arkiv_common::config::ServiceConfig;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod metadata;
pub mod pagination;
pub mod projection;
pub mod related;
pub mod store;

use store::SqliteRepository;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<SqliteRepository>,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(repo: SqliteRepository, config: ServiceConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get};

    let items = Router::new()
        .route("/items/:id", get(api::get_item))
        .route(
            "/items/:id/metadata",
            get(api::get_metadata)
                .post(api::add_metadata)
                .put(api::replace_metadata),
        )
        .route("/items/:id/metadata/:eid", delete(api::remove_metadata))
        .route("/items/:id/bitstreams", get(api::list_bitstreams))
        .route("/items/:id/comments", get(api::list_comments))
        .route("/items/:id/comments/count", get(api::count_comments))
        .route("/items/:id/rating", get(api::get_rating));

    Router::new()
        .merge(items)
        .route("/metadata-fields", get(api::list_fields))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
