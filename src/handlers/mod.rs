pub mod folders;
pub mod menus;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::FlatRecordStore;
use crate::tree::{Forest, NodeId};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FlatRecordStore>,
    pub expansion_storage_key: String,
    pub hide_unroutable_leaves: bool,
    pub permissions_header: String,
}

impl AppState {
    pub fn new(store: Arc<dyn FlatRecordStore>, config: &AppConfig) -> Self {
        Self {
            store,
            expansion_storage_key: config.tree.expansion_storage_key.clone(),
            hide_unroutable_leaves: config.tree.hide_unroutable_leaves,
            permissions_header: config.security.permissions_header.clone(),
        }
    }
}

/// `{id, label, depth}` row used for pickers and breadcrumbs
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub label: String,
    pub depth: usize,
}

impl NodeSummary {
    pub fn of(forest: &Forest, id: NodeId) -> Option<Self> {
        forest.get(id).map(|node| NodeSummary {
            id,
            label: node.record.label().to_string(),
            depth: forest.depth(id),
        })
    }
}

pub(crate) fn sorted_ids<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = ids.into_iter().copied().collect();
    out.sort_unstable();
    out
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(menu_routes())
        .merge(folder_routes())
        .layer(Extension(state))
}

fn menu_routes() -> Router {
    Router::new()
        .route("/api/menus", get(menus::index))
        .route("/api/menus/sidebar", get(menus::sidebar))
        .route("/api/menus/reorder", post(menus::reorder))
        .route("/api/menus/order", post(menus::save_order))
        .route("/api/menus/normalize", post(menus::normalize))
        .route("/api/menus/parents", get(menus::parents))
        .route("/api/menus/:id/parents", get(menus::parents_for))
}

fn folder_routes() -> Router {
    Router::new()
        .route("/api/folders", get(folders::index))
        .route("/api/folders/:id/subtree", get(folders::subtree))
}

async fn health(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
