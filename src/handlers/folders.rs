use axum::extract::{Extension, Path, Query};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

use super::{AppState, NodeSummary};
use crate::api::{ApiResponse, ApiResult};
use crate::tree::{build_forest, render_forest, resolve_active_node, NodeId, RenderOptions, TreeError, TreeKind};

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    pub folder_id: Option<NodeId>,
}

/// GET /api/folders - Folder tree with the current folder highlighted
pub async fn index(
    Query(query): Query<FolderQuery>,
    Extension(state): Extension<AppState>,
) -> ApiResult<Value> {
    let forest = build_forest(state.store.load(TreeKind::Folder).await?);

    if let Some(id) = query.folder_id {
        if !forest.contains(id) {
            return Err(TreeError::NodeNotFound(id).into());
        }
    }

    let active = resolve_active_node(&forest, query.folder_id);
    // The file manager shows every folder level open
    let expanded: BTreeSet<NodeId> = forest
        .preorder()
        .into_iter()
        .filter(|&id| !forest.children(id).is_empty())
        .collect();
    let tree = render_forest(&forest, &active, &expanded, RenderOptions::default());

    let current_folder = query.folder_id.and_then(|id| NodeSummary::of(&forest, id));
    let breadcrumbs: Vec<NodeSummary> = query
        .folder_id
        .map(|id| forest.path_to(id))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|id| NodeSummary::of(&forest, id))
        .collect();

    Ok(ApiResponse::success(json!({
        "folders": tree,
        "current_folder": current_folder,
        "breadcrumbs": breadcrumbs,
    })))
}

/// GET /api/folders/:id/subtree - Folders removed together with `id`
pub async fn subtree(
    Path(id): Path<NodeId>,
    Extension(state): Extension<AppState>,
) -> ApiResult<Value> {
    let forest = build_forest(state.store.load(TreeKind::Folder).await?);
    if !forest.contains(id) {
        return Err(TreeError::NodeNotFound(id).into());
    }

    let descendants = forest.descendants(id);
    let count = descendants.len() + 1;
    tracing::debug!("Folder {} has {} descendant folders", id, descendants.len());
    Ok(ApiResponse::success(json!({
        "id": id,
        "descendant_ids": descendants,
        "count": count,
    })))
}
