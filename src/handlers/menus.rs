use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

use super::{sorted_ids, AppState, NodeSummary};
use crate::api::{grants_from_headers, ApiResponse, ApiResult};
use crate::error::ApiError;
use crate::expansion::{ExpansionStateManager, MemoryExpansionStore};
use crate::tree::{
    self, build_forest, filter_permitted, parent_candidates, render_forest, resolve_active, ActivePath, Forest,
    NodeId, OptimisticForest, OrderEntry, OrderPatch, RenderOptions, ReorderOperation, TreeError, TreeKind,
};

#[derive(Debug, Deserialize)]
pub struct SidebarQuery {
    /// Current location, e.g. `/files/42`
    pub location: Option<String>,
    /// Client-persisted expanded ids, comma separated
    pub expanded: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    pub menus: Vec<OrderEntry>,
}

fn parse_id_list(raw: Option<&str>) -> Result<Vec<NodeId>, ApiError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<NodeId>().map_err(|_| ApiError::bad_request(format!("Invalid node id '{}'", s))))
        .collect()
}

async fn load_forest(state: &AppState) -> Result<Forest, ApiError> {
    let records = state.store.load(TreeKind::Menu).await?;
    Ok(build_forest(records))
}

fn admin_tree(forest: &Forest) -> Value {
    let tree = render_forest(forest, &ActivePath::default(), &BTreeSet::new(), RenderOptions::default());
    json!({
        "menus": tree,
        "orphans": forest.orphans(),
    })
}

async fn persist(state: &AppState, patch: &[OrderPatch]) -> Result<(), TreeError> {
    if patch.is_empty() {
        return Ok(());
    }
    state
        .store
        .apply_patch(TreeKind::Menu, patch)
        .await
        .map_err(|e| TreeError::PersistenceFailure(e.to_string()))
}

/// GET /api/menus - Full menu tree for the management page
pub async fn index(Extension(state): Extension<AppState>) -> ApiResult<Value> {
    let forest = load_forest(&state).await?;
    Ok(ApiResponse::success(admin_tree(&forest)))
}

/// GET /api/menus/sidebar - Permission-filtered menu annotated for the current location
pub async fn sidebar(
    Query(query): Query<SidebarQuery>,
    headers: HeaderMap,
    Extension(state): Extension<AppState>,
) -> ApiResult<Value> {
    let seeded = parse_id_list(query.expanded.as_deref())?;
    let grants = grants_from_headers(&headers, &state.permissions_header);

    let records = state.store.load(TreeKind::Menu).await?;
    let forest = build_forest(filter_permitted(records, &grants));

    let location = query.location.unwrap_or_default();
    let active = resolve_active(&forest, &location);

    let raw = serde_json::to_string(&seeded).unwrap_or_else(|_| "[]".to_string());
    let session = MemoryExpansionStore::with_entry(state.expansion_storage_key.as_str(), raw);
    let mut expansion = ExpansionStateManager::load(&session, state.expansion_storage_key.as_str());
    let reconciled = expansion
        .reconcile(&forest, &active.ancestor_ids)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    let options = RenderOptions { hide_unroutable_leaves: state.hide_unroutable_leaves };
    let tree = render_forest(&forest, &active, &reconciled.expanded, options);

    Ok(ApiResponse::success(json!({
        "menus": tree,
        "location": location,
        "active_ids": sorted_ids(&active.active_ids),
        "ancestor_ids": sorted_ids(&active.ancestor_ids),
        "expanded": reconciled.expanded,
        "stale": reconciled.stale,
    })))
}

/// POST /api/menus/reorder - Apply one drag-and-drop move and persist the diff
pub async fn reorder(
    Extension(state): Extension<AppState>,
    Json(operation): Json<ReorderOperation>,
) -> ApiResult<Value> {
    let mut view = OptimisticForest::new(load_forest(&state).await?);

    let store = state.store.clone();
    let patch = view
        .commit(&operation, move |rows| async move { store.apply_patch(TreeKind::Menu, &rows).await })
        .await?;

    tracing::info!("Menu node {} moved, {} rows written", operation.node_id(), patch.len());
    let mut body = admin_tree(view.current());
    body["patch"] = json!(patch);
    Ok(ApiResponse::success(body))
}

/// POST /api/menus/order - Save the whole nested layout from the editor
pub async fn save_order(
    Extension(state): Extension<AppState>,
    Json(payload): Json<OrderPayload>,
) -> ApiResult<Value> {
    let forest = load_forest(&state).await?;
    let outcome = tree::apply_nested_order(&forest, &payload.menus)?;
    persist(&state, &outcome.patch).await?;

    let mut body = admin_tree(&outcome.forest);
    body["patch"] = json!(outcome.patch);
    Ok(ApiResponse::success(body))
}

/// POST /api/menus/normalize - Close order gaps and re-root orphans
pub async fn normalize(Extension(state): Extension<AppState>) -> ApiResult<Value> {
    let forest = load_forest(&state).await?;
    let outcome = tree::normalize(&forest);
    persist(&state, &outcome.patch).await?;

    let mut body = admin_tree(&outcome.forest);
    body["patch"] = json!(outcome.patch);
    Ok(ApiResponse::success(body))
}

/// GET /api/menus/parents - Parent options for a new menu
pub async fn parents(Extension(state): Extension<AppState>) -> ApiResult<Vec<NodeSummary>> {
    let forest = load_forest(&state).await?;
    Ok(ApiResponse::success(summaries(&forest, None)))
}

/// GET /api/menus/:id/parents - Parent options for an existing menu
pub async fn parents_for(
    Path(id): Path<NodeId>,
    Extension(state): Extension<AppState>,
) -> ApiResult<Vec<NodeSummary>> {
    let forest = load_forest(&state).await?;
    if !forest.contains(id) {
        return Err(TreeError::NodeNotFound(id).into());
    }
    Ok(ApiResponse::success(summaries(&forest, Some(id))))
}

fn summaries(forest: &Forest, editing: Option<NodeId>) -> Vec<NodeSummary> {
    parent_candidates(forest, editing)
        .into_iter()
        .filter_map(|id| NodeSummary::of(forest, id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expanded_id_lists() {
        assert_eq!(parse_id_list(None).unwrap(), Vec::<NodeId>::new());
        assert_eq!(parse_id_list(Some("3, 1,,7")).unwrap(), vec![3, 1, 7]);
        assert!(parse_id_list(Some("1,x")).is_err());
    }
}
