use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use panel_tree::config::AppConfig;
use panel_tree::database::InMemoryStore;
use panel_tree::handlers::{router, AppState};
use panel_tree::tree::FlatRecord;

/// Dashboard, Administration (Users, Roles), Reports (Sales)
pub fn menus() -> Vec<FlatRecord> {
    vec![
        FlatRecord::menu(1, None, 1, "Dashboard").with_route("/"),
        FlatRecord::menu(2, None, 2, "Administration"),
        FlatRecord::menu(3, Some(2), 1, "Users").with_route("/users").with_permission("users.view"),
        FlatRecord::menu(4, Some(2), 2, "Roles").with_route("/roles").with_permission("roles.view"),
        FlatRecord::menu(5, None, 3, "Reports").with_permission("reports.view"),
        FlatRecord::menu(6, Some(5), 1, "Sales").with_route("/reports/sales"),
    ]
}

/// Documents > (Invoices > 2024, Contracts), Photos
pub fn folders() -> Vec<FlatRecord> {
    vec![
        FlatRecord::folder(10, None, 1, "Documents"),
        FlatRecord::folder(11, Some(10), 1, "Invoices"),
        FlatRecord::folder(12, Some(11), 1, "2024"),
        FlatRecord::folder(13, Some(10), 2, "Contracts"),
        FlatRecord::folder(20, None, 2, "Photos"),
    ]
}

pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_records(menus(), folders())
    }

    pub fn with_records(menus: Vec<FlatRecord>, folders: Vec<FlatRecord>) -> Self {
        let store = Arc::new(InMemoryStore::with_records(menus, folders));
        let state = AppState::new(store.clone(), &AppConfig::development());
        Self { store, router: router(state) }
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Request::get(uri).body(Body::empty())?).await
    }

    pub async fn get_with_permissions(&self, uri: &str, permissions: &str) -> Result<(StatusCode, Value)> {
        let request = Request::get(uri).header("x-user-permissions", permissions).body(Body::empty())?;
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?;
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, body))
    }
}

/// Ids of a rendered node list, depth-first
pub fn rendered_ids(nodes: &Value) -> Vec<i64> {
    let mut out = Vec::new();
    if let Some(list) = nodes.as_array() {
        for node in list {
            if let Some(id) = node["id"].as_i64() {
                out.push(id);
            }
            out.extend(rendered_ids(&node["children"]));
        }
    }
    out
}

/// Find a rendered node by id anywhere in the tree
pub fn find_node<'a>(nodes: &'a Value, id: i64) -> Option<&'a Value> {
    nodes.as_array()?.iter().find_map(|node| {
        if node["id"].as_i64() == Some(id) {
            Some(node)
        } else {
            find_node(&node["children"], id)
        }
    })
}
