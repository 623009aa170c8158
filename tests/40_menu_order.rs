mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use panel_tree::database::FlatRecordStore;
use panel_tree::tree::{build_forest, FlatRecord, TreeKind};

#[tokio::test]
async fn nested_order_payload_replaces_layout() -> Result<()> {
    let app = common::TestApp::new();

    let payload = json!({
        "menus": [
            { "id": 5, "order": 1, "children": [{ "id": 6, "order": 1 }] },
            { "id": 2, "order": 2, "children": [{ "id": 4, "order": 1 }, { "id": 3, "order": 2 }] },
            { "id": 1, "order": 3 }
        ]
    });
    let (status, body) = app.post("/api/menus/order", payload).await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    let stored = build_forest(app.store.load(TreeKind::Menu).await?);
    assert_eq!(stored.roots(), &[5, 2, 1]);
    assert_eq!(stored.children(2), &[4, 3]);
    Ok(())
}

#[tokio::test]
async fn nested_order_with_duplicates_is_conflict() -> Result<()> {
    let app = common::TestApp::new();

    let payload = json!({ "menus": [{ "id": 1, "order": 1 }, { "id": 1, "order": 2 }] });
    let (status, _) = app.post("/api/menus/order", payload).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn normalize_closes_gaps_and_reroots_orphans() -> Result<()> {
    let app = common::TestApp::with_records(
        vec![
            FlatRecord::menu(1, None, 10, "Dashboard").with_route("/"),
            FlatRecord::menu(2, None, 40, "Settings").with_route("/settings"),
            FlatRecord::menu(3, Some(77), 1, "Lost").with_route("/lost"),
        ],
        common::folders(),
    );

    let (_, before) = app.get("/api/menus").await?;
    assert_eq!(before["data"]["orphans"], json!([3]));

    let (status, body) = app.post("/api/menus/normalize", json!({})).await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);

    let stored = app.store.load(TreeKind::Menu).await?;
    let lost = stored.iter().find(|r| r.id == 3).expect("orphan kept");
    assert_eq!(lost.parent_id, None);

    let forest = build_forest(stored);
    assert!(forest.orphans().is_empty());
    let orders: Vec<i32> = forest.roots().iter().filter_map(|&id| forest.get(id)).map(|n| n.record.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn parent_options_exclude_own_subtree() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app.get("/api/menus/parents").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(6));

    let (status, body) = app.get("/api/menus/2/parents").await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    let ids: Vec<i64> = body["data"].as_array().unwrap().iter().filter_map(|n| n["id"].as_i64()).collect();
    assert_eq!(ids, vec![1, 5, 6]);
    assert_eq!(body["data"][2]["depth"], 1);

    let (status, _) = app.get("/api/menus/404/parents").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
