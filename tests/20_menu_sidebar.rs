mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{find_node, rendered_ids};

#[tokio::test]
async fn admin_index_lists_every_menu() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app.get("/api/menus").await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(rendered_ids(&body["data"]["menus"]), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(body["data"]["orphans"], serde_json::json!([]));
    Ok(())
}

#[tokio::test]
async fn sidebar_drops_denied_subtrees() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app.get_with_permissions("/api/menus/sidebar", "users.view").await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    // Roles is denied; Reports is denied so Sales goes with it
    assert_eq!(rendered_ids(&body["data"]["menus"]), vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn sidebar_marks_active_path_and_expands_ancestors() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app
        .get_with_permissions("/api/menus/sidebar?location=/users/42", "users.view,roles.view")
        .await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    let data = &body["data"];
    assert_eq!(data["active_ids"], serde_json::json!([3]));
    assert_eq!(data["ancestor_ids"], serde_json::json!([2]));
    assert_eq!(data["expanded"], serde_json::json!([2]));

    let admin = find_node(&data["menus"], 2).expect("administration rendered");
    assert_eq!(admin["is_group"], true);
    assert_eq!(admin["is_ancestor_active"], true);
    assert_eq!(admin["is_expanded"], true);

    let users = find_node(&data["menus"], 3).expect("users rendered");
    assert_eq!(users["is_active"], true);
    assert_eq!(users["depth"], 1);

    let dashboard = find_node(&data["menus"], 1).expect("dashboard rendered");
    assert_eq!(dashboard["is_active"], false, "root route only matches exactly");
    Ok(())
}

#[tokio::test]
async fn sidebar_keeps_client_expansion_and_reports_stale_ids() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app
        .get_with_permissions("/api/menus/sidebar?location=/&expanded=5,99", "reports.view")
        .await?;

    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    let data = &body["data"];
    assert_eq!(data["active_ids"], serde_json::json!([1]));
    assert_eq!(data["expanded"], serde_json::json!([5]));
    assert_eq!(data["stale"], serde_json::json!([99]));
    Ok(())
}

#[tokio::test]
async fn sidebar_rejects_malformed_expanded_list() -> Result<()> {
    let app = common::TestApp::new();

    let (status, body) = app.get("/api/menus/sidebar?expanded=1,abc").await?;

    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected body: {}", body);
    assert_eq!(body["error"], true);
    Ok(())
}
