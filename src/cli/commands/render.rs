use serde_json::json;
use std::path::Path;

use crate::cli::utils::{format_tree, load_records, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::expansion::{ExpansionStateManager, JsonFileExpansionStore, MemoryExpansionStore};
use crate::tree::{
    build_forest, filter_permitted, render_forest, resolve_active, FlatRecord, NodeId, PermissionSet,
    RenderOptions, TreeKind,
};

pub fn handle(
    input: &Path,
    location: Option<&str>,
    state_dir: Option<&Path>,
    grants: Vec<String>,
    all: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let records = load_records(input)?;
    let kind = records.first().map(FlatRecord::kind).unwrap_or(TreeKind::Menu);
    let records = if all {
        records
    } else {
        filter_permitted(records, &PermissionSet::new(grants))
    };

    let forest = build_forest(records);
    if !forest.orphans().is_empty() {
        tracing::warn!("{} orphaned {} node(s) promoted to root", forest.orphans().len(), kind);
    }

    let location = location.unwrap_or_default();
    let active = resolve_active(&forest, location);

    let key = config().tree.expansion_storage_key.as_str();
    let reconciled = match state_dir {
        Some(dir) => ExpansionStateManager::load(JsonFileExpansionStore::new(dir), key)
            .reconcile(&forest, &active.ancestor_ids)?,
        None => ExpansionStateManager::load(MemoryExpansionStore::new(), key)
            .reconcile(&forest, &active.ancestor_ids)?,
    };

    let options = match kind {
        TreeKind::Menu => RenderOptions { hide_unroutable_leaves: config().tree.hide_unroutable_leaves },
        TreeKind::Folder => RenderOptions::default(),
    };
    let tree = render_forest(&forest, &active, &reconciled.expanded, options);

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Rendered {} {} node(s)", forest.len(), kind),
            json!({
                "tree": tree,
                "orphans": forest.orphans(),
                "expanded": reconciled.expanded,
                "stale": reconciled.stale,
            }),
        ),
        OutputFormat::Text => {
            print!("{}", format_tree(&tree));
            if !reconciled.stale.is_empty() {
                println!("Dropped stale expanded ids: {:?}", reconciled.stale);
            }
            Ok(())
        }
    }
}

pub fn handle_toggle(id: NodeId, state_dir: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = JsonFileExpansionStore::new(state_dir);
    let mut manager = ExpansionStateManager::load(store, config().tree.expansion_storage_key.as_str());
    let expanded = manager.toggle(id)?;

    let verb = if expanded { "expanded" } else { "collapsed" };
    output_success(
        &output_format,
        &format!("Group {} {}", id, verb),
        json!({ "id": id, "expanded": expanded, "state": manager.expanded() }),
    )
}
