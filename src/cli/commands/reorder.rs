use serde_json::json;
use std::path::Path;

use crate::cli::utils::{load_records, output_success, save_records};
use crate::cli::OutputFormat;
use crate::tree::{self, build_forest, parent_candidates, NodeId, ReorderOperation, ReorderOutcome, TreeError};

/// Build the operation a drag-and-drop would send for the given flags
pub fn operation_for(node: NodeId, index: usize, parent: Option<NodeId>, root: bool) -> ReorderOperation {
    match (parent, root) {
        (Some(parent), _) => ReorderOperation::MoveAcrossParents {
            node_id: node,
            new_parent_id: Some(parent),
            new_index: index,
        },
        (None, true) => ReorderOperation::MoveAcrossParents { node_id: node, new_parent_id: None, new_index: index },
        (None, false) => ReorderOperation::MoveWithinSiblings { node_id: node, new_index: index },
    }
}

pub fn handle_move(
    input: &Path,
    node: NodeId,
    index: usize,
    parent: Option<NodeId>,
    root: bool,
    write: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let forest = build_forest(load_records(input)?);
    let operation = operation_for(node, index, parent, root);
    let outcome = tree::reorder(&forest, &operation)?;
    finish(input, outcome, write, &format!("Moved node {}", node), output_format)
}

pub fn handle_normalize(input: &Path, write: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let forest = build_forest(load_records(input)?);
    let reattached = forest.orphans().len();
    let outcome = tree::normalize(&forest);
    finish(
        input,
        outcome,
        write,
        &format!("Normalized tree ({} orphan(s) re-rooted)", reattached),
        output_format,
    )
}

pub fn handle_parents(input: &Path, node: Option<NodeId>, output_format: OutputFormat) -> anyhow::Result<()> {
    let forest = build_forest(load_records(input)?);
    if let Some(id) = node {
        if !forest.contains(id) {
            return Err(TreeError::NodeNotFound(id).into());
        }
    }

    let candidates = parent_candidates(&forest, node);
    match output_format {
        OutputFormat::Json => {
            let rows: Vec<_> = candidates
                .iter()
                .filter_map(|&id| {
                    forest.get(id).map(|n| json!({ "id": id, "label": n.record.label(), "depth": forest.depth(id) }))
                })
                .collect();
            output_success(&output_format, &format!("{} parent candidate(s)", rows.len()), json!(rows))
        }
        OutputFormat::Text => {
            println!("(root)");
            for id in candidates {
                if let Some(n) = forest.get(id) {
                    println!("{}{} #{}", "  ".repeat(forest.depth(id) + 1), n.record.label(), id);
                }
            }
            Ok(())
        }
    }
}

fn finish(
    input: &Path,
    outcome: ReorderOutcome,
    write: bool,
    message: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    if write && !outcome.patch.is_empty() {
        save_records(input, &outcome.forest.records())?;
        tracing::info!("Wrote {} changed row(s) to {}", outcome.patch.len(), input.display());
    }

    match output_format {
        OutputFormat::Json => output_success(&output_format, message, json!({ "patch": outcome.patch })),
        OutputFormat::Text => {
            println!("✓ {}", message);
            if outcome.patch.is_empty() {
                println!("No rows changed");
            }
            for row in &outcome.patch {
                match row.parent_id {
                    Some(parent) => println!("  #{} -> order {} under #{}", row.id, row.order, parent),
                    None => println!("  #{} -> order {} at root", row.id, row.order),
                }
            }
            Ok(())
        }
    }
}
