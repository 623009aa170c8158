use anyhow::Context;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::tree::{FlatRecord, RenderNode};

/// Read flat records from a JSON or YAML file, chosen by extension
pub fn load_records(path: &Path) -> anyhow::Result<Vec<FlatRecord>> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let records = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&raw).with_context(|| format!("invalid YAML records in {}", path.display()))?
        }
        _ => serde_json::from_str(&raw).with_context(|| format!("invalid JSON records in {}", path.display()))?,
    };
    Ok(records)
}

/// Write records back in the format the file already uses
pub fn save_records(path: &Path, records: &[FlatRecord]) -> anyhow::Result<()> {
    let raw = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::to_string(records)?,
        _ => serde_json::to_string_pretty(records)?,
    };
    fs::write(path, raw).with_context(|| format!("failed to write {}", path.display()))
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": true,
                "message": message,
                "data": data
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Indented outline with active/expanded markers
pub fn format_tree(nodes: &[RenderNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &RenderNode, out: &mut String) {
    let marker = if node.is_group {
        if node.is_expanded { "▾" } else { "▸" }
    } else {
        "•"
    };
    let state = if node.is_active {
        " [active]"
    } else if node.is_ancestor_active {
        " [open path]"
    } else {
        ""
    };
    let label = match &node.payload {
        crate::tree::NodePayload::Menu { title, route, .. } => match route {
            Some(route) => format!("{} ({})", title, route),
            None => title.clone(),
        },
        crate::tree::NodePayload::Folder { name, .. } => name.clone(),
    };
    out.push_str(&format!("{}{} {} #{}{}\n", "  ".repeat(node.depth), marker, label, node.id, state));
    for child in &node.children {
        write_node(child, out);
    }
}
