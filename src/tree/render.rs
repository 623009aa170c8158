use serde::Serialize;
use std::collections::BTreeSet;

use super::active::ActivePath;
use super::forest::Forest;
use super::node::{NodeId, NodePayload};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Skip menu nodes that have neither a route nor visible children.
    pub hide_unroutable_leaves: bool,
}

impl RenderOptions {
    pub fn sidebar() -> Self {
        Self { hide_unroutable_leaves: true }
    }
}

/// Forest node annotated for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub order: i32,
    #[serde(flatten)]
    pub payload: NodePayload,
    pub depth: usize,
    pub is_group: bool,
    pub is_active: bool,
    pub is_ancestor_active: bool,
    pub is_expanded: bool,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    /// Pre-order ids of this node and everything rendered beneath it.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = vec![self.id];
        for child in &self.children {
            out.extend(child.ids());
        }
        out
    }
}

pub fn render_forest(
    forest: &Forest,
    active: &ActivePath,
    expanded: &BTreeSet<NodeId>,
    options: RenderOptions,
) -> Vec<RenderNode> {
    forest
        .roots()
        .iter()
        .filter_map(|&id| render_node(forest, id, 0, active, expanded, options))
        .collect()
}

fn render_node(
    forest: &Forest,
    id: NodeId,
    depth: usize,
    active: &ActivePath,
    expanded: &BTreeSet<NodeId>,
    options: RenderOptions,
) -> Option<RenderNode> {
    let node = forest.get(id)?;
    let children: Vec<RenderNode> = node
        .children
        .iter()
        .filter_map(|&child| render_node(forest, child, depth + 1, active, expanded, options))
        .collect();

    let is_group = !children.is_empty();
    let is_menu = matches!(node.record.payload, NodePayload::Menu { .. });
    if options.hide_unroutable_leaves && is_menu && !is_group && node.record.route().is_none() {
        return None;
    }

    Some(RenderNode {
        id,
        parent_id: node.parent,
        order: node.record.order,
        payload: node.record.payload.clone(),
        depth,
        is_group,
        is_active: active.is_active(id),
        is_ancestor_active: active.is_ancestor_active(id),
        is_expanded: is_group && expanded.contains(&id),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::active::resolve_active;
    use crate::tree::forest::build_forest;
    use crate::tree::node::FlatRecord;

    fn forest() -> Forest {
        build_forest(vec![
            FlatRecord::menu(1, None, 1, "Dashboard").with_route("/dashboard"),
            FlatRecord::menu(2, None, 2, "Storage"),
            FlatRecord::menu(3, Some(2), 1, "Files").with_route("/files"),
            FlatRecord::menu(4, None, 3, "Empty group"),
            FlatRecord::menu(5, Some(4), 1, "Placeholder"),
        ])
    }

    #[test]
    fn annotates_active_and_expanded() {
        let forest = forest();
        let active = resolve_active(&forest, "/files/7");
        let expanded = BTreeSet::from([2, 3]);
        let tree = render_forest(&forest, &active, &expanded, RenderOptions::default());

        let storage = &tree[1];
        assert_eq!(storage.id, 2);
        assert!(storage.is_group);
        assert!(storage.is_ancestor_active);
        assert!(!storage.is_active);
        assert!(storage.is_expanded);

        let files = &storage.children[0];
        assert_eq!(files.depth, 1);
        assert!(files.is_active);
        // leaves are never expanded
        assert!(!files.is_expanded);
    }

    #[test]
    fn sidebar_hides_routeless_leaves_and_empty_groups() {
        let forest = forest();
        let tree = render_forest(&forest, &ActivePath::default(), &BTreeSet::new(), RenderOptions::sidebar());
        let ids: Vec<NodeId> = tree.iter().flat_map(|n| n.ids()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let all = render_forest(&forest, &ActivePath::default(), &BTreeSet::new(), RenderOptions::default());
        let ids: Vec<NodeId> = all.iter().flat_map(|n| n.ids()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn serializes_flat_payload_fields() {
        let forest = forest();
        let tree = render_forest(&forest, &ActivePath::default(), &BTreeSet::new(), RenderOptions::default());
        let value = serde_json::to_value(&tree[0]).unwrap();
        assert_eq!(value["title"], "Dashboard");
        assert_eq!(value["kind"], "menu");
        assert_eq!(value["is_active"], false);
    }
}
