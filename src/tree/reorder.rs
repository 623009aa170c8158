use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::error::TreeError;
use super::forest::Forest;
use super::node::{NodeId, OrderPatch};

/// A drag-and-drop style reorder request.
///
/// `new_index` is the 0-based position in the destination sibling list after
/// the node has been taken out of its old place. Indexes past the end append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReorderOperation {
    MoveWithinSiblings {
        node_id: NodeId,
        new_index: usize,
    },
    MoveAcrossParents {
        node_id: NodeId,
        new_parent_id: Option<NodeId>,
        new_index: usize,
    },
}

impl ReorderOperation {
    pub fn node_id(&self) -> NodeId {
        match self {
            ReorderOperation::MoveWithinSiblings { node_id, .. } => *node_id,
            ReorderOperation::MoveAcrossParents { node_id, .. } => *node_id,
        }
    }
}

/// New forest plus the rows that have to be written back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderOutcome {
    pub forest: Forest,
    pub patch: Vec<OrderPatch>,
}

/// One entry of a whole-tree layout as sent by the menu editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub id: NodeId,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub children: Vec<OrderEntry>,
}

/// Apply `operation` to a copy of `forest`. The input is never modified; on
/// error the caller still holds the untouched original.
pub fn reorder(forest: &Forest, operation: &ReorderOperation) -> Result<ReorderOutcome, TreeError> {
    let node_id = operation.node_id();
    if !forest.contains(node_id) {
        return Err(TreeError::NodeNotFound(node_id));
    }
    let old_parent = forest.parent_of(node_id);

    let (new_parent, new_index) = match *operation {
        ReorderOperation::MoveWithinSiblings { new_index, .. } => (old_parent, new_index),
        ReorderOperation::MoveAcrossParents { new_parent_id, new_index, .. } => {
            validate_parent(forest, node_id, new_parent_id)?;
            (new_parent_id, new_index)
        }
    };

    let mut next = forest.clone();
    if let Some(list) = next.siblings_mut(old_parent) {
        list.retain(|&id| id != node_id);
    }
    match next.siblings_mut(new_parent) {
        Some(list) => {
            let at = new_index.min(list.len());
            list.insert(at, node_id);
        }
        None => return Err(TreeError::NodeNotFound(new_parent.unwrap_or(node_id))),
    }
    if let Some(node) = next.node_mut(node_id) {
        node.parent = new_parent;
    }

    let mut touched = vec![new_parent];
    if old_parent != new_parent {
        touched.push(old_parent);
    }
    let patch = renumber(forest, &mut next, &touched);

    tracing::debug!(
        "Reorder of node {} under {:?} at {} produced {} patch rows",
        node_id,
        new_parent,
        new_index,
        patch.len()
    );
    Ok(ReorderOutcome { forest: next, patch })
}

/// Reject parents that would put `node_id` inside its own subtree.
pub fn validate_parent(forest: &Forest, node_id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
    let Some(parent) = new_parent else {
        return Ok(());
    };
    if parent == node_id {
        return Err(TreeError::invalid_move(format!("node {} cannot be its own parent", node_id)));
    }
    if !forest.contains(parent) {
        return Err(TreeError::NodeNotFound(parent));
    }
    if forest.is_descendant(parent, node_id) {
        return Err(TreeError::invalid_move(format!(
            "node {} cannot move under its descendant {}",
            node_id, parent
        )));
    }
    Ok(())
}

/// Renumber every sibling list to 1..n and link orphans to the root level.
pub fn normalize(forest: &Forest) -> ReorderOutcome {
    let mut next = forest.clone();
    let mut parents: Vec<Option<NodeId>> = vec![None];
    parents.extend(forest.preorder().into_iter().filter(|&id| !forest.children(id).is_empty()).map(Some));
    let patch = renumber(forest, &mut next, &parents);
    next.clear_orphans();
    ReorderOutcome { forest: next, patch }
}

/// Apply a whole-tree layout `[{id, order, children}]`.
///
/// Entries are ranked by `order` within their list (ties keep payload
/// position). Nodes missing from the payload keep their parent and follow the
/// listed siblings in their previous relative order.
pub fn apply_nested_order(forest: &Forest, payload: &[OrderEntry]) -> Result<ReorderOutcome, TreeError> {
    let mut placement: HashMap<Option<NodeId>, Vec<NodeId>> = HashMap::new();
    let mut listed: HashSet<NodeId> = HashSet::new();
    collect_entries(forest, None, payload, &mut placement, &mut listed)?;

    // Unlisted nodes stay with their current parent.
    for id in forest.preorder() {
        if !listed.contains(&id) {
            placement.entry(forest.parent_of(id)).or_default().push(id);
        }
    }

    let mut next = forest.clone();
    let mut lists: Vec<Option<NodeId>> = vec![None];
    for id in forest.preorder() {
        if let Some(node) = next.node_mut(id) {
            node.children.clear();
        }
        lists.push(Some(id));
    }
    if let Some(roots) = next.siblings_mut(None) {
        roots.clear();
    }
    for (parent, ids) in &placement {
        for &id in ids {
            if let Some(node) = next.node_mut(id) {
                node.parent = *parent;
            }
        }
        if let Some(list) = next.siblings_mut(*parent) {
            list.extend(ids.iter().copied());
        }
    }

    let patch = renumber(forest, &mut next, &lists);
    tracing::debug!("Nested order payload with {} listed nodes produced {} patch rows", listed.len(), patch.len());
    Ok(ReorderOutcome { forest: next, patch })
}

fn collect_entries(
    forest: &Forest,
    parent: Option<NodeId>,
    entries: &[OrderEntry],
    placement: &mut HashMap<Option<NodeId>, Vec<NodeId>>,
    listed: &mut HashSet<NodeId>,
) -> Result<(), TreeError> {
    let mut ranked: Vec<&OrderEntry> = entries.iter().collect();
    ranked.sort_by_key(|entry| entry.order);
    for entry in ranked {
        if !forest.contains(entry.id) {
            return Err(TreeError::NodeNotFound(entry.id));
        }
        if !listed.insert(entry.id) {
            return Err(TreeError::invalid_move(format!("node {} appears more than once", entry.id)));
        }
        placement.entry(parent).or_default().push(entry.id);
        collect_entries(forest, Some(entry.id), &entry.children, placement, listed)?;
    }
    Ok(())
}

/// Assign contiguous 1-based orders to the given sibling lists of `next` and
/// collect the rows that differ from `original`.
fn renumber(original: &Forest, next: &mut Forest, parents: &[Option<NodeId>]) -> Vec<OrderPatch> {
    let mut patch = Vec::new();
    for &parent in parents {
        let ids: Vec<NodeId> = next.siblings(parent).to_vec();
        for (index, id) in ids.into_iter().enumerate() {
            let order = index as i32 + 1;
            let Some(node) = next.node_mut(id) else { continue };
            node.record.order = order;
            node.record.parent_id = parent;
            node.parent = parent;

            let changed = original
                .get(id)
                .map_or(true, |before| before.record.order != order || before.record.parent_id != parent);
            if changed {
                patch.push(OrderPatch { id, order, parent_id: parent });
            }
        }
    }
    patch
}

/// Nodes that may become the parent of `editing`: everything except the node
/// itself and its descendants, in pre-order. `None` lists every node.
pub fn parent_candidates(forest: &Forest, editing: Option<NodeId>) -> Vec<NodeId> {
    let excluded: HashSet<NodeId> = match editing {
        Some(id) => {
            let mut set: HashSet<NodeId> = forest.descendants(id).into_iter().collect();
            set.insert(id);
            set
        }
        None => HashSet::new(),
    };
    forest.preorder().into_iter().filter(|id| !excluded.contains(id)).collect()
}
