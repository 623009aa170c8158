use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::node::{FlatRecord, NodeId};

/// A node inside the arena. `parent` is the structural parent after orphan
/// and cycle recovery, which can differ from `record.parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub record: FlatRecord,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    pub fn id(&self) -> NodeId {
        self.record.id
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Arena of nodes keyed by id with a root list acting as the forest view.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Forest {
    nodes: HashMap<NodeId, TreeNode>,
    roots: Vec<NodeId>,
    orphans: Vec<NodeId>,
}

/// Build a forest from flat records. See [`Forest::build`].
pub fn build_forest(records: impl IntoIterator<Item = FlatRecord>) -> Forest {
    Forest::build(records)
}

impl Forest {
    /// Link flat records into a forest.
    ///
    /// Every distinct id ends up reachable from exactly one root. Records whose
    /// `parent_id` does not resolve, points at themselves, or closes a cycle are
    /// promoted to roots and listed in [`Forest::orphans`]. Siblings are ordered
    /// by `(order, id)`. When an id repeats, the first record wins.
    pub fn build(records: impl IntoIterator<Item = FlatRecord>) -> Self {
        let records = records.into_iter();
        let mut nodes: HashMap<NodeId, TreeNode> = HashMap::with_capacity(records.size_hint().0);
        let mut sequence: Vec<NodeId> = Vec::with_capacity(records.size_hint().0);

        // Index pass
        for record in records {
            let id = record.id;
            if nodes.contains_key(&id) {
                tracing::warn!("Duplicate node id {} in flat input - keeping the first record", id);
                continue;
            }
            nodes.insert(id, TreeNode { record, parent: None, children: Vec::new() });
            sequence.push(id);
        }

        // Link pass
        let mut roots = Vec::new();
        let mut orphans = Vec::new();
        for &id in &sequence {
            let parent_id = nodes[&id].record.parent_id;
            match parent_id {
                Some(parent) if parent != id && nodes.contains_key(&parent) => {
                    if let Some(node) = nodes.get_mut(&id) {
                        node.parent = Some(parent);
                    }
                    if let Some(parent_node) = nodes.get_mut(&parent) {
                        parent_node.children.push(id);
                    }
                }
                Some(parent) => {
                    tracing::warn!("Node {} references missing parent {} - treating as root", id, parent);
                    orphans.push(id);
                    roots.push(id);
                }
                None => roots.push(id),
            }
        }

        let mut forest = Forest { nodes, roots, orphans };
        forest.break_cycles(&sequence);
        forest.sort_siblings();
        forest
    }

    /// Nodes on a parent cycle are unreachable from any root after linking.
    /// Detach one member of each cycle and make it a root.
    fn break_cycles(&mut self, sequence: &[NodeId]) {
        let mut reachable: HashSet<NodeId> = HashSet::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.clone();
        self.mark_reachable(&mut stack, &mut reachable);
        if reachable.len() == self.nodes.len() {
            return;
        }

        for &start in sequence {
            if reachable.contains(&start) {
                continue;
            }
            // Walk up until a node repeats; that node sits on the cycle.
            let mut seen = HashSet::new();
            let mut current = start;
            while seen.insert(current) {
                match self.nodes[&current].parent {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            let entry = current;
            if let Some(old_parent) = self.nodes[&entry].parent {
                if let Some(parent_node) = self.nodes.get_mut(&old_parent) {
                    parent_node.children.retain(|&c| c != entry);
                }
            }
            if let Some(node) = self.nodes.get_mut(&entry) {
                node.parent = None;
            }
            tracing::warn!("Node {} closes a parent cycle - treating as root", entry);
            self.roots.push(entry);
            self.orphans.push(entry);
            stack.push(entry);
            self.mark_reachable(&mut stack, &mut reachable);
        }
    }

    fn mark_reachable(&self, stack: &mut Vec<NodeId>, reachable: &mut HashSet<NodeId>) {
        while let Some(id) = stack.pop() {
            if reachable.insert(id) {
                stack.extend(self.children(id).iter().copied());
            }
        }
    }

    fn sort_siblings(&mut self) {
        let keys: HashMap<NodeId, (i32, NodeId)> = self
            .nodes
            .iter()
            .map(|(&id, node)| (id, (node.record.order, id)))
            .collect();
        self.roots.sort_by_key(|id| keys[id]);
        for node in self.nodes.values_mut() {
            node.children.sort_by_key(|id| keys[id]);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Ids whose stored parent reference could not be honoured.
    pub fn orphans(&self) -> &[NodeId] {
        &self.orphans
    }

    pub fn ids(&self) -> HashSet<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Children of `id`, empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// The sibling list under `parent`, where `None` is the root list.
    pub fn siblings(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(id) => self.children(id),
            None => &self.roots,
        }
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent_of(parent);
        }
        out
    }

    /// Root-first path ending at `id` (breadcrumbs). Empty for unknown ids.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(id);
        path
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// All descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// True when `candidate` lies strictly below `ancestor`.
    pub fn is_descendant(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent_of(candidate);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent_of(parent);
        }
        false
    }

    /// Every id in pre-order, roots in sibling order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Flatten back into records, pre-order.
    pub fn records(&self) -> Vec<FlatRecord> {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id).map(|n| n.record.clone()))
            .collect()
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn siblings_mut(&mut self, parent: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            Some(id) => self.nodes.get_mut(&id).map(|n| &mut n.children),
            None => Some(&mut self.roots),
        }
    }

    pub(crate) fn clear_orphans(&mut self) {
        self.orphans.clear();
    }
}
