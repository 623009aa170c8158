use serde::Serialize;
use std::collections::HashSet;

use super::forest::Forest;
use super::node::NodeId;

/// Result of resolving a navigation location against a forest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivePath {
    pub active_ids: HashSet<NodeId>,
    pub ancestor_ids: HashSet<NodeId>,
}

impl ActivePath {
    pub fn is_active(&self, id: NodeId) -> bool {
        self.active_ids.contains(&id)
    }

    pub fn is_ancestor_active(&self, id: NodeId) -> bool {
        self.ancestor_ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.active_ids.is_empty()
    }
}

/// Strip query string, fragment and any trailing slash (except for `/` itself).
fn normalize_path(path: &str) -> &str {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim();
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() && trimmed.starts_with('/') {
        "/"
    } else {
        stripped
    }
}

/// Segment-aware route match: equal paths, or `location` below `route`.
///
/// `/files` matches `/files` and `/files/42` but not `/files2`. The root route
/// `/` only matches `/`.
pub fn route_matches(route: &str, location: &str) -> bool {
    let route = normalize_path(route);
    let location = normalize_path(location);
    if route.is_empty() || location.is_empty() {
        return false;
    }
    if route == location {
        return true;
    }
    if route == "/" {
        return false;
    }
    location
        .strip_prefix(route)
        .map_or(false, |rest| rest.starts_with('/'))
}

/// Mark nodes whose route matches `location` as active and their proper
/// ancestors as ancestor-active.
pub fn resolve_active(forest: &Forest, location: &str) -> ActivePath {
    let mut path = ActivePath::default();
    for &root in forest.roots() {
        visit(forest, root, location, &mut path);
    }
    tracing::debug!(
        "Resolved location '{}': {} active, {} ancestor-active",
        location,
        path.active_ids.len(),
        path.ancestor_ids.len()
    );
    path
}

// Post-order: children first, then the node itself. Returns true when the
// node or anything beneath it is active.
fn visit(forest: &Forest, id: NodeId, location: &str, path: &mut ActivePath) -> bool {
    let mut below = false;
    for &child in forest.children(id) {
        if visit(forest, child, location, path) {
            below = true;
        }
    }
    if below {
        path.ancestor_ids.insert(id);
    }
    let itself = forest
        .get(id)
        .and_then(|node| node.record.route())
        .map_or(false, |route| route_matches(route, location));
    if itself {
        path.active_ids.insert(id);
    }
    itself || below
}

/// Folder navigation: the current node is active, its ancestors are expanded.
/// Unknown ids resolve to an empty path.
pub fn resolve_active_node(forest: &Forest, current: Option<NodeId>) -> ActivePath {
    let mut path = ActivePath::default();
    if let Some(id) = current.filter(|id| forest.contains(*id)) {
        path.active_ids.insert(id);
        path.ancestor_ids.extend(forest.ancestors(id));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::forest::build_forest;
    use crate::tree::node::FlatRecord;

    fn sample() -> Forest {
        build_forest(vec![
            FlatRecord::menu(1, None, 1, "Dashboard").with_route("/dashboard"),
            FlatRecord::menu(2, None, 2, "Storage"),
            FlatRecord::menu(3, Some(2), 1, "Files").with_route("/files"),
            FlatRecord::menu(4, Some(2), 2, "Files 2").with_route("/files2"),
            FlatRecord::menu(5, None, 3, "Admin"),
            FlatRecord::menu(6, Some(5), 1, "Security"),
            FlatRecord::menu(7, Some(6), 1, "Roles").with_route("/roles"),
            FlatRecord::menu(8, None, 4, "Home").with_route("/"),
        ])
    }

    #[test]
    fn segment_aware_matching() {
        assert!(route_matches("/files", "/files"));
        assert!(route_matches("/files", "/files/42"));
        assert!(!route_matches("/files", "/files2"));
        assert!(!route_matches("/file", "/files"));
        assert!(route_matches("/files/", "/files/42"));
        assert!(route_matches("/files", "/files?folder_id=3"));
        assert!(route_matches("/files", "/files/#top"));
        assert!(!route_matches("/files/42", "/files"));
    }

    #[test]
    fn root_route_only_matches_root() {
        assert!(route_matches("/", "/"));
        assert!(route_matches("/", "/?tab=1"));
        assert!(!route_matches("/", "/dashboard"));
        assert!(!route_matches("", "/dashboard"));
    }

    #[test]
    fn descendant_location_activates_route() {
        let active = resolve_active(&sample(), "/files/42");
        assert!(active.is_active(3));
        assert!(!active.is_active(4));
        assert!(active.is_ancestor_active(2));
        assert!(!active.is_active(2));
        assert_eq!(active.ancestor_ids, HashSet::from([2]));
    }

    #[test]
    fn deep_chain_marks_every_ancestor() {
        let active = resolve_active(&sample(), "/roles/edit/3");
        assert_eq!(active.active_ids, HashSet::from([7]));
        assert_eq!(active.ancestor_ids, HashSet::from([6, 5]));
    }

    #[test]
    fn unmatched_location_is_empty() {
        let active = resolve_active(&sample(), "/nowhere");
        assert!(active.is_empty());
        assert!(active.ancestor_ids.is_empty());
    }

    #[test]
    fn ancestors_are_exactly_proper_ancestors_of_active_nodes() {
        let forest = sample();
        for location in ["/files/1", "/roles", "/dashboard", "/", "/files2/x"] {
            let active = resolve_active(&forest, location);
            let expected: HashSet<NodeId> =
                active.active_ids.iter().flat_map(|&id| forest.ancestors(id)).collect();
            assert_eq!(active.ancestor_ids, expected, "location {}", location);
        }
    }

    #[test]
    fn resolution_is_idempotent() {
        let forest = sample();
        assert_eq!(resolve_active(&forest, "/files/9"), resolve_active(&forest, "/files/9"));
    }

    #[test]
    fn active_node_for_folders() {
        let forest = build_forest(vec![
            FlatRecord::folder(1, None, 1, "root"),
            FlatRecord::folder(2, Some(1), 1, "docs"),
            FlatRecord::folder(3, Some(2), 1, "2024"),
        ]);
        let active = resolve_active_node(&forest, Some(3));
        assert_eq!(active.active_ids, HashSet::from([3]));
        assert_eq!(active.ancestor_ids, HashSet::from([1, 2]));
        assert!(resolve_active_node(&forest, Some(99)).is_empty());
        assert!(resolve_active_node(&forest, None).is_empty());
    }
}
