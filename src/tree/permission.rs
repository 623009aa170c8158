use std::collections::{HashMap, HashSet};

use super::node::{FlatRecord, NodeId};

/// Permission check supplied by the auth collaborator.
pub trait PermissionGate {
    /// `None` means the node carries no requirement.
    fn has_permission(&self, key: Option<&str>) -> bool;
}

/// Grants everything. Used by admin views that list the full tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn has_permission(&self, _key: Option<&str>) -> bool {
        true
    }
}

/// A fixed set of granted permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: HashSet<String>,
}

impl PermissionSet {
    pub fn new<I, S>(granted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { granted: granted.into_iter().map(Into::into).collect() }
    }

    /// Parse a comma separated list, ignoring blanks.
    pub fn from_csv(value: &str) -> Self {
        Self::new(value.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

impl PermissionGate for PermissionSet {
    fn has_permission(&self, key: Option<&str>) -> bool {
        key.map_or(true, |k| self.granted.contains(k))
    }
}

impl<F> PermissionGate for F
where
    F: Fn(Option<&str>) -> bool,
{
    fn has_permission(&self, key: Option<&str>) -> bool {
        self(key)
    }
}

/// Drop records the gate denies, together with everything beneath them.
///
/// Runs on flat records before the forest is built so the builder stays
/// permission-agnostic. Parent links that do not resolve are left alone here.
pub fn filter_permitted(records: Vec<FlatRecord>, gate: &dyn PermissionGate) -> Vec<FlatRecord> {
    // First record wins for a repeated id, matching the forest builder
    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::with_capacity(records.len());
    for record in &records {
        parents.entry(record.id).or_insert(record.parent_id);
    }
    // Unguarded records are never asked about
    let denied: HashSet<NodeId> = records
        .iter()
        .filter(|r| r.permission_key().map_or(false, |key| !gate.has_permission(Some(key))))
        .map(|r| r.id)
        .collect();
    if denied.is_empty() {
        return records;
    }

    let mut excluded: HashMap<NodeId, bool> = HashMap::with_capacity(records.len());
    for record in &records {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(record.id);
        let mut verdict = false;
        while let Some(id) = current {
            if let Some(&known) = excluded.get(&id) {
                verdict = known;
                break;
            }
            if !visited.insert(id) {
                break;
            }
            if denied.contains(&id) {
                verdict = true;
                chain.push(id);
                break;
            }
            chain.push(id);
            current = parents.get(&id).copied().flatten();
        }
        for id in chain {
            excluded.insert(id, verdict);
        }
    }

    let before = records.len();
    let kept: Vec<FlatRecord> = records
        .into_iter()
        .filter(|r| !excluded.get(&r.id).copied().unwrap_or(false))
        .collect();
    tracing::debug!("Permission pre-pass kept {} of {} records", kept.len(), before);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<FlatRecord> {
        vec![
            FlatRecord::menu(1, None, 1, "Dashboard").with_route("/dashboard"),
            FlatRecord::menu(2, None, 2, "Admin").with_permission("admin.view"),
            FlatRecord::menu(3, Some(2), 1, "Users").with_route("/users"),
            FlatRecord::menu(4, Some(3), 1, "Invite").with_route("/users/invite"),
            FlatRecord::menu(5, None, 3, "Backups").with_route("/backup").with_permission("backup.view"),
        ]
    }

    fn ids(records: &[FlatRecord]) -> Vec<NodeId> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn allow_all_keeps_everything() {
        assert_eq!(ids(&filter_permitted(records(), &AllowAll)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn denied_node_takes_its_subtree_along() {
        let gate = PermissionSet::new(["backup.view"]);
        assert_eq!(ids(&filter_permitted(records(), &gate)), vec![1, 5]);
    }

    #[test]
    fn granted_permissions_keep_nodes() {
        let gate = PermissionSet::from_csv("admin.view, backup.view,");
        assert_eq!(gate.len(), 2);
        assert_eq!(ids(&filter_permitted(records(), &gate)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn closure_gate() {
        let gate = |key: Option<&str>| key != Some("admin.view");
        assert_eq!(ids(&filter_permitted(records(), &gate)), vec![1, 5]);
    }

    #[test]
    fn parent_cycles_do_not_hang() {
        let input = vec![
            FlatRecord::menu(1, Some(2), 1, "a"),
            FlatRecord::menu(2, Some(1), 1, "b"),
            FlatRecord::menu(3, None, 1, "c").with_permission("nope"),
        ];
        assert_eq!(ids(&filter_permitted(input, &PermissionSet::default())), vec![1, 2]);
    }

    #[test]
    fn unguarded_records_skip_the_gate() {
        let input = vec![
            FlatRecord::menu(1, None, 1, "Dashboard").with_route("/dashboard"),
            FlatRecord::menu(2, None, 2, "Admin").with_permission("admin.view"),
            FlatRecord::menu(3, Some(1), 1, "Overview").with_route("/dashboard/overview"),
        ];
        let gate = |key: Option<&str>| key == Some("never");
        assert_eq!(ids(&filter_permitted(input, &gate)), vec![1, 3]);
    }

    #[test]
    fn repeated_id_uses_first_parent_link() {
        let input = vec![
            FlatRecord::menu(1, None, 1, "Admin").with_permission("admin.view"),
            FlatRecord::menu(2, None, 2, "Reports"),
            FlatRecord::menu(3, Some(2), 1, "Sales"),
            FlatRecord::menu(3, Some(1), 1, "Sales copy"),
        ];
        let kept = filter_permitted(input, &PermissionSet::default());
        assert!(kept.iter().any(|r| r.id == 3), "first record links 3 under the permitted group");
        assert!(!kept.iter().any(|r| r.id == 1));
    }
}
