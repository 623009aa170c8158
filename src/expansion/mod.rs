pub mod store;

pub use store::{ExpansionError, ExpansionStore, JsonFileExpansionStore, MemoryExpansionStore};

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::tree::{Forest, NodeId};

pub const DEFAULT_STORAGE_KEY: &str = "sidebar-expanded-groups";

/// Result of merging persisted state with the active path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub expanded: BTreeSet<NodeId>,
    /// Persisted ids that no longer exist in the forest.
    pub stale: Vec<NodeId>,
}

/// Per-session set of expanded group ids, persisted as a JSON array.
pub struct ExpansionStateManager<S: ExpansionStore> {
    store: S,
    key: String,
    expanded: BTreeSet<NodeId>,
}

impl<S: ExpansionStore> ExpansionStateManager<S> {
    /// Load the persisted set. Unreadable or malformed state starts empty.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let expanded = match store.load(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<NodeId>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!("Discarding malformed expansion state under '{}': {}", key, e);
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!("Could not read expansion state under '{}': {}", key, e);
                BTreeSet::new()
            }
        };
        Self { store, key, expanded }
    }

    pub fn expanded(&self) -> &BTreeSet<NodeId> {
        &self.expanded
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Flip `id` and persist. Returns whether it is now expanded. A failed
    /// save leaves the in-memory set unchanged.
    pub fn toggle(&mut self, id: NodeId) -> Result<bool, ExpansionError> {
        let mut next = self.expanded.clone();
        let now_expanded = if next.remove(&id) {
            false
        } else {
            next.insert(id);
            true
        };
        self.replace(next)?;
        Ok(now_expanded)
    }

    /// Union the persisted set with `ancestor_ids`, drop ids missing from the
    /// forest and write the result back.
    pub fn reconcile(
        &mut self,
        forest: &Forest,
        ancestor_ids: &HashSet<NodeId>,
    ) -> Result<ReconcileOutcome, ExpansionError> {
        let stale: Vec<NodeId> = self.expanded.iter().copied().filter(|&id| !forest.contains(id)).collect();
        if !stale.is_empty() {
            tracing::debug!("Dropping {} stale expansion ids: {:?}", stale.len(), stale);
        }

        let mut next: BTreeSet<NodeId> = self.expanded.iter().copied().filter(|&id| forest.contains(id)).collect();
        next.extend(ancestor_ids.iter().copied().filter(|&id| forest.contains(id)));
        self.replace(next)?;

        Ok(ReconcileOutcome { expanded: self.expanded.clone(), stale })
    }

    // Save `next` first; memory only follows a successful write.
    fn replace(&mut self, next: BTreeSet<NodeId>) -> Result<(), ExpansionError> {
        let ids: Vec<NodeId> = next.iter().copied().collect();
        let raw = serde_json::to_string(&ids)?;
        self.store.save(&self.key, &raw)?;
        self.expanded = next;
        Ok(())
    }
}
