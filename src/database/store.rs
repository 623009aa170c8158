use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::tree::{FlatRecord, OrderPatch, TreeKind};

/// Source of flat records and sink for order patches.
#[async_trait]
pub trait FlatRecordStore: Send + Sync {
    /// All records of one tree universe.
    async fn load(&self, kind: TreeKind) -> Result<Vec<FlatRecord>, DatabaseError>;

    /// Write `{id, order, parent_id}` rows back. All or nothing.
    async fn apply_patch(&self, kind: TreeKind, patch: &[OrderPatch]) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Record store held in process memory. Used by tests and DB-less runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    trees: RwLock<HashMap<TreeKind, Vec<FlatRecord>>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(menus: Vec<FlatRecord>, folders: Vec<FlatRecord>) -> Self {
        let mut trees = HashMap::new();
        trees.insert(TreeKind::Menu, menus);
        trees.insert(TreeKind::Folder, folders);
        Self { trees: RwLock::new(trees), fail_writes: AtomicBool::new(false) }
    }

    /// Make every following `apply_patch` fail, to exercise rollback paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FlatRecordStore for InMemoryStore {
    async fn load(&self, kind: TreeKind) -> Result<Vec<FlatRecord>, DatabaseError> {
        Ok(self.trees.read().await.get(&kind).cloned().unwrap_or_default())
    }

    async fn apply_patch(&self, kind: TreeKind, patch: &[OrderPatch]) -> Result<(), DatabaseError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::WriteRejected(format!("{} store is read-only", kind)));
        }

        let mut trees = self.trees.write().await;
        let records = trees.entry(kind).or_default();
        let positions: HashMap<i64, usize> = records.iter().enumerate().map(|(i, r)| (r.id, i)).collect();

        // Validate everything before touching anything
        if let Some(missing) = patch.iter().find(|row| !positions.contains_key(&row.id)) {
            return Err(DatabaseError::NotFound(format!("{} {}", kind, missing.id)));
        }
        for row in patch {
            let record = &mut records[positions[&row.id]];
            record.order = row.order;
            record.parent_id = row.parent_id;
        }
        tracing::debug!("Applied {} order rows to in-memory {} tree", patch.len(), kind);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
