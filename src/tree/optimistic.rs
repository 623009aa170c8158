use std::fmt::Display;
use std::future::Future;

use super::error::TreeError;
use super::forest::Forest;
use super::node::OrderPatch;
use super::reorder::{reorder, ReorderOperation};

/// Optimistic-then-confirm wrapper around the order mutator.
///
/// `current` is what the view shows; `confirmed` is the last state the store
/// acknowledged. A failed write puts `current` back to `confirmed`.
#[derive(Debug, Clone)]
pub struct OptimisticForest {
    confirmed: Forest,
    current: Forest,
}

impl OptimisticForest {
    pub fn new(forest: Forest) -> Self {
        Self { confirmed: forest.clone(), current: forest }
    }

    pub fn current(&self) -> &Forest {
        &self.current
    }

    pub fn confirmed(&self) -> &Forest {
        &self.confirmed
    }

    pub fn has_pending(&self) -> bool {
        self.current != self.confirmed
    }

    /// Apply locally and return the patch to send. Rejected moves leave both
    /// states as they were.
    pub fn apply(&mut self, operation: &ReorderOperation) -> Result<Vec<OrderPatch>, TreeError> {
        let outcome = reorder(&self.current, operation)?;
        self.current = outcome.forest;
        Ok(outcome.patch)
    }

    pub fn confirm(&mut self) {
        self.confirmed = self.current.clone();
    }

    pub fn rollback(&mut self) {
        tracing::debug!("Rolling back optimistic forest to last confirmed state");
        self.current = self.confirmed.clone();
    }

    /// Apply, persist through `persist`, then confirm or roll back.
    pub async fn commit<F, Fut, E>(
        &mut self,
        operation: &ReorderOperation,
        persist: F,
    ) -> Result<Vec<OrderPatch>, TreeError>
    where
        F: FnOnce(Vec<OrderPatch>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let patch = self.apply(operation)?;
        if patch.is_empty() {
            self.confirm();
            return Ok(patch);
        }
        match persist(patch.clone()).await {
            Ok(()) => {
                self.confirm();
                Ok(patch)
            }
            Err(e) => {
                tracing::warn!("Persisting {} order rows failed: {}", patch.len(), e);
                self.rollback();
                Err(TreeError::PersistenceFailure(e.to_string()))
            }
        }
    }
}
