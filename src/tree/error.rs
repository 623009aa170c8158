use thiserror::Error;

use super::node::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl TreeError {
    pub fn invalid_move(message: impl Into<String>) -> Self {
        TreeError::InvalidMove(message.into())
    }
}
