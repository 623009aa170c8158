pub mod active;
pub mod error;
pub mod forest;
pub mod node;
pub mod optimistic;
pub mod permission;
pub mod render;
pub mod reorder;

pub use active::{resolve_active, resolve_active_node, route_matches, ActivePath};
pub use error::TreeError;
pub use forest::{build_forest, Forest, TreeNode};
pub use node::{FlatRecord, NodeId, NodePayload, OrderPatch, TreeKind};
pub use optimistic::OptimisticForest;
pub use permission::{filter_permitted, AllowAll, PermissionGate, PermissionSet};
pub use render::{render_forest, RenderNode, RenderOptions};
pub use reorder::{
    apply_nested_order, normalize, parent_candidates, reorder, validate_parent, OrderEntry, ReorderOperation,
    ReorderOutcome,
};
