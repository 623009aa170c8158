pub mod render;
pub mod reorder;
