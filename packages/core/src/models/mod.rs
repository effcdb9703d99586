//! Data Models
//!
//! This module contains the node shapes the drag engine rearranges:
//!
//! - `HierarchyNode` - capability interface every domain type implements
//! - `SideItem` - folders and the entries filed under them
//! - `TaskItem` - tasks nested under other tasks
//! - `TreeModel` - borrowed snapshot answering ancestry and sibling queries
//!
//! Nodes are created and owned by the host application's storage layer. The
//! engine only rewrites their container key and order index.

mod hierarchy;
mod side_item;
mod task_item;
mod tree;

pub use hierarchy::{normalize_key, HierarchyNode, NodeKind};
pub use side_item::SideItem;
pub use task_item::TaskItem;
pub use tree::TreeModel;
