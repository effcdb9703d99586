//! Treedrop Core
//!
//! Hierarchical drag-and-drop reordering engine: given a flat collection of
//! nodes linked by parent keys, it classifies pointer positions into drop
//! zones, decides which drops are legal, computes the renumbered sibling
//! group for a move and applies it optimistically with rollback on
//! persistence failure.
//!
//! # Architecture
//!
//! - **Capability interface**: every node shape implements `HierarchyNode`;
//!   nothing below the models layer reads domain field names
//! - **Snapshot reads**: `TreeModel` borrows the current collection and is
//!   rebuilt per event, so decisions never see stale structure
//! - **Full-group renumbering**: each move re-emits the whole destination
//!   group with a fixed stride
//! - **Optimistic writes**: local state first, persistence second, exact
//!   restore on any failure
//!
//! # Modules
//!
//! - [`models`] - Node shapes and the tree model
//! - [`operations`] - Geometry, drag session and reorder planning
//! - [`services`] - Optimistic mutation coordinator and the service facade
//! - [`db`] - Persistence contract and in-memory store
//! - [`config`] - Engine tunables

pub mod config;
pub mod db;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig};
pub use models::{normalize_key, HierarchyNode, NodeKind, SideItem, TaskItem, TreeModel};
pub use operations::{
    DragController, DragDropError, DragState, DropEvent, DropPlacement, DropZone, HoverState,
    MoveRequest, OrderUpdate, PointerEvent, ReorderPlanner, TargetCandidate,
};
pub use services::{DragDropService, DragDropServiceError, MutationCoordinator, NodeCollection};
