//! Drag-and-Drop Operations
//!
//! The synchronous half of the engine. Everything here runs within the UI
//! event-loop turn that delivered the pointer event:
//!
//! - [`geometry`] - cursor + bounding box → drop zone
//! - [`drag_session`] - the start/hover/drop/cancel state machine
//! - [`reorder_planner`] - pure renumbering of the destination sibling group
//!
//! Persistence and rollback live in [`crate::services`].

pub mod drag_session;
pub mod error;
pub mod geometry;
pub mod reorder_planner;

pub use drag_session::{
    DragController, DragSession, DragSnapshot, DragState, DropEvent, DropPlacement, DropRule,
    HoverState, PointerEvent,
};
pub use error::DragDropError;
pub use geometry::{classify, DropZone, GeometryClassifier, Point, Rect, TargetCandidate};
pub use reorder_planner::{apply_updates, MoveRequest, OrderUpdate, ReorderPlanner};
