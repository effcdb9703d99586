//! Error types for drag-and-drop operations
//!
//! Classification and planning errors are local: they describe situations the
//! UI should already have prevented through `can_drop` and geometry checks, so
//! callers treat them as no-ops. Persistence failures live in
//! [`crate::db::PersistenceError`] and never surface through this type.

use thiserror::Error;

/// Errors raised by the tree model, drag controller and reorder planner
///
/// # Examples
///
/// ```rust
/// use treedrop_core::operations::DragDropError;
///
/// let err = DragDropError::invalid_move("ghost");
/// assert_eq!(err.to_string(), "Invalid move: node 'ghost' not found in current snapshot");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DragDropError {
    /// Dragged node or target not present in the current snapshot
    #[error("Invalid move: node '{node_id}' not found in current snapshot")]
    InvalidMove { node_id: String },

    /// Target is the node itself or one of its descendants
    #[error("Circular reference: node '{node_id}' cannot be placed under '{target_id}'")]
    CircularReference { node_id: String, target_id: String },

    /// Nest target is a leaf that cannot hold children
    #[error("Node '{target_id}' cannot contain children")]
    NotNestCapable { target_id: String },

    /// Renumbering the destination group would overflow the order index
    #[error("Order index overflow: position {position} * stride {stride}")]
    OrderOverflow { position: usize, stride: i64 },

    /// A drag session is already active
    #[error("Drag already in progress for node '{node_id}'")]
    DragInProgress { node_id: String },

    /// Operation requires an active drag session
    #[error("No drag in progress")]
    NotDragging,
}

impl DragDropError {
    /// Create an InvalidMove error
    pub fn invalid_move(node_id: impl Into<String>) -> Self {
        Self::InvalidMove {
            node_id: node_id.into(),
        }
    }

    /// Create a CircularReference error
    pub fn circular_reference(node_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::CircularReference {
            node_id: node_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Create a NotNestCapable error
    pub fn not_nest_capable(target_id: impl Into<String>) -> Self {
        Self::NotNestCapable {
            target_id: target_id.into(),
        }
    }

    /// Create a DragInProgress error
    pub fn drag_in_progress(node_id: impl Into<String>) -> Self {
        Self::DragInProgress {
            node_id: node_id.into(),
        }
    }
}
