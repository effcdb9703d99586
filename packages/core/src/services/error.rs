//! Service Layer Error Types

use crate::config::ConfigError;
use crate::operations::DragDropError;
use thiserror::Error;

/// Errors surfaced by [`DragDropService`](crate::services::DragDropService)
#[derive(Error, Debug)]
pub enum DragDropServiceError {
    /// Configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Drag or planning failure
    #[error(transparent)]
    DragDrop(#[from] DragDropError),

    /// Initial node collection contains a parent cycle
    #[error("Node collection is not a tree: {0}")]
    MalformedTree(DragDropError),
}

impl DragDropServiceError {
    /// Underlying drag error, if any
    pub fn as_drag_drop(&self) -> Option<&DragDropError> {
        match self {
            Self::DragDrop(err) | Self::MalformedTree(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}
