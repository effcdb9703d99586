//! Persistence Error Types
//!
//! Every variant names the node whose write failed so the coordinator can log
//! and report exactly which rows were rejected.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The backing store refused the write
    #[error("Order update rejected for node '{node_id}': {reason}")]
    Rejected { node_id: String, reason: String },

    /// The backing store could not be reached
    #[error("Store unavailable while updating node '{node_id}': {reason}")]
    Unavailable { node_id: String, reason: String },
}

impl PersistenceError {
    /// Create a Rejected error
    pub fn rejected(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Create an Unavailable error
    pub fn unavailable(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Id of the node whose write failed
    pub fn node_id(&self) -> &str {
        match self {
            Self::Rejected { node_id, .. } | Self::Unavailable { node_id, .. } => node_id,
        }
    }
}
