//! Mutation Events
//!
//! The coordinator broadcasts one event per state transition of an optimistic
//! mutation, allowing other parts of the host (sync indicators, audit logs)
//! to follow persistence without coupling to the coordinator.
//!
//! # Event Flow
//!
//! 1. `Applied` - local state updated and re-rendered, persistence started
//! 2. Exactly one of:
//!    - `Confirmed` - every write succeeded
//!    - `RolledBack` - at least one write failed; local state restored

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier correlating log lines and events of one mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationId(Uuid);

impl MutationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MutationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one optimistic mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationState {
    Planned,
    AppliedLocally,
    PersistConfirmed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MutationEvent {
    #[serde(rename_all = "camelCase")]
    Applied {
        mutation_id: MutationId,
        node_ids: Vec<String>,
    },
    #[serde(rename_all = "camelCase")]
    Confirmed { mutation_id: MutationId },
    #[serde(rename_all = "camelCase")]
    RolledBack {
        mutation_id: MutationId,
        failed_ids: Vec<String>,
        at: DateTime<Utc>,
    },
}

impl MutationEvent {
    pub fn mutation_id(&self) -> MutationId {
        match self {
            Self::Applied { mutation_id, .. }
            | Self::Confirmed { mutation_id }
            | Self::RolledBack { mutation_id, .. } => *mutation_id,
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::Applied { .. } => "mutation:applied",
            Self::Confirmed { .. } => "mutation:confirmed",
            Self::RolledBack { .. } => "mutation:rolled-back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_ids_are_unique() {
        assert_ne!(MutationId::new(), MutationId::new());
    }

    /// The frontend sync indicator matches on `type` and camelCase fields.
    #[test]
    fn test_rolled_back_serialization_contract() {
        let id = MutationId::new();
        let event = MutationEvent::RolledBack {
            mutation_id: id,
            failed_ids: vec!["A".to_string()],
            at: Utc::now(),
        };
        let parsed: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(parsed["type"], "rolledBack");
        assert_eq!(parsed["failedIds"][0], "A");
        assert_eq!(parsed["mutationId"], id.to_string());
        assert_eq!(event.event_type(), "mutation:rolled-back");
    }
}
