//! OrderStore Trait - Persistence Abstraction
//!
//! The drag engine never talks to a database directly. Hosts implement
//! `OrderStore` over whatever backs their rows (a hosted Postgres table per
//! kind, a local file, an in-memory map in tests) and hand it to the
//! coordinator.
//!
//! # Design Decisions
//!
//! 1. **Async**: writes cross the network in the host app, so every call is a
//!    suspension point
//! 2. **One row per call**: the coordinator issues one call per updated node
//!    and runs them concurrently; rows are independent
//! 3. **Kind-aware**: each kind usually lives in its own table, so the kind
//!    travels with the id
//!
//! # Examples
//!
//! ```rust,no_run
//! use treedrop_core::db::{InMemoryOrderStore, OrderStore};
//! use treedrop_core::models::NodeKind;
//!
//! # async fn example() -> Result<(), treedrop_core::db::PersistenceError> {
//! let store = InMemoryOrderStore::new();
//! store.update_order(NodeKind::Note, "note-1", 2000, Some("folder-a")).await?;
//! # Ok(())
//! # }
//! ```

use crate::db::PersistenceError;
use crate::models::NodeKind;
use async_trait::async_trait;

/// Persistence collaborator for order/parent writes
///
/// Implementations must be `Send + Sync`; the coordinator shares one store
/// across every in-flight mutation.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a node's new position
    ///
    /// # Arguments
    ///
    /// * `kind` - Node kind, used to route the write to the right table
    /// * `id` - Node to update
    /// * `order_index` - New sibling position
    /// * `parent_key` - New container, `None` for root level
    ///
    /// # Errors
    ///
    /// Returns a `PersistenceError` naming `id` when the write is rejected or
    /// the store cannot be reached.
    async fn update_order(
        &self,
        kind: NodeKind,
        id: &str,
        order_index: i64,
        parent_key: Option<&str>,
    ) -> Result<(), PersistenceError>;
}
