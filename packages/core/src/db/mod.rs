//! Persistence Layer
//!
//! This module holds the contract between the engine and the host's storage:
//!
//! - `OrderStore` - async trait the coordinator writes through
//! - `InMemoryOrderStore` - map-backed store with failure injection
//! - `MutationEvent` - broadcast notifications about optimistic mutations
//!
//! The engine owns no schema, wire protocol or file format; hosts adapt their
//! own tables behind `OrderStore`.

mod error;
pub mod events;
mod memory_store;
mod order_store;

pub use error::PersistenceError;
pub use events::{MutationEvent, MutationId, MutationState};
pub use memory_store::{InMemoryOrderStore, PersistedOrder};
pub use order_store::OrderStore;
