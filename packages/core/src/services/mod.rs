//! Business Services
//!
//! The asynchronous half of the engine:
//!
//! - `MutationCoordinator` - optimistic apply, background persistence, rollback
//! - `DragDropService` - facade wiring controller, planner and coordinator
//!
//! Services coordinate between the synchronous operations layer and the
//! host's `OrderStore`.

pub mod drag_drop_service;
pub mod error;
pub mod optimistic;

pub use drag_drop_service::DragDropService;
pub use error::DragDropServiceError;
pub use optimistic::{
    MutationCoordinator, MutationOutcome, NodeCollection, Notifier, PendingMutation,
    TracingNotifier,
};
