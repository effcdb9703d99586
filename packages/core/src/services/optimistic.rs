//! Optimistic Mutation Coordinator
//!
//! Applies a plan to local state immediately, persists it in the background,
//! and restores the previous positions if any write fails.
//!
//! # Lifecycle
//!
//! ```text
//! Planned ──apply──▶ AppliedLocally ──all writes ok──▶ PersistConfirmed
//!                          │
//!                          └──any write fails──▶ RolledBack
//! ```
//!
//! Snapshot, local write and the first re-render all happen synchronously
//! inside [`MutationCoordinator::apply`]; the only suspension point is the
//! store. Partial failure counts as total failure: every touched node goes
//! back to its pre-mutation position even if some rows were written.
//!
//! Overlapping mutations run independently. There is no queue and no
//! cancellation of in-flight writes.

use crate::db::{MutationEvent, MutationId, MutationState, OrderStore, PersistenceError};
use crate::models::HierarchyNode;
use crate::operations::{apply_updates, OrderUpdate};
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinError, JoinHandle};

/// Broadcast channel capacity for mutation events
const MUTATION_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Shared, synchronously readable node collection
///
/// The host's render path reads from it; only the coordinator writes to it.
/// Locks are never held across an await.
#[derive(Debug)]
pub struct NodeCollection<N> {
    inner: Arc<RwLock<Vec<N>>>,
}

impl<N> Clone for NodeCollection<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: HierarchyNode> NodeCollection<N> {
    pub fn new(nodes: Vec<N>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(nodes)),
        }
    }

    /// Run `f` against the current nodes
    pub fn read<R>(&self, f: impl FnOnce(&[N]) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with exclusive access to the nodes
    pub fn write<R>(&self, f: impl FnOnce(&mut Vec<N>) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Owned copy of the current nodes
    pub fn snapshot(&self) -> Vec<N> {
        self.read(|nodes| nodes.to_vec())
    }

    pub fn get(&self, id: &str) -> Option<N> {
        self.read(|nodes| nodes.iter().find(|n| n.node_id() == id).cloned())
    }

    /// Swap in a fresh collection, e.g. after the host refetches
    pub fn replace(&self, nodes: Vec<N>) {
        self.write(|current| *current = nodes);
    }
}

/// User-visible transient error sink
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Notifier that only logs; the default when the host supplies none
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Result of one optimistic mutation after persistence settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Confirmed {
        mutation_id: MutationId,
        persisted: usize,
    },
    RolledBack {
        mutation_id: MutationId,
        failures: Vec<PersistenceError>,
    },
}

impl MutationOutcome {
    pub fn mutation_id(&self) -> MutationId {
        match self {
            Self::Confirmed { mutation_id, .. } | Self::RolledBack { mutation_id, .. } => {
                *mutation_id
            }
        }
    }

    pub fn state(&self) -> MutationState {
        match self {
            Self::Confirmed { .. } => MutationState::PersistConfirmed,
            Self::RolledBack { .. } => MutationState::RolledBack,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Handle to a mutation whose local half is done and whose writes are in flight
#[derive(Debug)]
pub struct PendingMutation {
    mutation_id: MutationId,
    state: watch::Receiver<MutationState>,
    handle: JoinHandle<MutationOutcome>,
}

impl PendingMutation {
    pub fn mutation_id(&self) -> MutationId {
        self.mutation_id
    }

    /// Current lifecycle state without waiting
    ///
    /// `AppliedLocally` until the writes settle, then the final state.
    pub fn state(&self) -> MutationState {
        *self.state.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for persistence to settle
    ///
    /// Dropping the handle instead does not cancel the writes.
    pub async fn wait(self) -> Result<MutationOutcome, JoinError> {
        self.handle.await
    }
}

type RenderFn = Arc<dyn Fn() + Send + Sync>;

pub struct MutationCoordinator<N: HierarchyNode> {
    nodes: NodeCollection<N>,
    store: Arc<dyn OrderStore>,
    render: RenderFn,
    notifier: Arc<dyn Notifier>,
    rollback_message: String,
    event_tx: broadcast::Sender<MutationEvent>,
}

impl<N: HierarchyNode> MutationCoordinator<N> {
    /// Create a coordinator over `nodes`
    ///
    /// `render` is invoked after every local write and after every rollback;
    /// it should redraw from `nodes`.
    pub fn new(
        nodes: NodeCollection<N>,
        store: Arc<dyn OrderStore>,
        render: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(MUTATION_EVENT_CHANNEL_CAPACITY);
        Self {
            nodes,
            store,
            render: Arc::new(render),
            notifier: Arc::new(TracingNotifier),
            rollback_message: crate::config::EngineConfig::default().rollback_message,
            event_tx,
        }
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Arc::new(notifier);
        self
    }

    pub fn with_rollback_message(mut self, message: impl Into<String>) -> Self {
        self.rollback_message = message.into();
        self
    }

    pub fn nodes(&self) -> &NodeCollection<N> {
        &self.nodes
    }

    /// Subscribe to mutation events
    ///
    /// Events sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.event_tx.subscribe()
    }

    /// Apply `updates` locally now and persist them in the background
    ///
    /// Persistence failures are handled here and reported through the
    /// returned handle and the event channel, never as an error. A failure
    /// triggers rollback, a re-render and one notification.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn apply(&self, updates: Vec<OrderUpdate>) -> PendingMutation {
        let mutation_id = MutationId::new();
        let (state_tx, state_rx) = watch::channel(MutationState::Planned);
        let touched: HashSet<&str> = updates.iter().map(|u| u.id.as_str()).collect();

        let saved: Vec<N> = self.nodes.read(|nodes| {
            nodes
                .iter()
                .filter(|n| touched.contains(n.node_id()))
                .cloned()
                .collect()
        });

        let applied = self.nodes.write(|nodes| apply_updates(nodes, &updates));
        (self.render)();
        state_tx.send_replace(MutationState::AppliedLocally);

        tracing::debug!(
            "Mutation {} applied locally ({} of {} nodes)",
            mutation_id,
            applied,
            updates.len()
        );
        let _ = self.event_tx.send(MutationEvent::Applied {
            mutation_id,
            node_ids: updates.iter().map(|u| u.id.clone()).collect(),
        });

        let store = Arc::clone(&self.store);
        let nodes = self.nodes.clone();
        let render = Arc::clone(&self.render);
        let notifier = Arc::clone(&self.notifier);
        let rollback_message = self.rollback_message.clone();
        let event_tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            let writes = updates.iter().map(|u| {
                store.update_order(u.kind, &u.id, u.order_index, u.parent_id.as_deref())
            });
            let failures: Vec<PersistenceError> = join_all(writes)
                .await
                .into_iter()
                .filter_map(Result::err)
                .collect();

            if failures.is_empty() {
                tracing::info!("Mutation {} persisted ({} nodes)", mutation_id, updates.len());
                state_tx.send_replace(MutationState::PersistConfirmed);
                let _ = event_tx.send(MutationEvent::Confirmed { mutation_id });
                return MutationOutcome::Confirmed {
                    mutation_id,
                    persisted: updates.len(),
                };
            }

            let failed_ids: Vec<String> =
                failures.iter().map(|e| e.node_id().to_string()).collect();
            tracing::warn!(
                "Mutation {} failed for {:?}; rolling back {} nodes",
                mutation_id,
                failed_ids,
                saved.len()
            );

            nodes.write(|current| restore(current, &saved));
            render();
            notifier.notify(&rollback_message);
            state_tx.send_replace(MutationState::RolledBack);

            let _ = event_tx.send(MutationEvent::RolledBack {
                mutation_id,
                failed_ids,
                at: Utc::now(),
            });
            MutationOutcome::RolledBack {
                mutation_id,
                failures,
            }
        });

        PendingMutation {
            mutation_id,
            state: state_rx,
            handle,
        }
    }
}

/// Put every saved node back where it was
fn restore<N: HierarchyNode>(current: &mut [N], saved: &[N]) {
    for node in current.iter_mut() {
        if let Some(before) = saved.iter().find(|s| s.node_id() == node.node_id()) {
            node.restore_position(before);
        }
    }
}
