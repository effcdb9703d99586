//! Drag-and-drop service
//!
//! Call-site facade that owns one [`DragController`], one [`ReorderPlanner`]
//! and one [`MutationCoordinator`] over a shared [`NodeCollection`]. UI glue
//! forwards pointer events here; everything below the facade works on plain
//! snapshots.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use treedrop_core::config::EngineConfig;
//! use treedrop_core::db::InMemoryOrderStore;
//! use treedrop_core::models::{NodeKind, SideItem};
//! use treedrop_core::services::DragDropService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let nodes = vec![
//!     SideItem::new("a", NodeKind::Note, None, 0),
//!     SideItem::new("b", NodeKind::Note, None, 1000),
//! ];
//! let store = Arc::new(InMemoryOrderStore::new());
//! let mut service = DragDropService::new(EngineConfig::default(), nodes, store, || {})?;
//!
//! service.begin_drag("b")?;
//! if let Some(pending) = service.finish_drag()? {
//!     let outcome = pending.wait().await?;
//!     println!("{:?}", outcome.state());
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::EngineConfig;
use crate::db::{MutationEvent, OrderStore};
use crate::models::{normalize_key, HierarchyNode, TreeModel};
use crate::operations::{
    DragController, DragDropError, DragState, DropEvent, DropRule, DropZone, HoverState,
    OrderUpdate, PointerEvent, ReorderPlanner,
};
use crate::services::error::DragDropServiceError;
use crate::services::optimistic::{MutationCoordinator, Notifier, NodeCollection, PendingMutation};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct DragDropService<N: HierarchyNode> {
    config: EngineConfig,
    controller: DragController,
    planner: ReorderPlanner,
    coordinator: MutationCoordinator<N>,
}

impl<N: HierarchyNode> DragDropService<N> {
    /// Create a service over `nodes`
    ///
    /// # Errors
    ///
    /// - `Config` if `config` fails validation
    /// - `MalformedTree` if some parent chain in `nodes` never reaches root
    pub fn new(
        config: EngineConfig,
        nodes: Vec<N>,
        store: Arc<dyn OrderStore>,
        render: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, DragDropServiceError> {
        config.validate()?;
        TreeModel::with_max_depth(&nodes, config.max_depth)
            .validate()
            .map_err(DragDropServiceError::MalformedTree)?;

        let coordinator = MutationCoordinator::new(NodeCollection::new(nodes), store, render)
            .with_rollback_message(config.rollback_message.clone());

        tracing::debug!(
            "DragDropService ready (threshold={}, stride={})",
            config.zone_threshold,
            config.order_stride
        );

        Ok(Self {
            controller: DragController::from_config(&config),
            planner: ReorderPlanner::from_config(&config),
            coordinator,
            config,
        })
    }

    /// Register a domain rule consulted by every `can_drop`
    pub fn with_rule(mut self, rule: impl DropRule + 'static) -> Self {
        self.controller = self.controller.with_rule(rule);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.coordinator = self.coordinator.with_notifier(notifier);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn nodes(&self) -> &NodeCollection<N> {
        self.coordinator.nodes()
    }

    pub fn state(&self) -> DragState {
        self.controller.state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MutationEvent> {
        self.coordinator.subscribe()
    }

    /// Start dragging `node_id`; returns the ids it may not be dropped on
    pub fn begin_drag(&mut self, node_id: &str) -> Result<HashSet<String>, DragDropError> {
        let max_depth = self.config.max_depth;
        let controller = &mut self.controller;
        self.coordinator.nodes().read(|nodes| {
            let tree = TreeModel::with_max_depth(nodes, max_depth);
            controller
                .start(&tree, node_id)
                .map(|session| session.invalid_targets().clone())
        })
    }

    /// Resolve the hover target for a pointer move
    pub fn drag_move(&mut self, pointer: &PointerEvent) -> Result<HoverState, DragDropError> {
        let max_depth = self.config.max_depth;
        let controller = &mut self.controller;
        self.coordinator.nodes().read(|nodes| {
            let tree = TreeModel::with_max_depth(nodes, max_depth);
            controller.update_hover(&tree, pointer).cloned()
        })
    }

    pub fn can_drop(&self, target_id: &str, zone: DropZone) -> bool {
        self.coordinator.nodes().read(|nodes| {
            let tree = TreeModel::with_max_depth(nodes, self.config.max_depth);
            self.controller.can_drop(&tree, target_id, zone)
        })
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.controller.cancel()
    }

    /// End the gesture and commit its drop
    ///
    /// Returns `None` when the drop leaves every position unchanged.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime and the drop changes
    /// anything. See [`DragDropService::commit`].
    pub fn finish_drag(&mut self) -> Result<Option<PendingMutation>, DragDropError> {
        let event = self.controller.drop().ok_or(DragDropError::NotDragging)?;
        self.commit(&event)
    }

    /// Plan `event` against the current nodes and apply it optimistically
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, since persistence is
    /// spawned onto it. Planning errors and no-op drops return before that
    /// point and never panic.
    pub fn commit(&self, event: &DropEvent) -> Result<Option<PendingMutation>, DragDropError> {
        let request = event.move_request();
        let nodes = self.coordinator.nodes();

        let updates = nodes
            .read(|current| self.planner.plan(&request, current))
            .map_err(|err| {
                tracing::debug!("Drop of '{}' discarded: {}", event.dragged_id(), err);
                err
            })?;

        if nodes.read(|current| is_unchanged(current, &updates)) {
            tracing::debug!("Drop of '{}' changes nothing; skipping", event.dragged_id());
            return Ok(None);
        }

        Ok(Some(self.coordinator.apply(updates)))
    }
}

/// True when every update already matches the node it names
fn is_unchanged<N: HierarchyNode>(nodes: &[N], updates: &[OrderUpdate]) -> bool {
    let by_id: HashMap<&str, &N> = nodes.iter().map(|n| (n.node_id(), n)).collect();
    updates.iter().all(|update| {
        by_id.get(update.id.as_str()).is_some_and(|node| {
            node.order_index() == update.order_index
                && normalize_key(node.container_key()) == update.parent_id.as_deref()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryOrderStore;
    use crate::models::{NodeKind, SideItem};
    use crate::operations::{Rect, TargetCandidate};

    fn side(nodes: Vec<SideItem>) -> (DragDropService<SideItem>, Arc<InMemoryOrderStore>) {
        let store = Arc::new(InMemoryOrderStore::new());
        let service =
            DragDropService::new(EngineConfig::default(), nodes, store.clone(), || {}).unwrap();
        (service, store)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            zone_threshold: 0.9,
            ..Default::default()
        };
        let result = DragDropService::new(
            config,
            Vec::<SideItem>::new(),
            Arc::new(InMemoryOrderStore::new()),
            || {},
        );
        assert!(matches!(result, Err(DragDropServiceError::Config(_))));
    }

    #[test]
    fn test_rejects_cyclic_collection() {
        let nodes = vec![
            SideItem::folder("a", Some("b"), 0),
            SideItem::folder("b", Some("a"), 0),
        ];
        let result = DragDropService::new(
            EngineConfig::default(),
            nodes,
            Arc::new(InMemoryOrderStore::new()),
            || {},
        );
        assert!(matches!(result, Err(DragDropServiceError::MalformedTree(_))));
    }

    #[test]
    fn test_is_unchanged_normalizes_empty_parent() {
        let nodes = vec![SideItem::new("a", NodeKind::Note, Some(""), 0)];
        let updates = vec![OrderUpdate {
            id: "a".into(),
            kind: NodeKind::Note,
            order_index: 0,
            parent_id: None,
        }];
        assert!(is_unchanged(&nodes, &updates));
    }

    #[tokio::test]
    async fn test_drop_without_hover_at_stride_positions_is_skipped() {
        let (mut service, store) = side(vec![
            SideItem::new("a", NodeKind::Note, None, 0),
            SideItem::new("b", NodeKind::Note, None, 1000),
        ]);
        service.begin_drag("a").unwrap();
        assert!(service.finish_drag().unwrap().is_none());
        assert_eq!(service.state(), DragState::Idle);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_finish_without_drag_is_not_dragging() {
        let (mut service, _) = side(vec![]);
        assert_eq!(service.finish_drag().unwrap_err(), DragDropError::NotDragging);
    }

    #[test]
    fn test_noop_commit_needs_no_runtime() {
        let (service, store) = side(vec![SideItem::new("n", NodeKind::Note, None, 0)]);
        let event = DropEvent::Reorder {
            dragged_id: "n".into(),
            target_parent_id: None,
            prev_sibling_id: None,
            next_sibling_id: None,
        };
        assert!(service.commit(&event).unwrap().is_none());
        assert_eq!(store.call_count(), 0);
    }

    #[test]
    #[should_panic]
    fn test_commit_outside_runtime_panics() {
        let (service, _) = side(vec![SideItem::new("n", NodeKind::Note, None, 500)]);
        let event = DropEvent::Reorder {
            dragged_id: "n".into(),
            target_parent_id: None,
            prev_sibling_id: None,
            next_sibling_id: None,
        };
        let _ = service.commit(&event);
    }

    #[tokio::test]
    async fn test_hover_then_drop_nests() {
        let (mut service, store) = side(vec![
            SideItem::folder("f", None, 0),
            SideItem::new("n", NodeKind::Note, None, 1000),
        ]);
        service.begin_drag("n").unwrap();

        let pointer = PointerEvent::new(
            10.0,
            10.0,
            vec![TargetCandidate::new("f", Rect::new(0.0, 20.0, 0.0, 100.0), true)],
        );
        let hover = service.drag_move(&pointer).unwrap();
        assert_eq!(hover.zone, DropZone::Into);
        assert!(service.can_drop("f", DropZone::Into));

        let outcome = service.finish_drag().unwrap().unwrap().wait().await.unwrap();
        assert!(outcome.is_confirmed());

        let moved = service.nodes().get("n").unwrap();
        assert_eq!(moved.folder_id.as_deref(), Some("f"));
        assert_eq!(moved.order_index, 0);
        assert_eq!(
            store.get("n").await.unwrap().parent_key.as_deref(),
            Some("f")
        );
    }
}
