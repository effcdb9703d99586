//! Drag Session Controller
//!
//! State machine for one interactive drag gesture:
//!
//! ```text
//! Idle ──start──▶ Dragging ──drop──▶ (DropEvent) ──▶ Idle
//!                    │
//!                    └──cancel──▶ Idle
//! ```
//!
//! The controller owns at most one [`DragSession`]. It never touches the node
//! collection: it reads a [`TreeModel`] handed in by the caller and emits a
//! single [`DropEvent`] per completed gesture. Before/after neighbours are
//! resolved from the sorted sibling list at hover time, so the emitted event
//! does not depend on how rows happen to be rendered.

use crate::config::EngineConfig;
use crate::models::{HierarchyNode, NodeKind, TreeModel};
use crate::operations::geometry::{DropZone, GeometryClassifier, Point, TargetCandidate};
use crate::operations::reorder_planner::MoveRequest;
use crate::operations::DragDropError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Pointer payload delivered by the UI layer on drag-move
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub target_candidates: Vec<TargetCandidate>,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, target_candidates: Vec<TargetCandidate>) -> Self {
        Self {
            x,
            y,
            target_candidates,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// What the dragged node looked like when the gesture began
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSnapshot {
    pub node_id: String,
    pub kind: NodeKind,
    pub parent_id: Option<String>,
    pub depth: usize,
}

/// Resolved destination: container plus immediate neighbours
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropPlacement {
    pub target_parent_id: Option<String>,
    pub prev_sibling_id: Option<String>,
    pub next_sibling_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HoverState {
    pub target_id: Option<String>,
    pub zone: DropZone,
    pub placement: Option<DropPlacement>,
}

impl HoverState {
    pub fn is_none(&self) -> bool {
        self.zone == DropZone::None
    }
}

/// Terminal event of a completed drag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DropEvent {
    /// Dragged node becomes the last child of `new_parent_id`
    #[serde(rename_all = "camelCase")]
    Nest {
        dragged_id: String,
        new_parent_id: String,
    },
    /// Dragged node lands between two siblings of `target_parent_id`
    #[serde(rename_all = "camelCase")]
    Reorder {
        dragged_id: String,
        target_parent_id: Option<String>,
        prev_sibling_id: Option<String>,
        next_sibling_id: Option<String>,
    },
}

impl DropEvent {
    pub fn dragged_id(&self) -> &str {
        match self {
            Self::Nest { dragged_id, .. } | Self::Reorder { dragged_id, .. } => dragged_id,
        }
    }

    /// Planner input for this event
    pub fn move_request(&self) -> MoveRequest {
        match self {
            Self::Nest {
                dragged_id,
                new_parent_id,
            } => MoveRequest::new(dragged_id.clone(), Some(new_parent_id)),
            Self::Reorder {
                dragged_id,
                target_parent_id,
                prev_sibling_id,
                next_sibling_id,
            } => MoveRequest {
                move_node_id: dragged_id.clone(),
                target_parent_id: target_parent_id.clone(),
                prev_sibling_id: prev_sibling_id.clone(),
                next_sibling_id: next_sibling_id.clone(),
            },
        }
    }
}

/// Domain hook consulted by `can_drop` after the structural checks pass
///
/// Any `Fn(&DragSnapshot, &str, DropZone) -> bool` closure is a rule.
pub trait DropRule: Send + Sync {
    fn allows(&self, dragged: &DragSnapshot, target_id: &str, zone: DropZone) -> bool;
}

impl<F> DropRule for F
where
    F: Fn(&DragSnapshot, &str, DropZone) -> bool + Send + Sync,
{
    fn allows(&self, dragged: &DragSnapshot, target_id: &str, zone: DropZone) -> bool {
        self(dragged, target_id, zone)
    }
}

/// Ephemeral state of the active gesture; never persisted
#[derive(Debug, Clone)]
pub struct DragSession {
    snapshot: DragSnapshot,
    /// The dragged node and its whole subtree
    invalid_targets: HashSet<String>,
    /// Where the node sits now; a drop with no hover target lands here
    origin: DropPlacement,
    hover: HoverState,
}

impl DragSession {
    pub fn dragged_id(&self) -> &str {
        &self.snapshot.node_id
    }

    pub fn snapshot(&self) -> &DragSnapshot {
        &self.snapshot
    }

    pub fn invalid_targets(&self) -> &HashSet<String> {
        &self.invalid_targets
    }

    pub fn origin(&self) -> &DropPlacement {
        &self.origin
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

pub struct DragController {
    classifier: GeometryClassifier,
    rules: Vec<Box<dyn DropRule>>,
    session: Option<DragSession>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(GeometryClassifier::default())
    }
}

impl DragController {
    pub fn new(classifier: GeometryClassifier) -> Self {
        Self {
            classifier,
            rules: Vec::new(),
            session: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(GeometryClassifier::new(config.zone_threshold))
    }

    /// Add a domain-specific drop rule
    pub fn with_rule(mut self, rule: impl DropRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn state(&self) -> DragState {
        if self.session.is_some() {
            DragState::Dragging
        } else {
            DragState::Idle
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Ids the UI should mark as forbidden targets for the active drag
    pub fn invalid_targets(&self) -> Option<&HashSet<String>> {
        self.session.as_ref().map(|s| &s.invalid_targets)
    }

    /// Begin dragging `node_id`
    ///
    /// # Errors
    ///
    /// - `DragInProgress` if a session is already active
    /// - `InvalidMove` if `node_id` is not in `tree`
    pub fn start<N: HierarchyNode>(
        &mut self,
        tree: &TreeModel<'_, N>,
        node_id: &str,
    ) -> Result<&DragSession, DragDropError> {
        if let Some(active) = &self.session {
            return Err(DragDropError::drag_in_progress(active.dragged_id()));
        }

        let node = tree
            .get(node_id)
            .ok_or_else(|| DragDropError::invalid_move(node_id))?;

        let depth = tree.depth_of(node_id).unwrap_or_else(|| {
            tracing::warn!("Parent chain of '{}' does not reach root", node_id);
            0
        });

        let invalid_targets: HashSet<String> = tree
            .nodes()
            .iter()
            .map(|n| n.node_id())
            .filter(|id| tree.is_descendant_of(id, node_id))
            .map(str::to_string)
            .collect();

        let (prev_sibling_id, next_sibling_id) = tree.neighbors_of(node_id).unwrap_or_default();
        let origin = DropPlacement {
            target_parent_id: node.container_key().map(str::to_string),
            prev_sibling_id,
            next_sibling_id,
        };

        tracing::debug!(
            "Drag started for '{}' ({} invalid targets)",
            node_id,
            invalid_targets.len()
        );

        let session = self.session.insert(DragSession {
            snapshot: DragSnapshot {
                node_id: node_id.to_string(),
                kind: node.kind(),
                parent_id: node.container_key().map(str::to_string),
                depth,
            },
            invalid_targets,
            origin,
            hover: HoverState::default(),
        });
        Ok(session)
    }

    /// Whether the active drag may land on `target_id` in `zone`
    ///
    /// Rejects the dragged node itself, anything in its subtree, targets
    /// missing from `tree`, nesting into a node that cannot hold children,
    /// and anything a domain rule refuses. Always false while idle.
    pub fn can_drop<N: HierarchyNode>(
        &self,
        tree: &TreeModel<'_, N>,
        target_id: &str,
        zone: DropZone,
    ) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        if zone == DropZone::None || target_id == session.dragged_id() {
            return false;
        }
        let Some(target) = tree.get(target_id) else {
            return false;
        };
        if session.invalid_targets.contains(target_id) {
            return false;
        }
        if zone == DropZone::Into && !target.is_nest_capable() {
            return false;
        }
        // Snapshot may have been rebuilt since start; recheck ancestry.
        if tree.is_descendant_of(target_id, session.dragged_id()) {
            return false;
        }
        self.rules
            .iter()
            .all(|rule| rule.allows(&session.snapshot, target_id, zone))
    }

    /// Re-resolve the hover target for a pointer move
    ///
    /// The first candidate that contains the cursor and passes `can_drop`
    /// wins. If none qualifies the hover clears.
    pub fn update_hover<N: HierarchyNode>(
        &mut self,
        tree: &TreeModel<'_, N>,
        pointer: &PointerEvent,
    ) -> Result<&HoverState, DragDropError> {
        let dragged_id = match &self.session {
            Some(session) => session.dragged_id().to_string(),
            None => return Err(DragDropError::NotDragging),
        };
        let cursor = pointer.position();

        let mut resolved = HoverState::default();
        for candidate in &pointer.target_candidates {
            let node_nest_capable = tree
                .get(&candidate.id)
                .is_some_and(|node| node.is_nest_capable());
            let zone = self.classifier.classify_target_for(
                cursor,
                candidate,
                &dragged_id,
                node_nest_capable,
            );
            if zone == DropZone::None || !self.can_drop(tree, &candidate.id, zone) {
                continue;
            }
            let Some(placement) = resolve_placement(tree, &dragged_id, &candidate.id, zone) else {
                continue;
            };
            resolved = HoverState {
                target_id: Some(candidate.id.clone()),
                zone,
                placement: Some(placement),
            };
            break;
        }

        let Some(session) = self.session.as_mut() else {
            return Err(DragDropError::NotDragging);
        };
        if session.hover != resolved {
            tracing::trace!(
                "Hover for '{}' -> {:?} {:?}",
                dragged_id,
                resolved.target_id,
                resolved.zone
            );
            session.hover = resolved;
        }
        Ok(&session.hover)
    }

    /// Finish the gesture and emit its single terminal event
    ///
    /// Returns `None` when no drag is active.
    pub fn drop(&mut self) -> Option<DropEvent> {
        let session = self.session.take()?;
        let dragged_id = session.snapshot.node_id;

        let event = match (session.hover.zone, session.hover.target_id, session.hover.placement) {
            (DropZone::Into, Some(target_id), _) => DropEvent::Nest {
                dragged_id,
                new_parent_id: target_id,
            },
            (_, _, placement) => {
                let placement = placement.unwrap_or(session.origin);
                DropEvent::Reorder {
                    dragged_id,
                    target_parent_id: placement.target_parent_id,
                    prev_sibling_id: placement.prev_sibling_id,
                    next_sibling_id: placement.next_sibling_id,
                }
            }
        };

        tracing::debug!("Drag dropped: {:?}", event);
        Some(event)
    }

    /// Abandon the gesture without emitting anything
    ///
    /// Returns whether a session was active.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                tracing::debug!("Drag cancelled for '{}'", session.dragged_id());
                true
            }
            None => false,
        }
    }
}

/// Translate a zone on `target_id` into container + neighbours
fn resolve_placement<N: HierarchyNode>(
    tree: &TreeModel<'_, N>,
    dragged_id: &str,
    target_id: &str,
    zone: DropZone,
) -> Option<DropPlacement> {
    if zone == DropZone::Into {
        return Some(DropPlacement {
            target_parent_id: Some(target_id.to_string()),
            prev_sibling_id: None,
            next_sibling_id: None,
        });
    }

    let container = tree.container_of(target_id);
    let siblings = tree.sorted_siblings(container, Some(dragged_id));
    let pos = siblings.iter().position(|n| n.node_id() == target_id)?;
    let id_at = |ix: usize| siblings.get(ix).map(|n| n.node_id().to_string());

    let (prev_sibling_id, next_sibling_id) = match zone {
        DropZone::Before => (pos.checked_sub(1).and_then(id_at), Some(target_id.to_string())),
        DropZone::After => (Some(target_id.to_string()), id_at(pos + 1)),
        DropZone::Into | DropZone::None => return None,
    };

    Some(DropPlacement {
        target_parent_id: container.map(str::to_string),
        prev_sibling_id,
        next_sibling_id,
    })
}
