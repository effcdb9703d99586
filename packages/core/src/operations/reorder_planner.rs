//! Reorder Planner
//!
//! Pure computation of the new order for every sibling affected by one move.
//! No I/O, no mutation: the planner reads a node slice and returns the full
//! replacement set for the destination container.
//!
//! # Algorithm
//!
//! 1. Collect the destination container's members, minus the moved node
//! 2. Sort them by current `order_index`
//! 3. Pick the insertion point: after `prev_sibling_id` if it is found,
//!    otherwise before `next_sibling_id` if it is found, otherwise at the end
//! 4. Splice the moved node in
//! 5. Renumber every member as `position × stride`
//!
//! Step 5 always emits the whole group, including nodes whose position did
//! not change. Re-running the same placement against the updated collection
//! yields the same values.
//!
//! # Examples
//!
//! ```rust
//! use treedrop_core::models::{NodeKind, SideItem};
//! use treedrop_core::operations::{MoveRequest, ReorderPlanner};
//!
//! let nodes = vec![
//!     SideItem::new("a", NodeKind::Note, Some("p"), 0),
//!     SideItem::new("b", NodeKind::Note, Some("p"), 1000),
//!     SideItem::new("c", NodeKind::Note, Some("p"), 2000),
//!     SideItem::folder("p", None, 0),
//! ];
//!
//! let request = MoveRequest::new("c", Some("p")).after(Some("a")).before(Some("b"));
//! let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();
//!
//! let order: Vec<(&str, i64)> = updates.iter().map(|u| (u.id.as_str(), u.order_index)).collect();
//! assert_eq!(order, vec![("a", 0), ("c", 1000), ("b", 2000)]);
//! ```

use crate::config::{
    validate_stride, ConfigError, EngineConfig, DEFAULT_MAX_DEPTH, DEFAULT_ORDER_STRIDE,
};
use crate::models::{normalize_key, HierarchyNode, NodeKind, TreeModel};
use crate::operations::DragDropError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Planner input: where the moved node should end up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub move_node_id: String,
    /// Destination container, `None` for root level
    pub target_parent_id: Option<String>,
    pub prev_sibling_id: Option<String>,
    pub next_sibling_id: Option<String>,
}

impl MoveRequest {
    /// Move to the end of `target_parent_id`
    pub fn new(move_node_id: impl Into<String>, target_parent_id: Option<&str>) -> Self {
        Self {
            move_node_id: move_node_id.into(),
            target_parent_id: target_parent_id.map(str::to_string),
            prev_sibling_id: None,
            next_sibling_id: None,
        }
    }

    pub fn after(mut self, prev_sibling_id: Option<&str>) -> Self {
        self.prev_sibling_id = prev_sibling_id.map(str::to_string);
        self
    }

    pub fn before(mut self, next_sibling_id: Option<&str>) -> Self {
        self.next_sibling_id = next_sibling_id.map(str::to_string);
        self
    }
}

/// New position for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: String,
    pub kind: NodeKind,
    pub order_index: i64,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderPlanner {
    stride: i64,
    max_depth: usize,
}

impl Default for ReorderPlanner {
    fn default() -> Self {
        Self {
            stride: DEFAULT_ORDER_STRIDE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ReorderPlanner {
    /// Planner with a custom stride
    ///
    /// # Errors
    ///
    /// `InvalidStride` under the same bounds `EngineConfig::validate` applies.
    pub fn new(stride: i64) -> Result<Self, ConfigError> {
        validate_stride(stride)?;
        Ok(Self {
            stride,
            ..Self::default()
        })
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            stride: config.order_stride,
            max_depth: config.max_depth,
        }
    }

    pub fn stride(&self) -> i64 {
        self.stride
    }

    /// Compute the renumbered destination group for `request`
    ///
    /// # Errors
    ///
    /// - `InvalidMove` if the moved node or the destination container is not
    ///   in `nodes`
    /// - `CircularReference` if the destination is the moved node or lies
    ///   inside its subtree
    /// - `NotNestCapable` if the destination container is a leaf
    /// - `OrderOverflow` if the group is too large for the stride
    ///
    /// Stale sibling references do not fail; the node goes to the end.
    pub fn plan<N: HierarchyNode>(
        &self,
        request: &MoveRequest,
        nodes: &[N],
    ) -> Result<Vec<OrderUpdate>, DragDropError> {
        let tree = TreeModel::with_max_depth(nodes, self.max_depth);
        let move_id = request.move_node_id.as_str();

        let moved = tree
            .get(move_id)
            .ok_or_else(|| DragDropError::invalid_move(move_id))?;

        let target_parent = normalize_key(request.target_parent_id.as_deref());
        if let Some(parent_id) = target_parent {
            let parent = tree
                .get(parent_id)
                .ok_or_else(|| DragDropError::invalid_move(parent_id))?;
            if tree.is_descendant_of(parent_id, move_id) {
                return Err(DragDropError::circular_reference(move_id, parent_id));
            }
            if !parent.is_nest_capable() {
                return Err(DragDropError::not_nest_capable(parent_id));
            }
        }

        let mut group = tree.sorted_siblings(target_parent, Some(move_id));
        let position_of = |id: &Option<String>| {
            id.as_deref()
                .and_then(|id| group.iter().position(|node| node.node_id() == id))
        };

        let insert_at = if let Some(ix) = position_of(&request.prev_sibling_id) {
            ix + 1
        } else if let Some(ix) = position_of(&request.next_sibling_id) {
            ix
        } else {
            if request.prev_sibling_id.is_some() || request.next_sibling_id.is_some() {
                tracing::debug!(
                    "Stale sibling reference for '{}' (prev={:?}, next={:?}); appending",
                    move_id,
                    request.prev_sibling_id,
                    request.next_sibling_id
                );
            }
            group.len()
        };
        group.insert(insert_at, moved);

        let parent_id = target_parent.map(str::to_string);
        let updates = group
            .iter()
            .enumerate()
            .map(|(ix, node)| -> Result<OrderUpdate, DragDropError> {
                let order_index = i64::try_from(ix)
                    .ok()
                    .and_then(|ix| ix.checked_mul(self.stride))
                    .ok_or(DragDropError::OrderOverflow {
                        position: ix,
                        stride: self.stride,
                    })?;
                Ok(OrderUpdate {
                    id: node.node_id().to_string(),
                    kind: node.kind(),
                    order_index,
                    parent_id: parent_id.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Planned move of '{}' into {:?} at position {} ({} updates)",
            move_id,
            target_parent,
            insert_at,
            updates.len()
        );

        Ok(updates)
    }
}

/// Write `updates` into `nodes` through the capability interface
///
/// Returns the number of nodes touched. Updates naming unknown ids are
/// skipped.
pub fn apply_updates<N: HierarchyNode>(nodes: &mut [N], updates: &[OrderUpdate]) -> usize {
    let by_id: HashMap<&str, &OrderUpdate> =
        updates.iter().map(|u| (u.id.as_str(), u)).collect();

    let mut touched = 0;
    for node in nodes.iter_mut() {
        if let Some(update) = by_id.get(node.node_id()).copied() {
            node.set_container_key(update.parent_id.clone());
            node.set_order_index(update.order_index);
            touched += 1;
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SideItem, TaskItem};

    fn note(id: &str, parent: Option<&str>, order: i64) -> SideItem {
        SideItem::new(id, NodeKind::Note, parent, order)
    }

    fn ids(updates: &[OrderUpdate]) -> Vec<&str> {
        updates.iter().map(|u| u.id.as_str()).collect()
    }

    fn group_order(nodes: &[SideItem], parent: Option<&str>) -> Vec<String> {
        let tree = TreeModel::new(nodes);
        tree.sorted_siblings(parent, None)
            .iter()
            .map(|n| n.id.clone())
            .collect()
    }

    #[test]
    fn test_reorder_within_parent() {
        let nodes = vec![
            SideItem::folder("P", None, 0),
            note("A", Some("P"), 0),
            note("B", Some("P"), 1000),
            note("C", Some("P"), 2000),
        ];
        let request = MoveRequest::new("C", Some("P"))
            .after(Some("A"))
            .before(Some("B"));
        let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();

        assert_eq!(ids(&updates), vec!["A", "C", "B"]);
        assert_eq!(
            updates.iter().map(|u| u.order_index).collect::<Vec<_>>(),
            vec![0, 1000, 2000]
        );
        assert!(updates.iter().all(|u| u.parent_id.as_deref() == Some("P")));
    }

    #[test]
    fn test_nest_into_empty_folder() {
        let nodes = vec![SideItem::folder("F", None, 0), note("L", None, 1000)];
        let request = MoveRequest::new("L", Some("F"));
        let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].id, "L");
        assert_eq!(updates[0].order_index, 0);
        assert_eq!(updates[0].parent_id.as_deref(), Some("F"));
    }

    #[test]
    fn test_single_node_without_neighbors() {
        let nodes = vec![note("X", None, 7000)];
        let updates = ReorderPlanner::default()
            .plan(&MoveRequest::new("X", None), &nodes)
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].order_index, 0);
        assert_eq!(updates[0].parent_id, None);
    }

    #[test]
    fn test_only_next_known_inserts_before_it() {
        let nodes = vec![note("A", None, 0), note("B", None, 1000), note("C", None, 2000)];
        let request = MoveRequest::new("C", None).before(Some("A"));
        let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();
        assert_eq!(ids(&updates), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_stale_references_append() {
        let nodes = vec![note("A", None, 0), note("B", None, 1000), note("C", None, 2000)];
        let request = MoveRequest::new("A", None)
            .after(Some("gone"))
            .before(Some("also-gone"));
        let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();
        assert_eq!(ids(&updates), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_stale_prev_falls_back_to_next() {
        let nodes = vec![note("A", None, 0), note("B", None, 1000), note("C", None, 2000)];
        let request = MoveRequest::new("C", None)
            .after(Some("gone"))
            .before(Some("B"));
        let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();
        assert_eq!(ids(&updates), vec!["A", "C", "B"]);
    }

    #[test]
    fn test_sibling_in_other_container_is_stale() {
        let nodes = vec![
            SideItem::folder("F", None, 0),
            note("inside", Some("F"), 0),
            note("A", None, 1000),
            note("B", None, 2000),
        ];
        let request = MoveRequest::new("B", None).after(Some("inside"));
        let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();
        assert_eq!(ids(&updates), vec!["F", "A", "B"]);
    }

    #[test]
    fn test_unknown_node_is_invalid_move() {
        let nodes = vec![note("A", None, 0)];
        let err = ReorderPlanner::default()
            .plan(&MoveRequest::new("ghost", None), &nodes)
            .unwrap_err();
        assert_eq!(err, DragDropError::invalid_move("ghost"));
    }

    #[test]
    fn test_unknown_parent_is_invalid_move() {
        let nodes = vec![note("A", None, 0)];
        let err = ReorderPlanner::default()
            .plan(&MoveRequest::new("A", Some("nowhere")), &nodes)
            .unwrap_err();
        assert_eq!(err, DragDropError::invalid_move("nowhere"));
    }

    #[test]
    fn test_refuses_cycle() {
        let nodes = vec![
            SideItem::folder("F1", None, 0),
            SideItem::folder("F2", Some("F1"), 0),
        ];
        let planner = ReorderPlanner::default();
        assert!(matches!(
            planner.plan(&MoveRequest::new("F1", Some("F2")), &nodes),
            Err(DragDropError::CircularReference { .. })
        ));
        assert!(matches!(
            planner.plan(&MoveRequest::new("F1", Some("F1")), &nodes),
            Err(DragDropError::CircularReference { .. })
        ));
    }

    #[test]
    fn test_mixed_kinds_share_one_group() {
        let nodes = vec![
            SideItem::folder("F", None, 0),
            SideItem::folder("sub", Some("F"), 0),
            SideItem::new("obj", NodeKind::Objective, Some("F"), 1000),
            SideItem::new("bm", NodeKind::Bookmark, Some("F"), 2000),
            SideItem::new("tl", NodeKind::TaskList, None, 1000),
        ];
        let request = MoveRequest::new("tl", Some("F")).after(Some("sub"));
        let updates = ReorderPlanner::default().plan(&request, &nodes).unwrap();

        assert_eq!(ids(&updates), vec!["sub", "tl", "obj", "bm"]);
        assert_eq!(updates[1].kind, NodeKind::TaskList);
    }

    #[test]
    fn test_stride_spacing_and_custom_stride() {
        let nodes: Vec<SideItem> = (0..6).map(|i| note(&format!("n{}", i), None, i * 3)).collect();
        let request = MoveRequest::new("n0", None).after(Some("n3"));

        for stride in [1000, 16] {
            let updates = ReorderPlanner::new(stride)
                .unwrap()
                .plan(&request, &nodes)
                .unwrap();
            for pair in updates.windows(2) {
                assert_eq!(pair[1].order_index - pair[0].order_index, stride);
            }
            assert_eq!(updates[0].order_index, 0);
        }
    }

    #[test]
    fn test_new_rejects_out_of_range_stride() {
        assert!(ReorderPlanner::new(0).is_err());
        assert!(ReorderPlanner::new(i64::MAX).is_err());
        assert!(ReorderPlanner::new(crate::config::MAX_ORDER_STRIDE).is_ok());
    }

    #[test]
    fn test_oversized_stride_from_config_errors_instead_of_overflowing() {
        let config = EngineConfig {
            order_stride: i64::MAX,
            ..Default::default()
        };
        let nodes = vec![note("A", None, 0), note("B", None, 1), note("C", None, 2)];
        let err = ReorderPlanner::from_config(&config)
            .plan(&MoveRequest::new("A", None), &nodes)
            .unwrap_err();
        assert_eq!(
            err,
            DragDropError::OrderOverflow {
                position: 2,
                stride: i64::MAX
            }
        );
    }

    #[test]
    fn test_refuses_nest_into_leaf() {
        let nodes = vec![
            SideItem::folder("F", None, 0),
            note("N", None, 1000),
            note("M", None, 2000),
        ];
        let planner = ReorderPlanner::default();
        assert_eq!(
            planner.plan(&MoveRequest::new("M", Some("N")), &nodes),
            Err(DragDropError::not_nest_capable("N"))
        );
        assert!(planner.plan(&MoveRequest::new("M", Some("F")), &nodes).is_ok());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let nodes = vec![note("A", None, 5), note("B", None, 5), note("C", None, 1)];
        let request = MoveRequest::new("C", None).after(Some("A"));
        let planner = ReorderPlanner::default();
        let first = planner.plan(&request, &nodes).unwrap();
        for _ in 0..10 {
            assert_eq!(planner.plan(&request, &nodes).unwrap(), first);
        }
    }

    #[test]
    fn test_replanning_same_placement_is_stable() {
        let mut nodes = vec![
            note("A", None, 0),
            note("B", None, 40),
            note("C", None, 41),
            note("D", None, 900),
        ];
        let planner = ReorderPlanner::default();

        let request = MoveRequest::new("D", None).after(Some("A")).before(Some("B"));
        let updates = planner.plan(&request, &nodes).unwrap();
        apply_updates(&mut nodes, &updates);
        let first_order = group_order(&nodes, None);

        // Neighbours derived from the updated state describe the same spot.
        let (prev, next) = TreeModel::new(&nodes).neighbors_of("D").unwrap();
        let again = MoveRequest {
            move_node_id: "D".to_string(),
            target_parent_id: None,
            prev_sibling_id: prev,
            next_sibling_id: next,
        };
        let second = planner.plan(&again, &nodes).unwrap();
        assert_eq!(second, updates);
        apply_updates(&mut nodes, &second);
        assert_eq!(group_order(&nodes, None), first_order);
    }

    #[test]
    fn test_task_items_plan_by_parent_task() {
        let tasks = vec![
            TaskItem::new("t1", None, 0),
            TaskItem::new("t2", None, 1000),
            TaskItem::new("t3", Some("t1"), 0),
        ];
        let request = MoveRequest::new("t2", Some("t1")).after(Some("t3"));
        let updates = ReorderPlanner::default().plan(&request, &tasks).unwrap();
        assert_eq!(ids(&updates), vec!["t3", "t2"]);
        assert!(updates.iter().all(|u| u.kind == NodeKind::Task));
    }

    #[test]
    fn test_apply_updates_skips_unknown() {
        let mut nodes = vec![note("A", None, 0)];
        let updates = vec![
            OrderUpdate {
                id: "A".to_string(),
                kind: NodeKind::Note,
                order_index: 3000,
                parent_id: Some("F".to_string()),
            },
            OrderUpdate {
                id: "ghost".to_string(),
                kind: NodeKind::Note,
                order_index: 0,
                parent_id: None,
            },
        ];
        assert_eq!(apply_updates(&mut nodes, &updates), 1);
        assert_eq!(nodes[0].order_index, 3000);
        assert_eq!(nodes[0].folder_id.as_deref(), Some("F"));
    }
}
