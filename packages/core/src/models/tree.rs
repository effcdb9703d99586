//! Tree Model
//!
//! A borrowed, point-in-time view over a flat node collection. Built once per
//! drag session or plan and dropped afterwards; it never outlives the slice it
//! indexes and never mutates it.
//!
//! The model answers the two questions the engine needs:
//!
//! - **Ancestry**: which nodes sit below a given node, so a drop can never
//!   make a node its own ancestor
//! - **Sibling groups**: which nodes share a container, in display order
//!
//! # Examples
//!
//! ```rust
//! use treedrop_core::models::{SideItem, TreeModel};
//!
//! let nodes = vec![
//!     SideItem::folder("f1", None, 0),
//!     SideItem::folder("f2", Some("f1"), 0),
//! ];
//! let tree = TreeModel::new(&nodes);
//!
//! assert!(tree.is_descendant_of("f2", "f1"));
//! assert!(tree.is_descendant_of("f1", "f1"));
//! assert!(!tree.is_descendant_of("f1", "f2"));
//! ```

use crate::config::DEFAULT_MAX_DEPTH;
use crate::models::hierarchy::HierarchyNode;
use crate::operations::DragDropError;
use std::collections::{HashMap, HashSet, VecDeque};

/// Indexed snapshot of a node collection
pub struct TreeModel<'a, N: HierarchyNode> {
    nodes: &'a [N],
    by_id: HashMap<&'a str, usize>,
    /// Container key → child positions in collection order
    children: HashMap<Option<&'a str>, Vec<usize>>,
    max_depth: usize,
}

impl<'a, N: HierarchyNode> TreeModel<'a, N> {
    pub fn new(nodes: &'a [N]) -> Self {
        Self::with_max_depth(nodes, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(nodes: &'a [N], max_depth: usize) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut children: HashMap<Option<&'a str>, Vec<usize>> = HashMap::new();

        for (ix, node) in nodes.iter().enumerate() {
            by_id.insert(node.node_id(), ix);
            children.entry(node.container_key()).or_default().push(ix);
        }

        Self {
            nodes,
            by_id,
            children,
            max_depth,
        }
    }

    pub fn nodes(&self) -> &'a [N] {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'a N> {
        self.by_id.get(id).map(|&ix| &self.nodes[ix])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Container of `id`, or `None` if `id` is unknown or at root level
    pub fn container_of(&self, id: &str) -> Option<&'a str> {
        self.get(id).and_then(|node| node.container_key())
    }

    /// All transitive children of `node_id`, not including the node itself
    ///
    /// Unknown ids yield an empty set. A cycle already present in the data
    /// terminates the walk instead of looping.
    pub fn get_descendant_ids(&self, node_id: &str) -> HashSet<String> {
        let mut found = HashSet::new();
        let Some(&root_ix) = self.by_id.get(node_id) else {
            return found;
        };

        let mut visited: HashSet<usize> = HashSet::from([root_ix]);
        let mut queue = VecDeque::from([node_id]);

        while let Some(current) = queue.pop_front() {
            let Some(child_ixs) = self.children.get(&Some(current)) else {
                continue;
            };
            for &ix in child_ixs {
                if visited.insert(ix) {
                    let child_id = self.nodes[ix].node_id();
                    found.insert(child_id.to_string());
                    queue.push_back(child_id);
                }
            }
        }

        found
    }

    /// True when `candidate` is `ancestor` itself or sits anywhere below it
    ///
    /// Self counts as a descendant: a node can never be dropped onto or into
    /// itself.
    pub fn is_descendant_of(&self, candidate: &str, ancestor: &str) -> bool {
        if candidate == ancestor {
            return true;
        }
        if !self.contains(ancestor) {
            return false;
        }

        // Walk up from the candidate; bounded so corrupt data cannot hang us.
        let mut current = candidate;
        for _ in 0..self.max_depth {
            let Some(parent) = self.container_of(current) else {
                return false;
            };
            if parent == ancestor {
                return true;
            }
            if !self.contains(parent) {
                return false;
            }
            current = parent;
        }

        false
    }

    /// Number of ancestors above `id`
    ///
    /// `None` when `id` is unknown or its chain exceeds `max_depth`, which
    /// only happens when the data already contains a cycle. A parent key that
    /// names no node in the snapshot ends the chain.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        let mut current = self.get(id)?;
        let mut depth = 0;

        while let Some(parent_id) = current.container_key() {
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            depth += 1;
            if depth > self.max_depth {
                return None;
            }
            current = parent;
        }

        Some(depth)
    }

    /// Check every parent chain reaches root within `max_depth`
    pub fn validate(&self) -> Result<(), DragDropError> {
        for node in self.nodes {
            if self.depth_of(node.node_id()).is_none() {
                let parent = node.container_key().unwrap_or_default();
                return Err(DragDropError::circular_reference(node.node_id(), parent));
            }
        }
        Ok(())
    }

    /// Members of `container` in display order, optionally skipping one id
    ///
    /// Sorted by `order_index`; ties keep collection order.
    pub fn sorted_siblings(&self, container: Option<&str>, exclude: Option<&str>) -> Vec<&'a N> {
        let mut siblings: Vec<&'a N> = self
            .children
            .get(&container)
            .map(|ixs| ixs.iter().map(|&ix| &self.nodes[ix]).collect())
            .unwrap_or_default();

        if let Some(excluded) = exclude {
            siblings.retain(|node| node.node_id() != excluded);
        }
        siblings.sort_by_key(|node| node.order_index());
        siblings
    }

    /// Ids of the siblings immediately before and after `id` in its container
    pub fn neighbors_of(&self, id: &str) -> Option<(Option<String>, Option<String>)> {
        let node = self.get(id)?;
        let siblings = self.sorted_siblings(node.container_key(), None);
        let pos = siblings.iter().position(|s| s.node_id() == id)?;

        let prev = pos
            .checked_sub(1)
            .map(|p| siblings[p].node_id().to_string());
        let next = siblings.get(pos + 1).map(|s| s.node_id().to_string());
        Some((prev, next))
    }
}
