//! Hierarchy Capability Interface
//!
//! Every collection the drag engine rearranges (the side navigation list, the
//! nested task list) stores its parent link and sibling position under
//! different field names. `HierarchyNode` hides those differences so the tree
//! model, planner and coordinator work over any of them without per-kind
//! branching.
//!
//! # Examples
//!
//! ```rust
//! use treedrop_core::models::{HierarchyNode, NodeKind, SideItem};
//!
//! let mut note = SideItem::new("note-1", NodeKind::Note, Some("folder-a"), 2000);
//! assert_eq!(note.container_key(), Some("folder-a"));
//!
//! note.set_container_key(None);
//! note.set_order_index(0);
//! assert_eq!(note.container_key(), None);
//! assert_eq!(note.order_index(), 0);
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind tag for every entry that can take part in drag-and-drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Folder,
    Objective,
    Note,
    Bookmark,
    TaskList,
    Task,
}

impl NodeKind {
    /// Default nest capability for this kind
    ///
    /// Folders always accept children. Tasks accept subtasks in the task tree.
    /// Call sites may still override capability per node through
    /// `TargetCandidate::nest_capable`.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Folder | Self::Task)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Objective => "objective",
            Self::Note => "note",
            Self::Bookmark => "bookmark",
            Self::TaskList => "task-list",
            Self::Task => "task",
        }
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "folder" => Ok(Self::Folder),
            "objective" => Ok(Self::Objective),
            "note" => Ok(Self::Note),
            "bookmark" => Ok(Self::Bookmark),
            "task-list" | "tasklist" => Ok(Self::TaskList),
            "task" => Ok(Self::Task),
            _ => Err(format!("Invalid node kind: {}", s)),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform access to a node's identity, container link and sibling order
///
/// Implemented once per domain type. Nothing in the engine reads the
/// underlying field names directly.
pub trait HierarchyNode: Clone + Send + Sync + 'static {
    /// Opaque unique identifier
    fn node_id(&self) -> &str;

    fn kind(&self) -> NodeKind;

    /// Id of the containing node, `None` for root level
    fn container_key(&self) -> Option<&str>;

    fn set_container_key(&mut self, key: Option<String>);

    fn order_index(&self) -> i64;

    fn set_order_index(&mut self, index: i64);

    /// Whether this node may receive children in its domain
    fn is_nest_capable(&self) -> bool {
        self.kind().is_container()
    }

    /// Copy container and order back from a saved copy of this node
    ///
    /// Used for rollback. Implementations with raw fields that normalize
    /// differently from `container_key` should copy them verbatim.
    fn restore_position(&mut self, saved: &Self) {
        self.set_container_key(saved.container_key().map(str::to_string));
        self.set_order_index(saved.order_index());
    }
}

/// Normalize a container key so empty strings count as root level
///
/// Some stores persist a missing parent as `""` rather than `NULL`. Both must
/// land in the same sibling group.
pub fn normalize_key(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.is_empty())
}
