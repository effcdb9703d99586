//! Side Navigation Items
//!
//! The side list mixes folders with the leaf entries filed under them
//! (objectives, notes, bookmarks, task lists). All of them hang off the same
//! `folder_id` column, so sibling groups are "everything in folder X"
//! regardless of kind.

use crate::models::hierarchy::{normalize_key, HierarchyNode, NodeKind};
use serde::{Deserialize, Serialize};

/// One row of the side navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideItem {
    pub id: String,
    pub kind: NodeKind,
    /// Containing folder, `None` at root level
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub title: String,
}

impl SideItem {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        folder_id: Option<&str>,
        order_index: i64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            folder_id: folder_id.map(str::to_string),
            order_index,
            title: String::new(),
        }
    }

    pub fn folder(id: impl Into<String>, folder_id: Option<&str>, order_index: i64) -> Self {
        Self::new(id, NodeKind::Folder, folder_id, order_index)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl HierarchyNode for SideItem {
    fn node_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn container_key(&self) -> Option<&str> {
        normalize_key(self.folder_id.as_deref())
    }

    fn set_container_key(&mut self, key: Option<String>) {
        self.folder_id = key;
    }

    fn order_index(&self) -> i64 {
        self.order_index
    }

    fn set_order_index(&mut self, index: i64) {
        self.order_index = index;
    }

    // Only folders hold other entries in the side list.
    fn is_nest_capable(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    fn restore_position(&mut self, saved: &Self) {
        self.folder_id = saved.folder_id.clone();
        self.order_index = saved.order_index;
    }
}
