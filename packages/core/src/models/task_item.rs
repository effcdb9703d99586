//! Nested Task Items
//!
//! Tasks nest under other tasks through `parent_task_id`. Unlike the side
//! list, any task can receive subtasks.

use crate::models::hierarchy::{normalize_key, HierarchyNode, NodeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: String,
    /// Task list this task belongs to; not part of the hierarchy
    #[serde(default)]
    pub task_list_id: Option<String>,
    #[serde(default)]
    pub parent_task_id: Option<String>,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl TaskItem {
    pub fn new(id: impl Into<String>, parent_task_id: Option<&str>, order_index: i64) -> Self {
        Self {
            id: id.into(),
            task_list_id: None,
            parent_task_id: parent_task_id.map(str::to_string),
            order_index,
            title: String::new(),
            completed: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl HierarchyNode for TaskItem {
    fn node_id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Task
    }

    fn container_key(&self) -> Option<&str> {
        normalize_key(self.parent_task_id.as_deref())
    }

    fn set_container_key(&mut self, key: Option<String>) {
        self.parent_task_id = key;
    }

    fn order_index(&self) -> i64 {
        self.order_index
    }

    fn set_order_index(&mut self, index: i64) {
        self.order_index = index;
    }

    fn restore_position(&mut self, saved: &Self) {
        self.parent_task_id = saved.parent_task_id.clone();
        self.order_index = saved.order_index;
    }
}
