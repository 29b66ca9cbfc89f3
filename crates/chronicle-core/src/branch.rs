//! Timeline branches.

use crate::date::TimelineDate;
use serde::{Deserialize, Serialize};

/// A named strand of the timeline: the historical main line or a
/// speculative future line forking off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Display color, usually a CSS hex string.
    #[serde(default)]
    pub color: String,

    #[serde(default, alias = "isMainTimeline")]
    pub is_main: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<TimelineDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Member node ids, in insertion order.
    #[serde(default, alias = "nodes")]
    pub node_ids: Vec<String>,
}

impl Branch {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_main: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            color: String::new(),
            is_main,
            start_date: None,
            parent_id: None,
            node_ids: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>, start: TimelineDate) -> Self {
        self.parent_id = Some(parent_id.into());
        self.start_date = Some(start);
        self
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_ids.iter().any(|id| id == node_id)
    }
}
