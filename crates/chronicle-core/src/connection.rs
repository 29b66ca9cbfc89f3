//! Connection types for the timeline graph.
//!
//! A connection is a directed "led to" relationship between two events.
//! Its identity is the ordered pair (source, target); styling is display
//! metadata only.

use serde::{Deserialize, Serialize};

/// How a connection is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl std::fmt::Display for LineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        };
        write!(f, "{}", s)
    }
}

/// Display metadata attached to an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStyle {
    #[serde(default)]
    pub line: LineStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConnectionStyle {
    /// True for the style implied by a plain per-node connection list.
    pub fn is_plain(&self) -> bool {
        self.line == LineStyle::Solid && self.label.is_none()
    }
}

/// An explicit connection record, as found in a dataset's `connections`
/// array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source_id: String,
    pub target_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<LineStyle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConnectionRecord {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            id: None,
            source_id: source_id.into(),
            target_id: target_id.into(),
            style: None,
            label: None,
        }
    }

    pub fn connection_style(&self) -> ConnectionStyle {
        ConnectionStyle {
            line: self.style.unwrap_or_default(),
            label: self.label.clone(),
        }
    }
}

/// A flattened connection for export and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub style: ConnectionStyle,
}
