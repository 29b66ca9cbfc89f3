//! Edge weights for the timeline graph.
//!
//! The graph's edges are the canonical connection representation. Identity
//! is the (source, target) pair, so the weight only carries what an
//! explicit connection record adds on top: an id and display style.

use chronicle_core::{ConnectionRecord, ConnectionStyle};
use serde::{Deserialize, Serialize};

/// Metadata stored on a graph edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Id of the explicit record this edge came from, if any.
    pub id: Option<String>,

    pub style: ConnectionStyle,
}

impl Edge {
    /// A plain edge, as implied by a per-node connection list.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the edge carries nothing beyond its endpoints.
    pub fn is_plain(&self) -> bool {
        self.id.is_none() && self.style.is_plain()
    }

    /// The explicit record that would recreate this edge.
    pub(crate) fn to_record(&self, source: &str, target: &str) -> ConnectionRecord {
        ConnectionRecord {
            id: self.id.clone(),
            source_id: source.to_string(),
            target_id: target.to_string(),
            style: Some(self.style.line),
            label: self.style.label.clone(),
        }
    }
}

impl From<&ConnectionRecord> for Edge {
    fn from(record: &ConnectionRecord) -> Self {
        Self {
            id: record.id.clone(),
            style: record.connection_style(),
        }
    }
}
