//! Timeline node types.
//!
//! A node is one event on the timeline. Its `connections` list holds the
//! ids it points at, as they appear in a dataset; the graph resolves those
//! into edges and tolerates ids that don't exist.

use crate::date::TimelineDate;
use crate::dimension::{Dimension, Score, ThematicScores};
use serde::{Deserialize, Serialize};

/// Screen-space placement of a node. Never used by graph queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single event on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier.
    pub id: String,

    pub title: String,

    pub date: TimelineDate,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub position: Position,

    /// Foreign key into the branch set. May reference a branch that
    /// doesn't exist.
    pub branch_id: String,

    /// Thematic significance, keyed by dimension.
    #[serde(default, alias = "dimensions")]
    pub scores: ThematicScores,

    /// Ids this node points at, in declaration order.
    #[serde(default)]
    pub connections: Vec<String>,
}

impl Node {
    /// Creates a node with no description, scores or connections.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        date: TimelineDate,
        branch_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date,
            description: String::new(),
            position: Position::default(),
            branch_id: branch_id.into(),
            scores: ThematicScores::new(),
            connections: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_score(mut self, dimension: Dimension, score: Score) -> Self {
        self.scores.set(dimension, score);
        self
    }

    pub fn with_connections(mut self, targets: Vec<String>) -> Self {
        self.connections = targets;
        self
    }
}

/// A partial edit to an existing node. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<TimelineDate>,
    pub position: Option<Position>,
    pub branch_id: Option<String>,

    /// Scores to set; merged key-wise into the existing map.
    #[serde(default)]
    pub scores: Vec<(Dimension, Score)>,

    /// Dimensions to drop from the node.
    #[serde(default)]
    pub remove_scores: Vec<Dimension>,
}

impl NodeUpdate {
    /// Applies the patch in place.
    pub fn apply_to(self, node: &mut Node) {
        if let Some(title) = self.title {
            node.title = title;
        }
        if let Some(description) = self.description {
            node.description = description;
        }
        if let Some(date) = self.date {
            node.date = date;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(branch_id) = self.branch_id {
            node.branch_id = branch_id;
        }
        for dimension in &self.remove_scores {
            node.scores.remove(dimension);
        }
        for (dimension, score) in self.scores {
            node.scores.set(dimension, score);
        }
    }

    /// True if applying the patch changes the searchable text.
    pub fn touches_text(&self) -> bool {
        self.title.is_some() || self.description.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_node() {
        let json = r#"{
            "id": "eliza",
            "title": "ELIZA - Early Natural Language Processing",
            "date": "1966-01-01",
            "description": "Weizenbaum's chatbot",
            "position": {"x": 120.0, "y": 40.5},
            "branchId": "main",
            "dimensions": {"technical": 7, "societal": 5},
            "connections": ["shrdlu"]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.branch_id, "main");
        assert_eq!(node.scores.total(), 12);
        assert_eq!(node.connections, vec!["shrdlu".to_string()]);
        assert_eq!(node.position, Position::new(120.0, 40.5));
    }

    #[test]
    fn test_update_merges_scores() {
        let mut node = Node::new("a", "A", TimelineDate::from_ymd(2000, 1, 1).unwrap(), "main")
            .with_score(Dimension::Technical, Score::new(3).unwrap())
            .with_score(Dimension::Societal, Score::new(4).unwrap());

        let update = NodeUpdate {
            title: Some("Renamed".into()),
            scores: vec![(Dimension::Technical, Score::new(8).unwrap())],
            remove_scores: vec![Dimension::Societal],
            ..Default::default()
        };
        assert!(update.touches_text());
        update.apply_to(&mut node);

        assert_eq!(node.title, "Renamed");
        assert_eq!(node.scores.get(&Dimension::Technical).map(Score::value), Some(8));
        assert_eq!(node.scores.get(&Dimension::Societal), None);
    }
}
