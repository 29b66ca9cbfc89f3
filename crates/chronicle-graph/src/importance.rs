//! Importance scoring for timeline events.
//!
//! A node's importance blends how connected it is with how significant it
//! is thematically:
//!
//! ```text
//! score = 2 × out_degree + 3 × in_degree + 0.5 × Σ thematic scores
//! ```
//!
//! Being pointed at counts for more than pointing elsewhere. The weights
//! are policy and can be overridden through [`ImportanceWeights`].

use crate::graph::TimelineGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Weights for the importance formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportanceWeights {
    pub out_degree: f64,
    pub in_degree: f64,
    pub thematic: f64,
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            out_degree: 2.0,
            in_degree: 3.0,
            thematic: 0.5,
        }
    }
}

/// The parts an importance score is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceBreakdown {
    pub id: String,
    pub title: String,
    pub out_degree: usize,
    pub in_degree: usize,
    /// Sum of every thematic score on the node.
    pub thematic_total: u32,
    pub score: f64,
}

impl ImportanceBreakdown {
    /// Returns a one-line summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Importance: {:.1} (out: {}, in: {}, thematic: {})",
            self.score, self.out_degree, self.in_degree, self.thematic_total
        )
    }
}

impl TimelineGraph {
    /// Importance with the default weights. Unknown nodes score 0.
    pub fn importance(&self, id: &str) -> f64 {
        self.importance_with(id, &ImportanceWeights::default())
    }

    /// Importance with custom weights. Unknown nodes score 0.
    pub fn importance_with(&self, id: &str, weights: &ImportanceWeights) -> f64 {
        self.explain_importance(id, weights)
            .map_or(0.0, |breakdown| breakdown.score)
    }

    /// Scores a node and reports how the score was reached.
    pub fn explain_importance(
        &self,
        id: &str,
        weights: &ImportanceWeights,
    ) -> Option<ImportanceBreakdown> {
        let node = self.get(id)?;
        let out_degree = self.out_degree(id);
        let in_degree = self.in_degree(id);
        let thematic_total = node.scores.total();

        let score = weights.out_degree * out_degree as f64
            + weights.in_degree * in_degree as f64
            + weights.thematic * f64::from(thematic_total);

        Some(ImportanceBreakdown {
            id: node.id.clone(),
            title: node.title.clone(),
            out_degree,
            in_degree,
            thematic_total,
            score,
        })
    }

    /// Every node scored, highest first; ties go to the smaller id.
    ///
    /// `limit` of 0 returns all nodes.
    pub fn rank_by_importance(
        &self,
        weights: &ImportanceWeights,
        limit: usize,
    ) -> Vec<ImportanceBreakdown> {
        let mut ranked: Vec<ImportanceBreakdown> = self
            .node_ids()
            .filter_map(|id| self.explain_importance(id, weights))
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        if limit > 0 {
            ranked.truncate(limit);
        }
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::{Dimension, Node, Score, TimelineDate};

    fn make_node(id: &str) -> Node {
        Node::new(id, id, TimelineDate::from_ymd(2000, 1, 1).unwrap(), "main")
    }

    #[test]
    fn test_importance_formula() {
        // n -> a, n -> b, c -> n
        let mut graph = TimelineGraph::new();
        graph
            .add_node(
                make_node("n")
                    .with_score(Dimension::Technical, Score::new(10).unwrap())
                    .with_score(Dimension::Societal, Score::new(5).unwrap()),
            )
            .unwrap();
        for id in ["a", "b", "c"] {
            graph.add_node(make_node(id)).unwrap();
        }
        graph.add_connection("n", "a");
        graph.add_connection("n", "b");
        graph.add_connection("c", "n");

        // 2*2 + 3*1 + 0.5*15
        assert_eq!(graph.importance("n"), 14.5);

        let breakdown = graph
            .explain_importance("n", &ImportanceWeights::default())
            .unwrap();
        assert_eq!(breakdown.out_degree, 2);
        assert_eq!(breakdown.in_degree, 1);
        assert_eq!(breakdown.thematic_total, 15);
        assert_eq!(
            breakdown.summary(),
            "Importance: 14.5 (out: 2, in: 1, thematic: 15)"
        );
    }

    #[test]
    fn test_missing_node_scores_zero() {
        let graph = TimelineGraph::new();
        assert_eq!(graph.importance("ghost"), 0.0);
        assert!(graph
            .explain_importance("ghost", &ImportanceWeights::default())
            .is_none());
    }

    #[test]
    fn test_isolated_node_scores_themes_only() {
        let mut graph = TimelineGraph::new();
        let solo = make_node("solo").with_score(Dimension::Philosophical, Score::new(7).unwrap());
        graph.add_node(solo).unwrap();
        assert_eq!(graph.importance("solo"), 3.5);
    }

    #[test]
    fn test_custom_weights() {
        let mut graph = TimelineGraph::new();
        graph.add_node(make_node("a")).unwrap();
        graph.add_node(make_node("b")).unwrap();
        graph.add_connection("a", "b");

        let weights = ImportanceWeights {
            out_degree: 0.0,
            in_degree: 10.0,
            thematic: 0.0,
        };
        assert_eq!(graph.importance_with("a", &weights), 0.0);
        assert_eq!(graph.importance_with("b", &weights), 10.0);
    }

    #[test]
    fn test_rank_by_importance() {
        // hub is pointed at by everyone
        let mut graph = TimelineGraph::new();
        for id in ["x", "hub", "y", "z"] {
            graph.add_node(make_node(id)).unwrap();
        }
        for id in ["x", "y", "z"] {
            graph.add_connection(id, "hub");
        }

        let ranked = graph.rank_by_importance(&ImportanceWeights::default(), 0);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["hub", "x", "y", "z"]);
        assert_eq!(ranked[0].score, 9.0);

        let top = graph.rank_by_importance(&ImportanceWeights::default(), 2);
        assert_eq!(top.len(), 2);
    }
}
