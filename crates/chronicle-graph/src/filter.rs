//! Filter criteria and node filtering.
//!
//! Every filter is a pure predicate over a single node, so they compose as
//! a logical AND and the order they are applied in never matters.

use crate::graph::TimelineGraph;
use chronicle_core::{DateRange, Dimension, Node, TimelineDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-dimension filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub active: bool,
    /// Minimum score, `0..=10`. Zero disables the threshold.
    pub threshold: u8,
}

impl Default for DimensionFilter {
    fn default() -> Self {
        Self {
            active: true,
            threshold: 0,
        }
    }
}

impl DimensionFilter {
    /// True when this dimension actually narrows the result set.
    pub fn constrains(&self) -> bool {
        self.active && self.threshold > 0
    }
}

/// What the user has asked to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub dimensions: BTreeMap<Dimension, DimensionFilter>,

    /// Include nodes on non-main branches.
    pub show_all_branches: bool,

    #[serde(default)]
    pub date_range: DateRange,
}

impl Default for FilterCriteria {
    /// All known dimensions active at threshold 0, main timeline only.
    fn default() -> Self {
        Self {
            dimensions: Dimension::KNOWN
                .iter()
                .cloned()
                .map(|d| (d, DimensionFilter::default()))
                .collect(),
            show_all_branches: false,
            date_range: DateRange::default(),
        }
    }
}

impl FilterCriteria {
    /// Criteria that let every node through.
    pub fn unfiltered() -> Self {
        Self {
            show_all_branches: true,
            ..Self::default()
        }
    }

    /// Sets a minimum score for a dimension, activating it.
    pub fn with_threshold(mut self, dimension: Dimension, threshold: u8) -> Self {
        self.dimensions.insert(
            dimension,
            DimensionFilter {
                active: true,
                threshold: threshold.min(10),
            },
        );
        self
    }

    pub fn with_all_branches(mut self, show: bool) -> Self {
        self.show_all_branches = show;
        self
    }

    pub fn with_date_range(
        mut self,
        start: Option<TimelineDate>,
        end: Option<TimelineDate>,
    ) -> Self {
        self.date_range = DateRange::new(start, end);
        self
    }

    /// True if any filter narrows the full node set.
    pub fn is_active(&self) -> bool {
        !self.show_all_branches
            || !self.date_range.is_unbounded()
            || self.dimensions.values().any(DimensionFilter::constrains)
    }

    /// Tests one node. `on_main_timeline` is supplied by the caller since
    /// branch lookup lives on the graph.
    pub fn matches(&self, node: &Node, on_main_timeline: bool) -> bool {
        if !self.show_all_branches && !on_main_timeline {
            return false;
        }

        // A node missing an active dimension is dropped, not treated as 0.
        let meets_thresholds = self
            .dimensions
            .iter()
            .filter(|(_, filter)| filter.constrains())
            .all(|(dimension, filter)| {
                node.scores
                    .get(dimension)
                    .is_some_and(|score| score.value() >= filter.threshold)
            });
        if !meets_thresholds {
            return false;
        }

        self.date_range.contains(node.date)
    }

    /// Applies a partial update.
    pub fn merge(&mut self, update: FilterUpdate) {
        for (dimension, patch) in update.dimensions {
            let entry = self.dimensions.entry(dimension).or_default();
            if let Some(active) = patch.active {
                entry.active = active;
            }
            if let Some(threshold) = patch.threshold {
                entry.threshold = threshold.min(10);
            }
        }

        if let Some(show) = update.show_all_branches {
            self.show_all_branches = show;
        }

        if update.clear_date_range {
            self.date_range = DateRange::default();
        }
        if let Some(start) = update.date_start {
            self.date_range.start = Some(start);
        }
        if let Some(end) = update.date_end {
            self.date_range.end = Some(end);
        }
    }

    /// Returns a copy with `update` applied.
    pub fn merged(mut self, update: FilterUpdate) -> Self {
        self.merge(update);
        self
    }
}

/// Patch for one dimension's filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionUpdate {
    pub active: Option<bool>,
    pub threshold: Option<u8>,
}

/// A partial change to [`FilterCriteria`]. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    #[serde(default)]
    pub dimensions: BTreeMap<Dimension, DimensionUpdate>,
    pub show_all_branches: Option<bool>,
    pub date_start: Option<TimelineDate>,
    pub date_end: Option<TimelineDate>,

    /// Reset the date range before applying `date_start`/`date_end`.
    #[serde(default)]
    pub clear_date_range: bool,
}

impl FilterUpdate {
    pub fn threshold(mut self, dimension: Dimension, threshold: u8) -> Self {
        self.dimensions.entry(dimension).or_default().threshold = Some(threshold);
        self
    }

    pub fn toggle(mut self, dimension: Dimension, active: bool) -> Self {
        self.dimensions.entry(dimension).or_default().active = Some(active);
        self
    }

    pub fn show_all_branches(mut self, show: bool) -> Self {
        self.show_all_branches = Some(show);
        self
    }
}

impl TimelineGraph {
    /// Nodes passing every filter, in insertion order.
    pub fn filter_nodes(&self, criteria: &FilterCriteria) -> Vec<&Node> {
        self.nodes()
            .filter(|node| criteria.matches(node, self.is_main_timeline(&node.id)))
            .collect()
    }

    /// Narrows an existing selection of this graph's nodes.
    pub fn refine<'a>(&'a self, nodes: &[&'a Node], criteria: &FilterCriteria) -> Vec<&'a Node> {
        nodes
            .iter()
            .copied()
            .filter(|node| criteria.matches(node, self.is_main_timeline(&node.id)))
            .collect()
    }
}
