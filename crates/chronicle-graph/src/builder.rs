//! Graph builder for constructing the timeline graph from a dataset.
//!
//! The builder handles the multi-pass load:
//! 1. Register branches (membership emptied, restored later)
//! 2. Add every node, holding back its connection list
//! 3. Resolve the held-back lists into edges, now that forward
//!    references can be satisfied; the rest stay unresolved
//! 4. Apply explicit connection records, upgrading the style of edges
//!    that already exist
//! 5. Restore each branch's declared member order

use crate::edge::Edge;
use crate::error::GraphError;
use crate::graph::TimelineGraph;
use chronicle_core::{Branch, ConnectionRecord, Dataset, Node};
use std::collections::HashSet;
use tracing::{debug, info};

/// Builds a [`TimelineGraph`] from dataset records.
pub struct GraphBuilder {
    graph: TimelineGraph,
    /// Connection lists held back until every node exists.
    pending: Vec<(String, Vec<String>)>,
    records: Vec<ConnectionRecord>,
    /// Declared branch membership, by branch id.
    declared_members: Vec<(String, Vec<String>)>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            graph: TimelineGraph::new(),
            pending: Vec::new(),
            records: Vec::new(),
            declared_members: Vec::new(),
        }
    }

    /// Registers branches. Duplicates after the first are ignored.
    pub fn add_branches(&mut self, branches: Vec<Branch>) {
        for mut branch in branches {
            let declared = std::mem::take(&mut branch.node_ids);
            let id = branch.id.clone();
            if self.graph.add_branch(branch) {
                self.declared_members.push((id, declared));
            } else {
                debug!("Ignoring duplicate branch '{}'", id);
            }
        }
    }

    /// Adds nodes. Their connections are resolved in [`build`](Self::build).
    pub fn add_nodes(&mut self, nodes: Vec<Node>) -> Result<(), GraphError> {
        for mut node in nodes {
            let targets = std::mem::take(&mut node.connections);
            let id = node.id.clone();
            self.graph.add_node(node)?;
            if !targets.is_empty() {
                self.pending.push((id, targets));
            }
        }
        Ok(())
    }

    /// Queues explicit connection records.
    pub fn add_connections(&mut self, records: Vec<ConnectionRecord>) {
        self.records.extend(records);
    }

    /// Resolves connections and returns the finished graph.
    pub fn build(mut self) -> TimelineGraph {
        let pending = std::mem::take(&mut self.pending);
        for (source, targets) in pending {
            for target in targets {
                self.graph.connect_or_defer(&source, &target, Edge::new());
            }
        }

        let records = std::mem::take(&mut self.records);
        for record in &records {
            self.graph.connect_or_defer(&record.source_id, &record.target_id, Edge::from(record));
        }

        let declared = std::mem::take(&mut self.declared_members);
        for (branch_id, members) in declared {
            self.restore_member_order(&branch_id, members);
        }

        let stats = self.graph.stats();
        info!(
            "Built timeline graph: {} nodes, {} connections, {} branches, {} unresolved",
            stats.node_count, stats.edge_count, stats.branch_count, stats.dangling_references
        );
        self.graph
    }

    /// Declared members first, in declared order, then everyone else who
    /// joined through their `branch_id`.
    fn restore_member_order(&mut self, branch_id: &str, declared: Vec<String>) {
        let existing: Vec<String> = declared
            .into_iter()
            .filter(|id| {
                let known = self.graph.contains(id);
                if !known {
                    debug!("Branch '{}' lists unknown node '{}'", branch_id, id);
                }
                known
            })
            .collect();

        let Some(branch) = self.graph.branches.iter_mut().find(|b| b.id == branch_id) else {
            return;
        };

        let mut seen = HashSet::new();
        let mut ordered: Vec<String> = existing
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        ordered.extend(
            branch
                .node_ids
                .iter()
                .filter(|id| !seen.contains(*id))
                .cloned(),
        );
        branch.node_ids = ordered;
    }
}

impl TimelineGraph {
    /// Builds a graph from a loaded dataset.
    pub fn from_dataset(dataset: Dataset) -> Result<Self, GraphError> {
        let mut builder = GraphBuilder::new();
        builder.add_branches(dataset.branches);
        builder.add_nodes(dataset.nodes)?;
        builder.add_connections(dataset.connections);
        Ok(builder.build())
    }
}
