//! Core graph data structure.
//!
//! `TimelineGraph` wraps a petgraph `StableDiGraph` and adds the indexes a
//! timeline needs: id lookup, insertion order, branch membership and a
//! text index for search. It is an explicitly owned value; every query
//! takes it by reference.
//!
//! Each node's `connections` list mirrors its outgoing edges in insertion
//! order. Every mutation keeps the two in step, and incoming edges give
//! the reverse adjacency for free.
//!
//! Connections naming a node that doesn't exist yet are parked as
//! unresolved and become edges as soon as both endpoints are present.

use crate::edge::Edge;
use crate::error::GraphError;
use crate::search_index::SearchIndex;
use chronicle_core::{Branch, Connection, ConnectionRecord, Dataset, Node, NodeUpdate};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Internal handle for a node in the graph.
pub type NodeId = NodeIndex;

/// The timeline graph: nodes, directed connections and branches.
#[derive(Debug, Clone, Default)]
pub struct TimelineGraph {
    /// The underlying petgraph graph. Stable indices survive deletes.
    pub(crate) graph: StableDiGraph<Node, Edge>,

    /// Maps string ids to graph indexes.
    id_index: HashMap<String, NodeId>,

    /// Node indexes in insertion order.
    order: Vec<NodeId>,

    /// Branch metadata and membership, in declaration order.
    pub(crate) branches: Vec<Branch>,

    /// N-gram index over titles and descriptions.
    search: SearchIndex,

    /// Connections waiting for a missing endpoint, in the order seen.
    unresolved: Vec<PendingConnection>,
}

/// A connection whose source or target is not in the graph yet.
#[derive(Debug, Clone)]
struct PendingConnection {
    source: String,
    target: String,
    edge: Edge,
}

impl TimelineGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    ///
    /// Targets in `node.connections` that already exist become edges.
    /// The rest stay unresolved until a node with that id is added, and
    /// any unresolved connection pointing at this node is connected now.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        if self.id_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }

        let targets = std::mem::take(&mut node.connections);
        let id = node.id.clone();
        let branch_id = node.branch_id.clone();

        let index = self.graph.add_node(node);
        self.id_index.insert(id.clone(), index);
        self.order.push(index);
        self.index_text(index);

        if !self.join_branch(&id, &branch_id) {
            debug!("Node '{}' references unknown branch '{}'", id, branch_id);
        }

        for target in targets {
            self.connect_or_defer(&id, &target, Edge::new());
        }
        self.resolve_pending();

        Ok(index)
    }

    /// Removes a node and everything that points at it.
    ///
    /// The node disappears from every other node's outgoing list and from
    /// every branch's membership list. Returns false if it didn't exist.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let Some(index) = self.id_index.remove(id) else {
            return false;
        };

        let sources: Vec<NodeId> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .filter(|&source| source != index)
            .collect();
        for source in &sources {
            if let Some(node) = self.graph.node_weight_mut(*source) {
                node.connections.retain(|target| target != id);
            }
        }

        self.unindex_text(index);
        self.graph.remove_node(index);
        self.order.retain(|&i| i != index);
        for branch in &mut self.branches {
            branch.node_ids.retain(|member| member != id);
        }
        self.unresolved
            .retain(|pending| pending.source != id && pending.target != id);

        debug!(
            "Deleted node '{}' ({} incoming connections removed)",
            id,
            sources.len()
        );
        true
    }

    /// Applies a partial update to a node. Returns false if it doesn't exist.
    pub fn update_node(&mut self, id: &str, update: NodeUpdate) -> bool {
        let Some(index) = self.get_index(id) else {
            return false;
        };

        let reindex = update.touches_text();
        if reindex {
            self.unindex_text(index);
        }

        let old_branch = self.graph[index].branch_id.clone();
        update.apply_to(&mut self.graph[index]);
        let new_branch = self.graph[index].branch_id.clone();

        if reindex {
            self.index_text(index);
        }
        if new_branch != old_branch {
            if let Some(branch) = self.branches.iter_mut().find(|b| b.id == old_branch) {
                branch.node_ids.retain(|member| member != id);
            }
            self.join_branch(id, &new_branch);
        }

        true
    }

    /// Adds a plain connection from `source` to `target`.
    ///
    /// Idempotent: returns false without changing anything if the edge
    /// already exists or either endpoint is missing. A node may point at
    /// itself.
    pub fn add_connection(&mut self, source: &str, target: &str) -> bool {
        self.add_connection_with(source, target, Edge::new())
    }

    /// Adds a connection carrying an id and display style.
    pub fn add_connection_with(&mut self, source: &str, target: &str, edge: Edge) -> bool {
        let (Some(from), Some(to)) = (self.get_index(source), self.get_index(target)) else {
            warn!("Cannot connect '{}' -> '{}': unknown node", source, target);
            return false;
        };
        if self.graph.find_edge(from, to).is_some() {
            debug!("Connection '{}' -> '{}' already exists", source, target);
            return false;
        }

        self.graph.add_edge(from, to, edge);
        self.graph[from].connections.push(target.to_string());
        true
    }

    /// Replaces the metadata on an existing connection.
    pub fn set_connection_style(&mut self, source: &str, target: &str, edge: Edge) -> bool {
        let Some(edge_index) = self.find_edge(source, target) else {
            return false;
        };
        match self.graph.edge_weight_mut(edge_index) {
            Some(weight) => {
                *weight = edge;
                true
            }
            None => false,
        }
    }

    /// Removes a connection, resolved or not. No-op (false) if it doesn't
    /// exist.
    pub fn remove_connection(&mut self, source: &str, target: &str) -> bool {
        let Some(edge_index) = self.find_edge(source, target) else {
            let before = self.unresolved.len();
            self.unresolved
                .retain(|pending| pending.source != source || pending.target != target);
            return self.unresolved.len() != before;
        };
        let Some((from, _)) = self.graph.edge_endpoints(edge_index) else {
            return false;
        };

        self.graph.remove_edge(edge_index);
        self.graph[from].connections.retain(|t| t != target);
        true
    }

    /// Gets a node by its string id.
    pub fn get(&self, id: &str) -> Option<&Node> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a node by its graph index.
    pub fn get_by_index(&self, index: NodeId) -> Option<&Node> {
        self.graph.node_weight(index)
    }

    /// Gets the node index for a string id.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.order
            .iter()
            .filter_map(|&index| self.graph.node_weight(index))
    }

    /// Iterates over all node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes().map(|node| node.id.as_str())
    }

    /// Ids this node points at, in the order the connections were added.
    pub fn outgoing(&self, id: &str) -> Vec<&str> {
        self.get(id)
            .map(|node| node.connections.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Ids of other nodes pointing at this one, in insertion order.
    pub fn incoming(&self, id: &str) -> Vec<&str> {
        let Some(index) = self.get_index(id) else {
            return Vec::new();
        };
        let sources: HashSet<NodeId> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .filter(|&source| source != index)
            .collect();

        self.order
            .iter()
            .filter(|i| sources.contains(i))
            .filter_map(|&i| self.graph.node_weight(i))
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Number of outgoing connections; 0 for unknown ids.
    pub fn out_degree(&self, id: &str) -> usize {
        self.get(id).map_or(0, |node| node.connections.len())
    }

    /// Number of other nodes pointing at this one; 0 for unknown ids.
    pub fn in_degree(&self, id: &str) -> usize {
        self.get_index(id).map_or(0, |index| {
            self.graph
                .neighbors_directed(index, Direction::Incoming)
                .filter(|&source| source != index)
                .count()
        })
    }

    /// Case-insensitive substring search over titles and descriptions.
    ///
    /// An empty (or all-whitespace) term matches nothing. Results come
    /// back in insertion order, unranked.
    pub fn search_nodes(&self, term: &str) -> Vec<&Node> {
        if term.trim().is_empty() {
            return Vec::new();
        }

        let hits: HashSet<NodeId> = self.search.search(term).into_iter().collect();
        self.order
            .iter()
            .filter(|index| hits.contains(index))
            .filter_map(|&index| self.graph.node_weight(index))
            .collect()
    }

    /// The connection from `source` to `target`, if present.
    pub fn connection(&self, source: &str, target: &str) -> Option<Connection> {
        let edge_index = self.find_edge(source, target)?;
        let weight = self.graph.edge_weight(edge_index)?;
        Some(Connection {
            id: weight.id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            style: weight.style.clone(),
        })
    }

    /// All connections flattened to `{source, target, style}`, ordered by
    /// source node and then by connection order.
    pub fn connections(&self) -> Vec<Connection> {
        self.nodes()
            .flat_map(|node| {
                node.connections
                    .iter()
                    .filter_map(move |target| self.connection(&node.id, target))
            })
            .collect()
    }

    /// How many connections are still waiting for a missing endpoint.
    pub fn dangling_references(&self) -> usize {
        self.unresolved.len()
    }

    /// Exports the graph back to the dataset document shape.
    ///
    /// Per-node connection lists are regenerated from the edges; edges with
    /// an id or a non-default style are also written as explicit records.
    /// Unresolved connections are written out too, so reloading the export
    /// keeps them waiting.
    pub fn to_dataset(&self) -> Dataset {
        let mut nodes: Vec<Node> = self.nodes().cloned().collect();
        let mut connections: Vec<ConnectionRecord> = self
            .connections()
            .into_iter()
            .filter(|c| c.id.is_some() || !c.style.is_plain())
            .map(|c| ConnectionRecord {
                id: c.id,
                source_id: c.source,
                target_id: c.target,
                style: Some(c.style.line),
                label: c.style.label,
            })
            .collect();

        for pending in &self.unresolved {
            let owner = nodes.iter_mut().find(|node| node.id == pending.source);
            match owner {
                Some(node) if pending.edge.is_plain() => {
                    node.connections.push(pending.target.clone())
                }
                _ => connections.push(pending.edge.to_record(&pending.source, &pending.target)),
            }
        }

        Dataset {
            branches: self.branches.clone(),
            nodes,
            connections,
        }
    }

    pub(crate) fn find_edge(
        &self,
        source: &str,
        target: &str,
    ) -> Option<petgraph::stable_graph::EdgeIndex> {
        let from = self.get_index(source)?;
        let to = self.get_index(target)?;
        self.graph.find_edge(from, to)
    }

    /// Outgoing neighbours as indexes, in connection order.
    pub(crate) fn outgoing_indices(&self, index: NodeId) -> Vec<NodeId> {
        self.graph
            .node_weight(index)
            .map(|node| {
                node.connections
                    .iter()
                    .filter_map(|target| self.get_index(target))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Connects two nodes, or parks the connection until both exist.
    ///
    /// A repeated pair keeps one connection; explicit metadata on the
    /// repeat replaces a plain edge's.
    pub(crate) fn connect_or_defer(&mut self, source: &str, target: &str, edge: Edge) {
        if self.contains(source) && self.contains(target) {
            if self.find_edge(source, target).is_some() {
                if !edge.is_plain() {
                    self.set_connection_style(source, target, edge);
                }
            } else {
                self.add_connection_with(source, target, edge);
            }
            return;
        }

        if let Some(pending) = self
            .unresolved
            .iter_mut()
            .find(|pending| pending.source == source && pending.target == target)
        {
            if !edge.is_plain() {
                pending.edge = edge;
            }
            return;
        }

        let missing = if self.contains(source) { target } else { source };
        warn!(
            "Connection '{}' -> '{}' waits for missing node '{}'",
            source, target, missing
        );
        self.unresolved.push(PendingConnection {
            source: source.to_string(),
            target: target.to_string(),
            edge,
        });
    }

    /// Connects every parked connection whose endpoints now both exist.
    fn resolve_pending(&mut self) {
        let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.unresolved)
            .into_iter()
            .partition(|pending| {
                self.contains(&pending.source) && self.contains(&pending.target)
            });
        self.unresolved = waiting;

        for pending in ready {
            debug!(
                "Resolved connection '{}' -> '{}'",
                pending.source, pending.target
            );
            self.connect_or_defer(&pending.source, &pending.target, pending.edge);
        }
    }

    /// Adds `node_id` to the branch's membership. False if the branch is unknown.
    pub(crate) fn join_branch(&mut self, node_id: &str, branch_id: &str) -> bool {
        match self.branches.iter_mut().find(|b| b.id == branch_id) {
            Some(branch) => {
                if !branch.contains(node_id) {
                    branch.node_ids.push(node_id.to_string());
                }
                true
            }
            None => false,
        }
    }

    fn index_text(&mut self, index: NodeId) {
        if let Some(node) = self.graph.node_weight(index) {
            self.search.insert(&node.title, index);
            self.search.insert(&node.description, index);
        }
    }

    fn unindex_text(&mut self, index: NodeId) {
        if let Some(node) = self.graph.node_weight(index) {
            self.search.remove(&node.title, index);
            self.search.remove(&node.description, index);
        }
    }
}

/// Graph statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub branch_count: usize,
    pub dangling_references: usize,
}

impl TimelineGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            branch_count: self.branches.len(),
            dangling_references: self.dangling_references(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::{Dimension, LineStyle, Score, TimelineDate};

    fn node(id: &str) -> Node {
        let date = TimelineDate::from_ymd(2000, 1, 1).unwrap();
        Node::new(id, id.to_uppercase(), date, "main")
    }

    fn chain() -> TimelineGraph {
        // a -> b -> c, d isolated
        let mut graph = TimelineGraph::new();
        graph.branches.push(Branch::new("main", "Main", true));
        for id in ["a", "b", "c", "d"] {
            graph.add_node(node(id)).unwrap();
        }
        graph.add_connection("a", "b");
        graph.add_connection("b", "c");
        graph
    }

    #[test]
    fn test_add_and_lookup() {
        let graph = chain();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.get("b").unwrap().title, "B");
        assert!(graph.get("zzz").is_none());
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = chain();
        let err = graph.add_node(node("a")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("a".to_string()));
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_add_connection_is_idempotent() {
        let mut graph = chain();
        assert!(graph.add_connection("a", "c"));
        assert!(!graph.add_connection("a", "c"));
        assert_eq!(graph.outgoing("a"), vec!["b", "c"]);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_add_connection_rejects_missing() {
        let mut graph = chain();
        assert!(!graph.add_connection("a", "ghost"));
        assert!(!graph.add_connection("ghost", "a"));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.dangling_references(), 0);
    }

    #[test]
    fn test_self_connection_counts_as_outgoing_only() {
        let mut graph = chain();
        assert!(graph.add_connection("a", "a"));
        assert!(!graph.add_connection("a", "a"));

        assert_eq!(graph.outgoing("a"), vec!["b", "a"]);
        assert_eq!(graph.out_degree("a"), 2);
        assert_eq!(graph.in_degree("a"), 0);
        assert!(graph.incoming("a").is_empty());
        assert_eq!(graph.find_path("a", "c"), Some(vec!["a", "b", "c"]));

        assert!(graph.delete_node("a"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_connection() {
        let mut graph = chain();
        assert!(graph.remove_connection("a", "b"));
        assert!(!graph.remove_connection("a", "b"));
        assert!(graph.outgoing("a").is_empty());
        assert_eq!(graph.in_degree("b"), 0);
    }

    #[test]
    fn test_dangling_targets_on_insert() {
        let mut graph = chain();
        let e = node("e").with_connections(vec!["a".into(), "nowhere".into()]);
        graph.add_node(e).unwrap();

        assert_eq!(graph.outgoing("e"), vec!["a"]);
        assert_eq!(graph.dangling_references(), 1);
        assert_eq!(graph.get("e").unwrap().connections, vec!["a".to_string()]);
    }

    #[test]
    fn test_forward_reference_resolves_when_target_arrives() {
        let mut graph = TimelineGraph::new();
        graph
            .add_node(node("a").with_connections(vec!["b".into()]))
            .unwrap();
        assert_eq!(graph.find_path("a", "b"), None);
        assert_eq!(graph.dangling_references(), 1);

        graph.add_node(node("b")).unwrap();
        assert_eq!(graph.find_path("a", "b"), Some(vec!["a", "b"]));
        assert_eq!(graph.outgoing("a"), vec!["b"]);
        assert_eq!(graph.get("a").unwrap().connections, vec!["b".to_string()]);
        assert_eq!(graph.dangling_references(), 0);
    }

    #[test]
    fn test_unresolved_connections_export_and_cleanup() {
        let mut graph = chain();
        graph
            .add_node(node("e").with_connections(vec!["a".into(), "later".into()]))
            .unwrap();
        graph.add_node(node("f").with_connections(vec!["gone".into()])).unwrap();

        let dataset = graph.to_dataset();
        let e = dataset.nodes.iter().find(|n| n.id == "e").unwrap();
        assert_eq!(e.connections, vec!["a".to_string(), "later".to_string()]);
        let reloaded = TimelineGraph::from_dataset(dataset).unwrap();
        assert_eq!(reloaded.dangling_references(), 2);

        assert!(graph.remove_connection("f", "gone"));
        assert!(!graph.remove_connection("f", "gone"));
        assert!(graph.delete_node("e"));
        assert_eq!(graph.dangling_references(), 0);

        graph.add_node(node("later")).unwrap();
        assert_eq!(graph.in_degree("later"), 0);
    }

    #[test]
    fn test_delete_node_cascades() {
        let mut graph = chain();
        graph.add_connection("d", "b");
        assert!(graph.delete_node("b"));

        assert!(!graph.contains("b"));
        assert!(graph.outgoing("a").is_empty());
        assert!(graph.outgoing("d").is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.branches[0].contains("b"));
        assert!(graph.search_nodes("b").is_empty());
        assert!(!graph.delete_node("b"));
    }

    #[test]
    fn test_index_reuse_after_delete_keeps_order() {
        let mut graph = chain();
        graph.delete_node("a");
        graph.add_node(node("z")).unwrap();
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec!["b", "c", "d", "z"]);
        assert!(graph.outgoing("z").is_empty());
    }

    #[test]
    fn test_degrees() {
        let mut graph = chain();
        graph.add_connection("d", "b");
        assert_eq!(graph.out_degree("a"), 1);
        assert_eq!(graph.in_degree("b"), 2);
        assert_eq!(graph.incoming("b"), vec!["a", "d"]);
        assert_eq!(graph.in_degree("ghost"), 0);
        assert_eq!(graph.out_degree("ghost"), 0);
    }

    #[test]
    fn test_search_nodes() {
        let mut graph = TimelineGraph::new();
        graph
            .add_node(
                Node::new(
                    "eliza",
                    "ELIZA - Early Natural Language Processing",
                    TimelineDate::from_ymd(1966, 1, 1).unwrap(),
                    "main",
                )
                .with_description("Pattern matching therapist"),
            )
            .unwrap();
        graph.add_node(node("x").with_description("mentions a THERAPIST too")).unwrap();

        assert!(graph.search_nodes("").is_empty());
        assert!(graph.search_nodes("   ").is_empty());
        assert_eq!(graph.search_nodes("eliza")[0].id, "eliza");
        let ids: Vec<_> = graph
            .search_nodes("therapist")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(ids, vec!["eliza", "x"]);
    }

    #[test]
    fn test_update_node_reindexes() {
        let mut graph = chain();
        let update = NodeUpdate {
            title: Some("Renamed event".into()),
            scores: vec![(Dimension::Technical, Score::new(4).unwrap())],
            ..Default::default()
        };
        assert!(graph.update_node("a", update));
        assert_eq!(graph.search_nodes("renamed")[0].id, "a");
        assert!(!graph.update_node("ghost", NodeUpdate::default()));
    }

    #[test]
    fn test_update_node_moves_branch_membership() {
        let mut graph = chain();
        graph.branches.push(Branch::new("future", "Future", false));
        let update = NodeUpdate {
            branch_id: Some("future".into()),
            ..Default::default()
        };
        graph.update_node("c", update);
        assert!(!graph.branches[0].contains("c"));
        assert!(graph.branches[1].contains("c"));
    }

    #[test]
    fn test_connections_flatten_with_style() {
        let mut graph = chain();
        let styled = Edge {
            id: Some("conn-1".into()),
            style: chronicle_core::ConnectionStyle {
                line: LineStyle::Dashed,
                label: Some("inspired".into()),
            },
        };
        assert!(graph.set_connection_style("b", "c", styled));

        let connections = graph.connections();
        assert_eq!(connections.len(), 2);
        assert_eq!(connections[0].source, "a");
        assert_eq!(connections[1].id.as_deref(), Some("conn-1"));
        assert_eq!(connections[1].style.line, LineStyle::Dashed);

        let dataset = graph.to_dataset();
        assert_eq!(dataset.nodes.len(), 4);
        assert_eq!(dataset.connections.len(), 1);
        assert_eq!(dataset.connections[0].source_id, "b");
    }

    #[test]
    fn test_stats() {
        let graph = chain();
        let stats = graph.stats();
        assert_eq!(stats.node_count, 4);
        assert_eq!(stats.edge_count, 2);
        assert_eq!(stats.branch_count, 1);
        assert_eq!(stats.dangling_references, 0);
    }
}
