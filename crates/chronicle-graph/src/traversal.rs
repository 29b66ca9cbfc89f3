//! Breadth-first traversals over outgoing connections.
//!
//! Neighbours are always visited in connection order, so among several
//! shortest paths the one reached through earlier connections wins.

use crate::graph::{NodeId, TimelineGraph};
use chronicle_core::Connection;
use std::collections::{HashMap, HashSet, VecDeque};

impl TimelineGraph {
    /// Finds the shortest path (in edges) from `start` to `end`.
    ///
    /// Returns the ids along the path, both ends included, or `None` when
    /// `end` is unreachable or either node is unknown. `find_path(x, x)`
    /// is `[x]`.
    pub fn find_path(&self, start: &str, end: &str) -> Option<Vec<&str>> {
        let from = self.get_index(start)?;
        let to = self.get_index(end)?;
        if from == to {
            return Some(vec![self.id_of(from)?]);
        }

        let mut predecessor: HashMap<NodeId, NodeId> = HashMap::new();
        let mut visited: HashSet<NodeId> = HashSet::from([from]);
        let mut queue: VecDeque<NodeId> = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.outgoing_indices(current) {
                if !visited.insert(neighbor) {
                    continue;
                }
                predecessor.insert(neighbor, current);
                if neighbor == to {
                    return self.unwind(&predecessor, from, to);
                }
                queue.push_back(neighbor);
            }
        }

        None
    }

    /// Every node reachable from `start` over outgoing connections,
    /// including `start` itself. Empty for unknown ids.
    pub fn reachable_nodes(&self, start: &str) -> HashSet<&str> {
        let Some(from) = self.get_index(start) else {
            return HashSet::new();
        };

        let mut visited: HashSet<NodeId> = HashSet::from([from]);
        let mut queue: VecDeque<NodeId> = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.outgoing_indices(current) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        visited
            .into_iter()
            .filter_map(|index| self.id_of(index))
            .collect()
    }

    /// The connections walked by a path, in order. Hops that aren't
    /// connections are skipped.
    pub fn path_connections(&self, path: &[&str]) -> Vec<Connection> {
        path.windows(2)
            .filter_map(|pair| self.connection(pair[0], pair[1]))
            .collect()
    }

    /// Rebuilds the path from the predecessor map.
    fn unwind(
        &self,
        predecessor: &HashMap<NodeId, NodeId>,
        from: NodeId,
        to: NodeId,
    ) -> Option<Vec<&str>> {
        let mut path = vec![self.id_of(to)?];
        let mut current = to;
        while current != from {
            current = *predecessor.get(&current)?;
            path.push(self.id_of(current)?);
        }
        path.reverse();
        Some(path)
    }

    fn id_of(&self, index: NodeId) -> Option<&str> {
        self.get_by_index(index).map(|node| node.id.as_str())
    }
}
