//! Branch index.
//!
//! Branches group nodes into timeline strands. Membership is kept on the
//! [`Branch`] records themselves and maintained by every graph mutation.
//! A node whose `branch_id` names no known branch belongs to the
//! [`BranchRef::Unknown`] pseudo-branch, which only matters for display:
//! graph queries treat such a node like any other.

use crate::graph::TimelineGraph;
use chronicle_core::{Branch, Node};
use std::collections::HashSet;
use tracing::debug;

/// Id reported for nodes whose branch is missing.
pub const UNKNOWN_BRANCH_ID: &str = "other";

/// Display name for the unknown pseudo-branch.
pub const UNKNOWN_BRANCH_NAME: &str = "Other";

/// The branch a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BranchRef<'a> {
    Known(&'a Branch),
    /// The node's `branch_id` doesn't match any branch.
    Unknown,
}

impl<'a> BranchRef<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            BranchRef::Known(branch) => &branch.id,
            BranchRef::Unknown => UNKNOWN_BRANCH_ID,
        }
    }

    pub fn name(&self) -> &'a str {
        match *self {
            BranchRef::Known(branch) => &branch.name,
            BranchRef::Unknown => UNKNOWN_BRANCH_NAME,
        }
    }

    pub fn is_main(&self) -> bool {
        matches!(self, BranchRef::Known(branch) if branch.is_main)
    }
}

impl TimelineGraph {
    /// All branches in declaration order.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn branch(&self, id: &str) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// The first branch flagged as the main timeline.
    pub fn main_branch(&self) -> Option<&Branch> {
        self.branches.iter().find(|b| b.is_main)
    }

    /// Branches forking off `parent_id`.
    pub fn child_branches(&self, parent_id: &str) -> Vec<&Branch> {
        self.branches
            .iter()
            .filter(|b| b.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// Registers a branch and adopts existing nodes that name it.
    ///
    /// Ids already listed in `branch.node_ids` are kept in that order if
    /// they exist. Returns false if a branch with this id is already known.
    pub fn add_branch(&mut self, mut branch: Branch) -> bool {
        if self.branch(&branch.id).is_some() {
            return false;
        }

        let mut seen = HashSet::new();
        let declared = std::mem::take(&mut branch.node_ids);
        for id in declared {
            if !self.contains(&id) {
                debug!("Branch '{}' lists unknown node '{}'", branch.id, id);
            } else if seen.insert(id.clone()) {
                branch.node_ids.push(id);
            }
        }

        let adopted: Vec<String> = self
            .nodes()
            .filter(|node| node.branch_id == branch.id && !seen.contains(&node.id))
            .map(|node| node.id.clone())
            .collect();
        branch.node_ids.extend(adopted);

        self.branches.push(branch);
        true
    }

    /// Removes a branch. Its nodes fall back to the unknown pseudo-branch.
    pub fn remove_branch(&mut self, id: &str) -> Option<Branch> {
        let position = self.branches.iter().position(|b| b.id == id)?;
        Some(self.branches.remove(position))
    }

    /// Which branch a node belongs to. `None` if the node doesn't exist.
    pub fn branch_of(&self, node_id: &str) -> Option<BranchRef<'_>> {
        let node = self.get(node_id)?;
        Some(match self.branch(&node.branch_id) {
            Some(branch) => BranchRef::Known(branch),
            None => BranchRef::Unknown,
        })
    }

    /// True if the node exists and sits on a main-timeline branch.
    pub fn is_main_timeline(&self, node_id: &str) -> bool {
        self.branch_of(node_id).is_some_and(|b| b.is_main())
    }

    /// Members of a branch, in membership order. Empty for unknown ids.
    pub fn nodes_in_branch(&self, branch_id: &str) -> Vec<&Node> {
        self.branch(branch_id)
            .map(|branch| {
                branch
                    .node_ids
                    .iter()
                    .filter_map(|id| self.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Nodes that belong to the unknown pseudo-branch.
    pub fn unassigned_nodes(&self) -> Vec<&Node> {
        self.nodes()
            .filter(|node| self.branch(&node.branch_id).is_none())
            .collect()
    }
}
