//! The static dataset a timeline is built from.
//!
//! A dataset is a JSON document with three arrays: `branches`, `nodes` and
//! `connections`. Only `nodes` is required. Loading validates ids and
//! value ranges but deliberately does not check referential integrity:
//! dangling connection targets and unknown branch ids are the graph's
//! problem, and the graph treats them as absent.

use crate::branch::Branch;
use crate::connection::ConnectionRecord;
use crate::error::{DatasetError, Result};
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

const SAMPLE: &str = include_str!("../data/sample_timeline.json");

/// A complete timeline document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub branches: Vec<Branch>,

    pub nodes: Vec<Node>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<ConnectionRecord>,
}

impl Dataset {
    /// Parses and validates a dataset from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Reads a dataset file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&text)?;
        debug!(
            "Loaded {} nodes, {} branches from {}",
            dataset.nodes.len(),
            dataset.branches.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// The bundled sample timeline: a short history of AI plus two
    /// speculative futures.
    pub fn sample() -> Result<Self> {
        Self::from_json_str(SAMPLE)
    }

    /// Serializes the dataset as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects duplicate node or branch ids.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(DatasetError::DuplicateNode(node.id.clone()));
            }
        }

        let mut seen = HashSet::new();
        for branch in &self.branches {
            if !seen.insert(branch.id.as_str()) {
                return Err(DatasetError::DuplicateBranch(branch.id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sample_dataset_loads() {
        let dataset = Dataset::sample().unwrap();
        assert!(dataset.nodes.len() >= 10);
        assert!(dataset.branches.iter().any(|b| b.is_main));
        assert!(dataset
            .nodes
            .iter()
            .any(|n| n.title == "ELIZA - Early Natural Language Processing"));
    }

    #[test]
    fn test_minimal_document() {
        let dataset = Dataset::from_json_str(
            r#"{"nodes": [{"id": "a", "title": "A", "date": "1990", "branchId": "main"}]}"#,
        )
        .unwrap();
        assert_eq!(dataset.nodes.len(), 1);
        assert!(dataset.branches.is_empty());
        assert!(dataset.connections.is_empty());
    }

    #[test]
    fn test_duplicate_node_is_rejected() {
        let result = Dataset::from_json_str(
            r#"{"nodes": [
                {"id": "a", "title": "A", "date": "1990", "branchId": "main"},
                {"id": "a", "title": "A again", "date": "1991", "branchId": "main"}
            ]}"#,
        );
        assert!(matches!(result, Err(DatasetError::DuplicateNode(id)) if id == "a"));
    }

    #[test]
    fn test_bad_date_is_a_load_failure() {
        let result = Dataset::from_json_str(
            r#"{"nodes": [{"id": "a", "title": "A", "date": "soon", "branchId": "main"}]}"#,
        );
        assert!(matches!(result, Err(DatasetError::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "branches": [{{"id": "main", "name": "Main", "isMain": true}}],
                "nodes": [{{"id": "a", "title": "A", "date": "1990-02-03", "branchId": "main"}}],
                "connections": [{{"sourceId": "a", "targetId": "ghost", "style": "dashed"}}]
            }}"#
        )
        .unwrap();

        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.branches[0].id, "main");
        assert_eq!(dataset.connections[0].target_id, "ghost");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Dataset::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
