//! Search index for fast substring matching.
//!
//! An inverted n-gram index over node titles and descriptions. Each text
//! is lowercased, broken into overlapping n-grams and indexed; a query
//! intersects the postings of its own n-grams and then confirms the
//! candidates with a real substring check.

use crate::graph::NodeId;
use std::collections::{HashMap, HashSet};

/// Minimum n-gram length for indexing.
const MIN_NGRAM_LEN: usize = 2;

/// Maximum n-gram length for indexing.
const MAX_NGRAM_LEN: usize = 4;

/// An inverted index for case-insensitive substring search.
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    /// Maps lowercased texts to the nodes carrying them.
    texts: HashMap<String, Vec<NodeId>>,
    /// Maps lowercased n-grams to NodeIds.
    ngram_index: HashMap<String, HashSet<NodeId>>,
}

impl SearchIndex {
    /// Creates a new empty search index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a piece of text for a node. Empty text is ignored.
    pub fn insert(&mut self, text: &str, id: NodeId) {
        let lower = text.to_lowercase();
        if lower.is_empty() {
            return;
        }

        for ngram in generate_ngrams(&lower) {
            self.ngram_index.entry(ngram).or_default().insert(id);
        }
        self.texts.entry(lower).or_default().push(id);
    }

    /// Removes a piece of text previously indexed for a node.
    pub fn remove(&mut self, text: &str, id: NodeId) {
        let lower = text.to_lowercase();

        let Some(ids) = self.texts.get_mut(&lower) else {
            return;
        };
        if let Some(pos) = ids.iter().position(|&x| x == id) {
            ids.remove(pos);
        }
        // Another text of the same node may share n-grams with this one.
        let still_present = ids.contains(&id);
        if ids.is_empty() {
            self.texts.remove(&lower);
        }
        if still_present {
            return;
        }

        let remaining: Vec<String> = self
            .texts
            .iter()
            .filter(|(_, ids)| ids.contains(&id))
            .map(|(text, _)| text.clone())
            .collect();

        for ngram in generate_ngrams(&lower) {
            if remaining.iter().any(|text| text.contains(ngram.as_str())) {
                continue;
            }
            if let Some(ids) = self.ngram_index.get_mut(&ngram) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.ngram_index.remove(&ngram);
                }
            }
        }
    }

    /// Returns every node with a text containing `query`, case-insensitively.
    ///
    /// Output is sorted by index for determinism; callers reorder as needed.
    pub fn search(&self, query: &str) -> Vec<NodeId> {
        let query_lower = query.to_lowercase();
        if query_lower.is_empty() {
            return Vec::new();
        }

        // Too short for an n-gram: scan the texts directly.
        if query_lower.chars().count() < MIN_NGRAM_LEN {
            return self.scan(|text| text.contains(&query_lower), None);
        }

        let mut candidates: Option<HashSet<NodeId>> = None;
        for ngram in generate_ngrams(&query_lower) {
            let Some(ids) = self.ngram_index.get(&ngram) else {
                // If any n-gram has no postings, the query has no results
                return Vec::new();
            };
            match &mut candidates {
                None => candidates = Some(ids.clone()),
                Some(c) => c.retain(|id| ids.contains(id)),
            }
        }

        let candidates = candidates.unwrap_or_default();
        if candidates.is_empty() {
            return Vec::new();
        }

        // N-gram intersection can have false positives
        self.scan(|text| text.contains(&query_lower), Some(&candidates))
    }

    fn scan(
        &self,
        matches: impl Fn(&str) -> bool,
        candidates: Option<&HashSet<NodeId>>,
    ) -> Vec<NodeId> {
        let mut results: Vec<NodeId> = self
            .texts
            .iter()
            .filter(|(text, _)| matches(text))
            .flat_map(|(_, ids)| ids.iter().copied())
            .filter(|id| candidates.map_or(true, |c| c.contains(id)))
            .collect();
        results.sort();
        results.dedup();
        results
    }

    /// Returns the number of distinct texts indexed.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Generates n-grams for a lowercased string.
fn generate_ngrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut ngrams = Vec::new();

    for n in MIN_NGRAM_LEN..=MAX_NGRAM_LEN {
        if chars.len() >= n {
            for window in chars.windows(n) {
                ngrams.push(window.iter().collect());
            }
        }
    }

    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::stable_graph::NodeIndex;

    fn node_id(n: u32) -> NodeId {
        NodeIndex::new(n as usize)
    }

    #[test]
    fn test_insert_and_search_exact() {
        let mut index = SearchIndex::new();
        index.insert("Deep Blue Defeats Kasparov", node_id(0));
        index.insert("AlphaGo Defeats Lee Sedol", node_id(1));

        let results = index.search("deep blue defeats kasparov");
        assert_eq!(results, vec![node_id(0)]);
    }

    #[test]
    fn test_search_substring() {
        let mut index = SearchIndex::new();
        index.insert("Deep Blue Defeats Kasparov", node_id(0));
        index.insert("AlphaGo Defeats Lee Sedol", node_id(1));
        index.insert("Dartmouth Workshop", node_id(2));

        let results = index.search("defeats");
        assert_eq!(results, vec![node_id(0), node_id(1)]);
    }

    #[test]
    fn test_search_case_insensitive() {
        let mut index = SearchIndex::new();
        index.insert("ELIZA - Early Natural Language Processing", node_id(0));

        assert_eq!(index.search("eliza"), vec![node_id(0)]);
        assert_eq!(index.search("NATURAL language"), vec![node_id(0)]);
    }

    #[test]
    fn test_ngram_false_positive_filtered() {
        let mut index = SearchIndex::new();
        // Carries every n-gram of "abcde" but not the substring itself
        index.insert("abcdxbcde", node_id(0));
        index.insert("xxabcdexx", node_id(1));

        assert_eq!(index.search("abcde"), vec![node_id(1)]);
    }

    #[test]
    fn test_short_query_is_a_substring_match() {
        let mut index = SearchIndex::new();
        index.insert("ab", node_id(0));
        index.insert("cba", node_id(1));
        index.insert("xyz", node_id(2));

        // Not a prefix match: "cba" contains "a" too
        assert_eq!(index.search("a"), vec![node_id(0), node_id(1)]);
    }

    #[test]
    fn test_remove_from_index() {
        let mut index = SearchIndex::new();
        index.insert("foo", node_id(0));
        index.insert("foobar", node_id(1));

        index.remove("foo", node_id(0));

        let results = index.search("foo");
        assert_eq!(results, vec![node_id(1)]);
    }

    #[test]
    fn test_remove_keeps_shared_ngrams_of_other_text() {
        let mut index = SearchIndex::new();
        index.insert("perceptron", node_id(0));
        index.insert("the perceptron learns", node_id(0));

        index.remove("perceptron", node_id(0));
        assert_eq!(index.search("percep"), vec![node_id(0)]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_search_no_match() {
        let mut index = SearchIndex::new();
        index.insert("hello", node_id(0));

        assert!(index.search("world").is_empty());
        assert!(index.search("").is_empty());
        assert!(SearchIndex::new().is_empty());
    }
}
