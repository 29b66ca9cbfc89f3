//! Chronicle Graph - Timeline graph store and queries
//!
//! This crate owns the timeline as a directed graph of events and answers
//! questions about it: filtering, text search, shortest paths,
//! reachability and importance scoring.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Id lookups and insertion order
//! - Branch membership
//! - N-gram text search over titles and descriptions
//!
//! There is no global store. A [`TimelineGraph`] is an ordinary value and
//! every query borrows it.
//!
//! # Example
//!
//! ```
//! use chronicle_core::Dataset;
//! use chronicle_graph::{FilterCriteria, TimelineGraph};
//!
//! let graph = TimelineGraph::from_dataset(Dataset::sample().unwrap()).unwrap();
//!
//! let path = graph.find_path("turing-test", "llm-era").unwrap();
//! assert_eq!(path.first(), Some(&"turing-test"));
//!
//! let visible = graph.filter_nodes(&FilterCriteria::default());
//! assert!(visible.iter().all(|n| graph.is_main_timeline(&n.id)));
//! ```

mod branch_index;
mod builder;
mod edge;
mod error;
mod filter;
mod graph;
mod importance;
mod search_index;
mod traversal;
mod view;

pub use branch_index::{BranchRef, UNKNOWN_BRANCH_ID, UNKNOWN_BRANCH_NAME};
pub use builder::GraphBuilder;
pub use edge::Edge;
pub use error::GraphError;
pub use filter::{DimensionFilter, DimensionUpdate, FilterCriteria, FilterUpdate};
pub use graph::{GraphStats, NodeId, TimelineGraph};
pub use importance::{ImportanceBreakdown, ImportanceWeights};
pub use search_index::SearchIndex;
pub use view::{ViewConfig, ViewState};
