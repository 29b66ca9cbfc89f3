//! Chronicle Core - Timeline data model
//!
//! This crate defines the records a timeline is made of: events
//! ([`Node`]), the strands they belong to ([`Branch`]), directed
//! [`Connection`]s between them, and the [`Dataset`] document they are
//! loaded from.
//!
//! # Example
//!
//! ```
//! use chronicle_core::Dataset;
//!
//! let dataset = Dataset::sample().unwrap();
//! assert!(dataset.nodes.iter().any(|n| n.id == "eliza"));
//! ```

mod branch;
mod connection;
mod dataset;
mod date;
mod dimension;
pub mod error;
mod node;

pub use branch::Branch;
pub use connection::{Connection, ConnectionRecord, ConnectionStyle, LineStyle};
pub use dataset::Dataset;
pub use date::{DateRange, TimelineDate};
pub use dimension::{Dimension, Score, ThematicScores};
pub use error::{DatasetError, Result};
pub use node::{Node, NodeUpdate, Position};
