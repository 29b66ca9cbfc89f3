use thiserror::Error;

/// Errors from graph mutations.
///
/// Lookups never fail: a missing node yields an empty or neutral result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),
}
