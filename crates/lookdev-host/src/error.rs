//! Host error types.

use thiserror::Error;

use crate::node::{NodeId, NodeType};

/// Result alias for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// An unrecoverable failure reported by the host scene API.
#[derive(Debug, Error)]
pub enum HostError {
    /// The handle does not refer to a live node.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// The node exists but has the wrong type for the operation.
    #[error("node {node} is a {actual}, expected a {expected}")]
    WrongType {
        /// Offending node.
        node: NodeId,
        /// Type the operation needs.
        expected: NodeType,
        /// Type the node actually has.
        actual: NodeType,
    },

    /// Saving was requested but the scene has no file path yet.
    #[error("scene has no file path")]
    NoScenePath,

    /// The host refused the operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Filesystem error while reading or writing scene or cache files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene or cache serialization failure.
    #[error("failed to serialize: {0}")]
    Serialize(#[from] ron::Error),

    /// Scene or cache file could not be parsed.
    #[error("failed to parse: {0}")]
    Parse(#[from] ron::error::SpannedError),
}
