//! Error types for phi_merkle

use thiserror::Error;

/// Result type alias for phi_merkle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building leaves, trees and proofs
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Cannot build a tree from an empty leaf set")]
    EmptyLeafSet,

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Leaf index {index} out of range for {len} leaves")]
    LeafIndexOutOfRange { index: usize, len: usize },

    #[error("Config error: {0}")]
    Config(String),
}
