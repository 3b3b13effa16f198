//! Error types for the outline document engine.

use crate::types::{IndexPath, NodeId};
use std::path::PathBuf;
use thiserror::Error;

/// Structural errors raised by the tree store. Each one rejects a single
/// operation and leaves the tree untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Invalid path: {0}")]
    InvalidPath(IndexPath),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("Cannot move node {0} into its own subtree")]
    MoveIntoDescendant(NodeId),

    #[error("Node {0} cannot be changed")]
    NotEditable(NodeId),
}

/// Errors raised while reading or decoding an import source
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read import source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode import source: {0}")]
    Decode(String),

    #[error("Unsupported import format: {0}")]
    UnsupportedFormat(String),

    #[error("Import aborted: {0}")]
    Tree(#[from] TreeError),
}

/// Errors raised by the persistence gateway
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Commit failed: {0}")]
    CommitFailure(String),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Top-level error surfaced to hosts
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
