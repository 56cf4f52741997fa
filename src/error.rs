//! Error types for the virtual filesystem.

use thiserror::Error;

/// Errors raised by the tree, the stub surface and the persistence bridge
#[derive(Debug, Error)]
pub enum VfsError {
    /// Missing parent container, file, directory or drive
    #[error("Not found: {0}")]
    NotFound(String),

    /// Name collision on create, move, rename or copy
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Operation not valid for the current tree state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Layout document held by a concurrent writer past the retry budget
    #[error("Layout document locked: {0}")]
    Locked(String),

    /// Type-specific operation against the wrong node kind
    #[error("Wrong node kind: {0}")]
    WrongNodeKind(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Watch error: {0}")]
    WatchError(String),
}

impl VfsError {
    pub(crate) fn could_not_find_part(path: &str) -> Self {
        VfsError::NotFound(format!("Could not find a part of the path '{}'.", path))
    }

    pub(crate) fn could_not_find_file(path: &str) -> Self {
        VfsError::NotFound(format!("Could not find file '{}'.", path))
    }
}

impl From<serde_json::Error> for VfsError {
    fn from(err: serde_json::Error) -> Self {
        VfsError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for VfsError {
    fn from(err: config::ConfigError) -> Self {
        VfsError::ConfigError(err.to_string())
    }
}

impl From<notify::Error> for VfsError {
    fn from(err: notify::Error) -> Self {
        VfsError::WatchError(err.to_string())
    }
}

impl From<VfsError> for std::io::Error {
    fn from(err: VfsError) -> Self {
        use std::io::ErrorKind;
        match err {
            VfsError::Io(err) => err,
            VfsError::NotFound(_) => std::io::Error::new(ErrorKind::NotFound, err.to_string()),
            VfsError::AlreadyExists(_) => {
                std::io::Error::new(ErrorKind::AlreadyExists, err.to_string())
            }
            VfsError::InvalidOperation(_) | VfsError::WrongNodeKind(_) => {
                std::io::Error::new(ErrorKind::InvalidInput, err.to_string())
            }
            other => std::io::Error::new(ErrorKind::Other, other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VfsError>;
