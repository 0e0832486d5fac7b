//! Error types for Quire operations.
//!
//! This module provides a common `Error` type and `Result<T>` alias used across
//! all Quire crates. Uses `thiserror` for derive macros.
//!
//! Besides the usual I/O and configuration failures, the enum carries the
//! authoring mistakes a post file can contain: a front matter block that is
//! missing, unterminated or not a mapping ([`Error::MalformedMetadata`]), a
//! code fence that is never closed ([`Error::BrokenCodeFence`]), and a `date`
//! that is not a timestamp with an offset ([`Error::InvalidDate`]).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in Quire operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific file.
    #[error("I/O error on {path}: {source}")]
    IoWithPath {
        /// File the operation touched.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Content not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Front matter block missing, unterminated, or not a key-value mapping.
    #[error("Malformed metadata: {0}")]
    MalformedMetadata(String),

    /// A fenced code block opened on `line` is never closed.
    #[error("Broken code fence: block opened on line {line} is never closed")]
    BrokenCodeFence {
        /// 1-based line of the opening fence.
        line: usize,
    },

    /// A `date` value that is not a timestamp with a timezone offset.
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl Error {
    /// Wrap an I/O error.
    pub fn io(err: std::io::Error) -> Self {
        Self::Io(err)
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io_with_path(err: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::IoWithPath {
            path: path.as_ref().to_path_buf(),
            source: err,
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a malformed metadata error.
    pub fn malformed_metadata(msg: impl Into<String>) -> Self {
        Self::MalformedMetadata(msg.into())
    }

    /// Create a broken code fence error for the fence opened on `line`.
    pub fn broken_code_fence(line: usize) -> Self {
        Self::BrokenCodeFence { line }
    }

    /// Create an invalid date error.
    pub fn invalid_date(msg: impl Into<String>) -> Self {
        Self::InvalidDate(msg.into())
    }
}

/// Result type alias using Quire's Error type.
pub type Result<T> = std::result::Result<T, Error>;
