//! Error types, split by how the interpreter reacts to them.
//!
//! [`StorageError`] is fatal: the session ends. [`ExecuteError`] carries the
//! recoverable table outcomes next to a wrapped storage failure, and
//! [`PrepareError`] never reaches storage at all.

use std::io;
use thiserror::Error;

/// Unrecoverable pager or file failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Tried to fetch page number out of bounds: {page} >= {max}")]
    PageOutOfBounds { page: usize, max: usize },

    #[error("Tried to flush page {0}, which was never loaded")]
    FlushUnloadedPage(usize),

    #[error("Tried to flush {size} bytes of page {page}, pages hold {max}")]
    FlushTooLarge { page: usize, size: usize, max: usize },
}

/// Result of running a statement against the table.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Table full.")]
    TableFull,

    #[error("Table empty.")]
    TableEmpty,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ExecuteError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecuteError::Storage(_))
    }
}

/// Rejection of an input line before it becomes a statement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("ID must be a number.")]
    InvalidId,

    #[error("ID is out of range.")]
    IdOutOfRange,

    /// Username longer than [`crate::COLUMN_USERNAME_SIZE`] or email longer than
    /// [`crate::COLUMN_EMAIL_SIZE`] bytes.
    #[error("String is too long.")]
    StringTooLong,

    #[error("String must not contain NUL bytes.")]
    NulInString,

    #[error("Unrecognized command: {0}")]
    UnrecognizedStatement(String),
}
