//! 索引构建与查找的错误类型

use thiserror::Error;

/// Result type alias for seqindex operations
pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    /// I/O error, passed through unchanged
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record framing violated at the given byte offset / 1-based line.
    /// `line` is 0 when the error comes from re-parsing a single indexed
    /// record, where the file line is not known.
    #[error("malformed record at byte {offset} (line {line}): {msg}")]
    Format { offset: u64, line: u64, msg: String },

    /// Lookup of a key the index does not hold
    #[error("key '{key}' not found in index")]
    KeyNotFound { key: String },

    /// Same key seen twice while building with `DuplicateKeys::Reject`
    #[error("duplicate key '{key}' at byte {second} (first seen at byte {first})")]
    DuplicateKey { key: String, first: u64, second: u64 },

    /// rayon pool for a batch lookup could not be created
    #[error("cannot start lookup workers: {0}")]
    ThreadPool(String),
}

impl IndexError {
    /// True for a missing key, the one lookup failure callers are expected
    /// to recover from.
    pub fn is_not_found(&self) -> bool {
        matches!(self, IndexError::KeyNotFound { .. })
    }
}
