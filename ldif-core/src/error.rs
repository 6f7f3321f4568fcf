//! Errors surfaced by the parser.
//!
//! Malformed LDIF content is never an error: it is recovered into invalid
//! parts of the document. Only failures of the underlying reader reach the
//! caller.

use std::io;

use thiserror::Error;

/// Error returned by incremental parsing.
#[derive(Debug, Error)]
pub enum LdifError {
    /// The reader failed. `offset` is the number of bytes read before the
    /// failure.
    #[error("failed to read LDIF input at offset {offset}: {source}")]
    Io {
        offset: usize,
        #[source]
        source: io::Error,
    },
}

impl LdifError {
    /// Byte offset at which the error occurred.
    pub fn offset(&self) -> usize {
        match self {
            Self::Io { offset, .. } => *offset,
        }
    }
}

/// Result alias for parser operations.
pub type Result<T> = std::result::Result<T, LdifError>;
