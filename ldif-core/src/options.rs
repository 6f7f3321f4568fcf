//! Scanner configuration.

/// Default number of bytes requested from the reader per fill.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Options controlling how the scanner pulls input from its reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerOptions {
    /// Bytes requested per `read` call. Also the threshold after which the
    /// consumed prefix of the buffer is discarded.
    pub chunk_size: usize,
}

impl ScannerOptions {
    /// Options with the given chunk size (clamped to at least one byte).
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
