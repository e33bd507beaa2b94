use std::io;

/// Errors raised by a storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The compressed-sparse container's magic bytes did not match.
    #[error("file is not a recognized compressed-sparse container")]
    NotCompressedSparse,

    /// The compressed-sparse container declared a format version this
    /// adapter does not understand.
    #[error("unsupported compressed-sparse format version {0}")]
    UnsupportedVersion(u32),

    /// An offset or length fell outside the adapter's addressable range.
    #[error("offset {offset} + length {len} exceeds file size {size}")]
    OutOfRange {
        /// Requested offset.
        offset: u64,
        /// Requested length.
        len: u64,
        /// Current logical file size.
        size: u64,
    },

    /// Underlying I/O error.
    #[error("i/o error in storage adapter: {0}")]
    Io(#[from] io::Error),
}
