use std::io;

/// Errors raised while hashing a file or parsing a fingerprint stream.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The requested block size was zero or not a power of two.
    #[error("block size {0} is not a non-zero power of two")]
    InvalidBlockSize(u64),

    /// The fingerprint stream's declared count would overflow available memory
    /// or disagrees with the number of fingerprints actually present.
    #[error("fingerprint stream declared {declared} fingerprints but contained {actual}")]
    FingerprintCountMismatch {
        /// Count declared in the stream header.
        declared: u64,
        /// Count actually read before the stream ended.
        actual: u64,
    },

    /// An I/O error occurred while reading the source file or the fingerprint stream.
    #[error("i/o error while hashing: {0}")]
    Io(#[from] io::Error),
}
