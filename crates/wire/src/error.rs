use std::io;

/// Errors raised while framing or parsing either wire stream.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A block message carried a tag byte other than DATA or HOLE.
    #[error("unrecognized block message tag {0:#04x}")]
    UnknownTag(u8),

    /// Error from the fingerprint-stream layer.
    #[error(transparent)]
    Hash(#[from] checksum::HashError),

    /// Underlying I/O error, from either the socket or the compressor.
    #[error("i/o error on wire stream: {0}")]
    Io(#[from] io::Error),
}
