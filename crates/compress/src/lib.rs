#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `compress` provides the streaming Zstandard encoder/decoder pair used to
//! wrap the changed-block wire stream. Both peers construct one encoder and
//! one decoder per socket half; compression is optional and negotiated by
//! the target as part of session setup.
//!
//! # Design
//!
//! The crate exposes a single [`zstd`] module built on top of
//! [`zstd`](https://docs.rs/zstd). Encoders implement [`std::io::Write`] and
//! track the number of compressed bytes produced; decoders implement
//! [`std::io::Read`] and track the number of decompressed bytes consumed.
//!
//! # Invariants
//!
//! - Encoders never allocate internal output buffers beyond what the
//!   underlying zstd frame requires; all output is written into the
//!   caller-provided sink.
//! - Streams are finalised explicitly via
//!   [`zstd::CountingZstdEncoder::finish`], which flushes the frame and
//!   reports the final compressed length — this is the flush boundary the
//!   receiver observes between the fingerprint stream and the block stream.
//! - Errors from the underlying zstd implementation are surfaced as
//!   [`std::io::Error`] values.
//!
//! # Errors
//!
//! The encoder and decoder functions return [`std::io::Result`]. When zstd
//! reports an error the helper wraps it in [`std::io::ErrorKind::Other`].
//!
//! # Examples
//!
//! ```
//! use compress::zstd::{CountingZstdEncoder, compress_to_vec, decompress_to_vec};
//!
//! # fn main() -> std::io::Result<()> {
//! let data = b"streaming example payload";
//! let mut encoder = CountingZstdEncoder::new(3)?;
//! encoder.write(data)?;
//! let compressed_len = encoder.finish()?;
//! assert!(compressed_len > 0);
//!
//! let compressed = compress_to_vec(data, 3)?;
//! let decompressed = decompress_to_vec(&compressed)?;
//! assert_eq!(decompressed, data);
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - [`zstd`] for the Zstandard encoder/decoder implementation.
//! - `wire` for the message framing layered on top of these streams.

mod common;
#[cfg(feature = "zstd")]
pub mod zstd;

pub use common::CountingSink;
