#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksum` computes, serializes, and diffs the per-block fingerprint
//! streams that drive the sync protocol's decision about which blocks to
//! transfer. It has no knowledge of sockets or storage; it only knows how to
//! turn a byte stream into fingerprints and how to compare two fingerprint
//! sets.
//!
//! # Design
//!
//! [`fingerprint`] defines the seeded 128-bit fingerprint and its streaming
//! hasher. [`stream`] defines [`stream::FingerprintStream`], the in-memory
//! representation of a whole file's fingerprints, plus the wire framing used
//! to exchange it. [`diff`] compares two streams into the set of blocks that
//! differ.
//!
//! # Invariants
//!
//! - Block size is always a non-zero power of two; [`stream::hash_reader`]
//!   and [`stream::FingerprintStream::read_from`] reject anything else.
//! - [`stream::hash_reader`] uses one reusable buffer of `block_size` bytes
//!   regardless of file size.
//! - [`diff::diff`] never panics on mismatched stream lengths; the longer
//!   stream's extra blocks are reported as changed.
//!
//! # Errors
//!
//! Fallible operations return [`error::HashError`], which distinguishes a
//! malformed block size, a truncated or inconsistent wire stream, and the
//! underlying I/O error.
//!
//! # Examples
//!
//! ```
//! use checksum::{diff, hash_reader};
//! use std::io::Cursor;
//!
//! let source = vec![0u8; 4096 * 3];
//! let mut target = source.clone();
//! target[4096] = 0xFF;
//!
//! let source_fps = hash_reader(Cursor::new(&source), 4096, 0).unwrap();
//! let target_fps = hash_reader(Cursor::new(&target), 4096, 0).unwrap();
//!
//! let changed = diff(&source_fps, &target_fps);
//! assert_eq!(changed.changed_blocks, vec![4096]);
//! ```
//!
//! # See also
//!
//! - `wire` for framing these streams onto a socket.
//! - `session` for the state machines that drive hashing and diffing.

mod diff;
mod error;
mod fingerprint;
mod stream;

pub use diff::{diff, DiffSet};
pub use error::HashError;
pub use fingerprint::{BlockHasher, Fingerprint, FINGERPRINT_LEN};
pub use stream::{hash_reader, validate_block_size, FingerprintStream};
