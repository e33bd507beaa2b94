#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `wire` frames the two byte streams the sync protocol exchanges over a
//! single TCP connection: the fingerprint stream (target to source) and the
//! changed-block stream (source to target). It also provides the optional
//! zstd wrapping negotiated for either direction.
//!
//! # Design
//!
//! [`transport`] provides [`transport::OutStream`]/[`transport::InStream`],
//! thin enums selecting between a raw writer/reader and a zstd-wrapped one.
//! [`codec`] provides the actual framing functions, generic over any
//! `Read`/`Write` implementor (including the transport wrappers).
//! [`message`] defines [`message::BlockMessage`] and its wire tags.
//!
//! # Invariants
//!
//! - A changed-block stream begins with an 8-byte little-endian
//!   `sourceSize`, then zero or more `(offset, tag)` messages, then a clean
//!   end-of-stream — there is no terminal tag; the reader recognizes the
//!   end by finding no bytes where the next offset would begin.
//! - Neither message kind carries an explicit length: both are derived from
//!   `block_size` and `source_size`, so a corrupt peer cannot claim an
//!   oversized payload.
//! - Compression, once chosen for a direction, does not change mid-stream;
//!   [`transport::OutStream::finish`] is the only place a frame boundary is
//!   flushed.
//!
//! # Errors
//!
//! All fallible operations return [`error::CodecError`], which wraps
//! [`checksum::HashError`] and [`std::io::Error`] alongside the
//! unknown-tag case.
//!
//! # Examples
//!
//! ```
//! use wire::{codec, message::BlockMessage};
//! use std::io::Cursor;
//!
//! let msg = BlockMessage::Data { offset: 0, data: vec![1, 2, 3] };
//! let mut buf = Vec::new();
//! codec::write_block_message(&mut buf, &msg).unwrap();
//!
//! let mut cursor = Cursor::new(&buf);
//! let read_back = codec::read_block_message(&mut cursor, 4096, 3).unwrap();
//! assert_eq!(read_back, Some(msg));
//! assert_eq!(codec::read_block_message(&mut cursor, 4096, 3).unwrap(), None);
//! ```
//!
//! # See also
//!
//! - `checksum` for the fingerprint types this crate frames.
//! - `session` for the state machines driving which messages get sent.

pub mod codec;
pub mod error;
pub mod message;
pub mod transport;

pub use error::CodecError;
pub use message::BlockMessage;
pub use transport::{InStream, OutStream};
