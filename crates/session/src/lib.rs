#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `session` drives the two state machines that make up a sync session: the
//! target (`OPEN -> HASH -> LISTEN -> ACCEPT -> SEND_HASHES -> RECV_BLOCKS ->
//! DONE`) and the source (`OPEN -> CONNECT -> RECV_HASHES -> HASH -> DIFF ->
//! SEND_BLOCKS -> DONE`). It composes `checksum`, `wire`, and `storage`
//! without owning any protocol detail of its own beyond sequencing.
//!
//! # Design
//!
//! [`target::run_target`] and [`source::run_source`] are the two entry
//! points; both take an already-opened [`storage::StorageAdapter`] and an
//! already-established duplex stream, so the CLI layer owns `OPEN`,
//! `LISTEN`/`ACCEPT`, and `CONNECT`. [`dialer`] implements the source's
//! bounded connect retry behind an injectable [`dialer::Dialer`] and
//! [`dialer::Sleeper`] pair so the policy is testable without a socket.
//! [`progress`] throttles status reports to one per second, split across the
//! hash and sync phases.
//!
//! # Invariants
//!
//! - The target always sends its complete fingerprint stream before reading
//!   any block message; the source always finishes reading the fingerprint
//!   stream before writing any block message. Both are enforced by sequencing
//!   in [`target::run_target`]/[`source::run_source`], not by the wire format.
//! - Every error that can reach the CLI implements [`error::HasExitCode`].
//!
//! # Errors
//!
//! All fallible operations return [`error::SessionError`], which wraps
//! [`checksum::HashError`], [`wire::CodecError`], [`storage::AdapterError`],
//! and [`std::io::Error`], plus its own `Config`/`Connect` variants.
//!
//! # Examples
//!
//! ```
//! use session::dialer::{connect_with_retry, Dialer, Sleeper};
//! use std::time::Duration;
//!
//! struct AlwaysOk;
//! impl Dialer for AlwaysOk {
//!     type Connection = ();
//!     fn connect(&mut self, _address: &str, _port: u16) -> std::io::Result<()> {
//!         Ok(())
//!     }
//! }
//! struct NoSleep;
//! impl Sleeper for NoSleep {
//!     fn sleep(&mut self, _duration: Duration) {}
//! }
//!
//! connect_with_retry(&mut AlwaysOk, &mut NoSleep, "target.example", 8000).unwrap();
//! ```
//!
//! # See also
//!
//! `cli` builds the `Config` that selects which of `target`/`source` to run.

pub mod dialer;
pub mod error;
pub mod progress;
mod reader;
pub mod source;
pub mod target;

pub use error::{ExitCode, HasExitCode, SessionError};
pub use progress::{NullProgress, Phase, ProgressReporter, ProgressSink, RecordingProgress};
pub use source::{run_source, SourceOptions};
pub use target::{accept_one, run_target, SessionSummary, TargetOptions};
