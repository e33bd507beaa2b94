#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` is the verbosity-gated message facade both session state
//! machines and the `cli` crate use to report progress, warnings, and
//! errors: five levels (`Fatal`/`Error`/`Warning`/`Info`/`Debug`), a
//! process-wide verbosity gate derived from `--verbose`/`--quiet`, and an
//! optional bridge onto `tracing` for structured output.
//!
//! # Design
//!
//! [`Level`] defines the five levels and which stream each routes to.
//! [`facade`] holds the global gate ([`set_verbosity`]/[`init`]) and the
//! line formatting used when the `tracing` feature is off. The
//! [`fatal`], [`error`], [`warning`], [`info`], and [`debug`] macros are
//! the call sites use; each expands to a single gated, possibly-skipped
//! function call, so disabled levels cost one atomic load.
//!
//! # Invariants
//!
//! - `Fatal` and `Error` route to stderr; `Info` and `Debug` route to
//!   stdout, so piping a sync's stdout never mixes in error text.
//! - Enabling a level always enables every more-severe level; there is no
//!   way to silence `Fatal` while leaving `Info` on.
//!
//! # Errors
//!
//! This crate has no fallible core operations; [`tracing_bridge::install`]
//! (feature `tracing`) returns `tracing`'s own subscriber-already-set error.
//!
//! # Examples
//!
//! ```
//! use logging::{info, set_verbosity, Level};
//!
//! set_verbosity(true, false);
//! info!("hashing {} blocks", 128);
//! assert!(logging::enabled(Level::Info));
//! ```
//!
//! # See also
//!
//! - `session::progress` for the separate, non-leveled progress line
//!   reporter used during the hash/sync phases.
//! - `cli` for where `--verbose`/`--quiet` are parsed and handed to
//!   [`set_verbosity`].

mod facade;
mod level;
#[cfg(feature = "tracing")]
mod tracing_bridge;

pub use facade::{current_level, enabled, format_line, init, log_impl, set_verbosity};
pub use level::Level;
#[cfg(feature = "tracing")]
pub use tracing_bridge::install as install_tracing_subscriber;

/// Logs an unrecoverable error; the process is about to exit non-zero.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::log_impl($crate::Level::Fatal, format_args!($($arg)*))
    };
}

/// Logs a session-ending error.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log_impl($crate::Level::Error, format_args!($($arg)*))
    };
}

/// Logs a recoverable condition worth surfacing, such as an adapter
/// falling back from compressed-sparse to plain sparse.
#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {
        $crate::log_impl($crate::Level::Warning, format_args!($($arg)*))
    };
}

/// Logs ordinary progress and status output, shown with `--verbose`.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log_impl($crate::Level::Info, format_args!($($arg)*))
    };
}

/// Logs developer-facing diagnostic detail.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log_impl($crate::Level::Debug, format_args!($($arg)*))
    };
}
