#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cli` parses `blocksync`'s command line into a validated [`Config`]:
//! a positional device path, an exactly-one-of `--source`/`--target` role
//! selector, and the flags each role needs.
//!
//! # Design
//!
//! [`Args`] is the raw `clap` `Parser` derive, accepting whatever
//! combination of flags the user typed. [`Config::from_args`] is where the
//! actual configuration validation happens: it rejects
//! `--source` and `--target` together or neither, requires
//! `--target-address` with `--source`, and rejects a `--block-size` that
//! isn't a power of two. [`Role`] carries the role-specific fields so
//! downstream code (the `blocksync` binary) can match on it instead of
//! re-checking the invariants `from_args` already enforced.
//!
//! # Invariants
//!
//! - A [`Config`] always has exactly one of [`Role::Source`] or
//!   [`Role::Target`]; there is no way to construct one with both or
//!   neither, short of bypassing `from_args`.
//! - `block_size`, when given, is always a power of two greater than zero.
//!
//! # Errors
//!
//! [`Config::from_args`] returns [`ConfigError`] for any invalid
//! combination; the `blocksync` binary maps it onto
//! `session::SessionError::Config` and exits with
//! `session::ExitCode::Usage`.
//!
//! # Examples
//!
//! ```
//! use cli::{Args, Config, Role};
//! use clap::Parser;
//!
//! let args = Args::parse_from([
//!     "blocksync", "/dev/sdb", "--target", "--no-compress",
//! ]);
//! let config = Config::from_args(args).unwrap();
//! assert!(matches!(config.role, Role::Target { compress: false, .. }));
//! ```
//!
//! # See also
//!
//! `session::error::SessionError`, which [`ConfigError`] converts into at
//! the `blocksync` binary's call site.

mod args;
mod config;
mod error;

pub use args::Args;
pub use config::{Config, Role};
pub use error::ConfigError;
