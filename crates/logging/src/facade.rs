//! Global verbosity gate and line formatting for the message facade.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::Level;

static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(Level::Warning as u8);

/// Sets the maximum level that will be emitted; anything more severe than
/// (or equal to) `level` passes, anything less severe is dropped.
pub fn init(level: Level) {
    CURRENT_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Derives a level from the CLI's `--verbose`/`--quiet` flags and installs
/// it as the process-wide verbosity: `quiet` takes precedence over
/// `verbose` when both are set.
pub fn set_verbosity(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::Error
    } else if verbose {
        Level::Info
    } else {
        Level::Warning
    };
    init(level);
}

/// Returns the currently installed maximum level.
#[must_use]
pub fn current_level() -> Level {
    match CURRENT_LEVEL.load(Ordering::SeqCst) {
        0 => Level::Fatal,
        1 => Level::Error,
        2 => Level::Warning,
        3 => Level::Info,
        _ => Level::Debug,
    }
}

/// Returns `true` if a message at `level` would currently be emitted.
#[must_use]
pub fn enabled(level: Level) -> bool {
    level <= current_level()
}

/// Formats one log line the way the non-tracing backend prints it:
/// `blocksync: <level>: <message>`.
#[must_use]
pub fn format_line(level: Level, args: fmt::Arguments<'_>) -> String {
    format!("blocksync: {level}: {args}")
}

/// Entry point the level-specific macros expand to. Not part of the public
/// API surface directly; use [`crate::fatal`], [`crate::error`],
/// [`crate::warning`], [`crate::info`], or [`crate::debug`] instead.
#[doc(hidden)]
pub fn log_impl(level: Level, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }

    #[cfg(feature = "tracing")]
    {
        crate::tracing_bridge::emit(level, args);
    }

    #[cfg(not(feature = "tracing"))]
    {
        let line = format_line(level, args);
        if level.is_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}
