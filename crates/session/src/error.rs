//! The error taxonomy that crosses the CLI boundary.

use std::fmt;
use std::io;

/// Process exit codes for the `blocksync` binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion.
    Ok = 0,
    /// Operational failure: connect, I/O, protocol, or adapter error.
    Operational = 1,
    /// Invalid CLI combination or missing required flag.
    Usage = 2,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::Ok => "success",
            Self::Operational => "operational failure",
            Self::Usage => "usage error",
        };
        write!(f, "{description}")
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.as_i32().clamp(0, 255) as u8)
    }
}

/// Types that can report the exit code a failure should produce.
pub trait HasExitCode {
    /// Returns the exit code associated with this value.
    fn exit_code(&self) -> ExitCode;
}

/// Errors raised while driving a sync session, from either peer's side.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// An invalid CLI combination or missing required flag.
    #[error("configuration error: {0}")]
    Config(String),

    /// TCP dial failed past the retry budget.
    #[error("could not connect to {address} after {attempts} attempts: {source}")]
    Connect {
        /// The target address the source tried to dial.
        address: String,
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The last I/O error observed.
        #[source]
        source: io::Error,
    },

    /// Fingerprint hashing failed.
    #[error("hashing error: {0}")]
    Hash(#[from] checksum::HashError),

    /// Wire framing failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] wire::CodecError),

    /// The target storage adapter refused the file.
    #[error("storage adapter error: {0}")]
    Adapter(#[from] storage::AdapterError),

    /// A generic I/O failure on file or socket.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl HasExitCode for SessionError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::Usage,
            Self::Connect { .. } | Self::Hash(_) | Self::Protocol(_) | Self::Adapter(_) | Self::Io(_) => {
                ExitCode::Operational
            }
        }
    }
}
