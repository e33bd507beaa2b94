//! The usage-error taxonomy, named `ConfigError`.

/// An invalid CLI combination or missing required flag.
///
/// Maps onto `session::SessionError::Config` and exit code 2.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither `--source` nor `--target` was given.
    #[error("exactly one of --source or --target is required")]
    MissingRole,

    /// Both `--source` and `--target` were given.
    #[error("--source and --target are mutually exclusive")]
    ConflictingRoles,

    /// `--source` was given without `--target-address`.
    #[error("--target-address is required with --source")]
    MissingTargetAddress,

    /// `--target-address` was given without `--source`.
    #[error("--target-address is only valid with --source")]
    TargetAddressWithoutSource,

    /// `--block-size` was given but is zero or not a power of two.
    #[error("--block-size must be a power of two, got {0}")]
    InvalidBlockSize(u64),
}

impl From<ConfigError> for session::SessionError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use session::{ExitCode, HasExitCode};

    #[test]
    fn converts_into_session_error_config_variant() {
        let session_error: session::SessionError = ConfigError::MissingRole.into();
        assert_eq!(session_error.exit_code(), ExitCode::Usage);
        assert!(session_error.to_string().contains("exactly one of"));
    }
}
