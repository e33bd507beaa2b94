//! Validated configuration built from [`crate::Args`].

use crate::args::Args;
use crate::error::ConfigError;

/// The role-specific fields a [`Config`] carries, mutually exclusive by
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Run as the source peer: dial out and push changed blocks.
    Source {
        /// Host to dial.
        target_address: String,
    },
    /// Run as the target peer: listen, hash, and receive changed blocks.
    Target {
        /// Whether to select the compressed-sparse adapter for a regular
        /// file target (ignored for device targets, which never compress
        /// at the storage layer).
        compress: bool,
    },
}

/// Validated `blocksync` configuration, built by [`Config::from_args`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path to the source or target file/device.
    pub devicepath: String,
    /// Which peer role to run, and that role's own fields.
    pub role: Role,
    /// TCP port to dial or listen on.
    pub port: u16,
    /// Whether the wire streams are compressed. Always false alongside a
    /// target's `--no-compress`; otherwise true.
    pub compress_wire: bool,
    /// Block size to seed the target's hashing with, if the user gave one.
    pub block_size: Option<u64>,
    /// Whether progress/status output is enabled.
    pub verbose: bool,
}

impl Config {
    /// Validates `args` against the CLI's role and flag invariants, producing a
    /// [`Config`] with exactly one [`Role`] or a [`ConfigError`]
    /// describing the first violation found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `--source`/`--target` are both given or
    /// neither is, if `--target-address` is inconsistent with the chosen
    /// role, or if `--block-size` is given but isn't a power of two.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let role = match (args.source, args.target) {
            (true, true) => return Err(ConfigError::ConflictingRoles),
            (false, false) => return Err(ConfigError::MissingRole),
            (true, false) => {
                let target_address = args
                    .target_address
                    .ok_or(ConfigError::MissingTargetAddress)?;
                Role::Source { target_address }
            }
            (false, true) => {
                if args.target_address.is_some() {
                    return Err(ConfigError::TargetAddressWithoutSource);
                }
                Role::Target {
                    compress: !args.no_compress,
                }
            }
        };

        if let Some(block_size) = args.block_size {
            if block_size == 0 || !block_size.is_power_of_two() {
                return Err(ConfigError::InvalidBlockSize(block_size));
            }
        }

        // Verbose output is on by default;
        // --quiet is the only way to turn it off. --verbose is accepted but
        // redundant, since the default already matches what it requests.
        let verbose = !args.quiet;

        Ok(Self {
            devicepath: args.devicepath,
            compress_wire: !args.no_compress,
            port: args.port,
            block_size: args.block_size,
            verbose,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(argv)
    }

    #[test]
    fn requires_exactly_one_role() {
        let err = Config::from_args(parse(["blocksync", "img"].as_slice())).unwrap_err();
        assert_eq!(err, ConfigError::MissingRole);

        let err =
            Config::from_args(parse(["blocksync", "img", "--source", "--target"].as_slice()))
                .unwrap_err();
        assert_eq!(err, ConfigError::ConflictingRoles);
    }

    #[test]
    fn source_requires_target_address() {
        let err =
            Config::from_args(parse(["blocksync", "img", "--source"].as_slice())).unwrap_err();
        assert_eq!(err, ConfigError::MissingTargetAddress);
    }

    #[test]
    fn target_rejects_target_address() {
        let err = Config::from_args(parse(
            [
                "blocksync",
                "img",
                "--target",
                "--target-address",
                "host",
            ]
            .as_slice(),
        ))
        .unwrap_err();
        assert_eq!(err, ConfigError::TargetAddressWithoutSource);
    }

    #[test]
    fn block_size_must_be_a_power_of_two() {
        let err = Config::from_args(parse(
            ["blocksync", "img", "--target", "--block-size", "3000"].as_slice(),
        ))
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidBlockSize(3000));

        let config = Config::from_args(parse(
            ["blocksync", "img", "--target", "--block-size", "65536"].as_slice(),
        ))
        .unwrap();
        assert_eq!(config.block_size, Some(65536));
    }

    #[test]
    fn valid_source_config_carries_the_target_address() {
        let config = Config::from_args(parse(
            [
                "blocksync",
                "/srv/disk.img",
                "--source",
                "--target-address",
                "target.example",
                "--port",
                "9001",
            ]
            .as_slice(),
        ))
        .unwrap();
        assert_eq!(
            config.role,
            Role::Source {
                target_address: "target.example".into()
            }
        );
        assert_eq!(config.port, 9001);
        assert!(config.verbose);
    }

    #[test]
    fn no_compress_disables_both_wire_and_storage_compression() {
        let config = Config::from_args(parse(
            ["blocksync", "/dev/sdb", "--target", "--no-compress"].as_slice(),
        ))
        .unwrap();
        assert_eq!(config.role, Role::Target { compress: false });
        assert!(!config.compress_wire);
    }

    #[test]
    fn quiet_disables_verbose_even_if_both_are_given() {
        let config = Config::from_args(parse(
            ["blocksync", "img", "--target", "--verbose", "--quiet"].as_slice(),
        ))
        .unwrap();
        assert!(!config.verbose);
    }

    #[test]
    fn verbose_defaults_on_without_any_flag() {
        let config =
            Config::from_args(parse(["blocksync", "img", "--target"].as_slice())).unwrap();
        assert!(config.verbose);
    }
}
