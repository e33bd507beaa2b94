//! The raw `clap` derive, unvalidated beyond what `clap` itself enforces.

use clap::Parser;

/// Default TCP port used when `--port` is not given.
pub const DEFAULT_PORT: u16 = 8000;

/// Command-line arguments for `blocksync`, as typed by the user.
///
/// This is deliberately permissive: `--source` and `--target` can both be
/// set, or neither, at this layer. [`crate::Config::from_args`] is where
/// the role-exclusivity and cross-flag requirements are
/// enforced.
#[derive(Debug, Clone, Parser)]
#[command(name = "blocksync", about = "Differential block-sync over TCP", version)]
pub struct Args {
    /// Path to the source or target file/device.
    pub devicepath: String,

    /// Run as the source peer: dials out to `--target-address`.
    #[arg(long)]
    pub source: bool,

    /// Run as the target peer: listens for an incoming connection.
    #[arg(long)]
    pub target: bool,

    /// Host to dial when running as the source. Required with `--source`.
    #[arg(long)]
    pub target_address: Option<String>,

    /// TCP port to dial (source) or listen on (target).
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Disables wire compression and, on the target, selects the plain
    /// sparse adapter instead of the compressed-sparse one.
    #[arg(long)]
    pub no_compress: bool,

    /// Seeds the target's fingerprint block size. Must be a power of two.
    /// The source always adopts the block size the target advertises.
    #[arg(long)]
    pub block_size: Option<u64>,

    /// Explicitly requests progress and status output. Redundant in
    /// practice since verbose output is already on by default (see
    /// [`crate::Config`]); accepted since scripts written against other
    /// block-sync tools commonly pass it.
    #[arg(long)]
    pub verbose: bool,

    /// Disables progress and status output entirely.
    #[arg(long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_target_invocation() {
        let args = Args::parse_from(["blocksync", "/dev/sdb", "--target"]);
        assert_eq!(args.devicepath, "/dev/sdb");
        assert!(args.target);
        assert!(!args.source);
        assert_eq!(args.port, DEFAULT_PORT);
    }

    #[test]
    fn parses_source_invocation_with_address_and_port() {
        let args = Args::parse_from([
            "blocksync",
            "/srv/disk.img",
            "--source",
            "--target-address",
            "target.example",
            "--port",
            "9001",
        ]);
        assert!(args.source);
        assert_eq!(args.target_address.as_deref(), Some("target.example"));
        assert_eq!(args.port, 9001);
    }

    #[test]
    fn verbose_and_quiet_can_both_be_given_raw() {
        let args = Args::parse_from(["blocksync", "img", "--target", "--verbose", "--quiet"]);
        assert!(args.verbose);
        assert!(args.quiet);
    }

    #[test]
    fn neither_flag_is_set_without_being_typed() {
        let args = Args::parse_from(["blocksync", "img", "--target"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }
}
