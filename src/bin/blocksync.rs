//! `blocksync`: differential block-sync over TCP between a source and
//! target host, built by wiring together the `cli`, `session`, `storage`,
//! and `logging` crates around the OPEN/LISTEN/CONNECT steps none of those
//! crates own themselves.

use std::fs::OpenOptions;
use std::net::TcpStream;
use std::process::ExitCode;

use clap::Parser;
use session::dialer::{connect_with_retry, RealSleeper, TcpDialer};
use session::progress::ProgressSink;
use session::{
    run_source, run_target, ExitCode as SessionExitCode, HasExitCode, SessionError,
    SourceOptions, TargetOptions,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg(feature = "zstd")]
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

const DEFAULT_BLOCK_SIZE: u64 = 65536;
const FINGERPRINT_SEED: u64 = 0;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(SessionExitCode::Ok),
        Err(err) => {
            logging::error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run() -> Result<(), SessionError> {
    let args = cli::Args::parse();
    let config = cli::Config::from_args(args).map_err(SessionError::from)?;

    logging::set_verbosity(config.verbose, !config.verbose);

    let mut sink = StdoutProgress {
        quiet: !config.verbose,
    };

    match &config.role {
        cli::Role::Target { compress } => run_as_target(&config, *compress, &mut sink),
        cli::Role::Source { target_address } => run_as_source(&config, target_address, &mut sink),
    }
}

fn run_as_target(
    config: &cli::Config,
    compress_storage: bool,
    sink: &mut dyn ProgressSink,
) -> Result<(), SessionError> {
    let (stream, listener) = session::accept_one(config.port)?;
    logging::info!("accepted connection on port {}", config.port);

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.devicepath)?;
    let kind = storage::TargetKind::detect(&file)?;

    // The source's size isn't known until after the fingerprint exchange, so
    // HASH must run against the file's current length; `select_target_adapter`
    // reopens an existing compressed-sparse container rather than recreating
    // it, and `recv_blocks` resizes the adapter to the source's size before
    // applying any block.
    let current_size = file.metadata()?.len();
    let chunk_size = storage::DEFAULT_CHUNK_SIZE;
    let mut adapter =
        storage::select_target_adapter(file, kind, current_size, compress_storage, chunk_size)?;

    let options = TargetOptions {
        block_size: config.block_size.unwrap_or(DEFAULT_BLOCK_SIZE),
        seed: FINGERPRINT_SEED,
        compress: config.compress_wire,
        compression_level: compression_level(),
    };

    let summary = run_target(stream, adapter.as_mut(), options, sink)?;
    logging::info!(
        "sync complete: {} data blocks, {} hole blocks, {} bytes",
        summary.data_blocks,
        summary.hole_blocks,
        summary.source_size
    );

    drop(listener);
    Ok(())
}

fn run_as_source(
    config: &cli::Config,
    target_address: &str,
    sink: &mut dyn ProgressSink,
) -> Result<(), SessionError> {
    let stream: TcpStream =
        connect_with_retry(&mut TcpDialer, &mut RealSleeper, target_address, config.port)?;
    logging::info!("connected to {}:{}", target_address, config.port);

    let file = OpenOptions::new().read(true).open(&config.devicepath)?;
    let mut adapter = storage::open_source_reader(file)?;

    let options = SourceOptions {
        seed: FINGERPRINT_SEED,
        compress: config.compress_wire,
        compression_level: compression_level(),
    };

    let summary = run_source(stream, adapter.as_mut(), options, sink)?;
    logging::info!(
        "sync complete: {} data blocks, {} hole blocks, {} bytes",
        summary.data_blocks,
        summary.hole_blocks,
        summary.source_size
    );

    Ok(())
}

#[cfg(feature = "zstd")]
const fn compression_level() -> i32 {
    DEFAULT_COMPRESSION_LEVEL
}

#[cfg(not(feature = "zstd"))]
const fn compression_level() -> i32 {
    0
}

/// Prints throttled hash/sync progress to stdout, respecting `--quiet`.
struct StdoutProgress {
    quiet: bool,
}

impl ProgressSink for StdoutProgress {
    fn report(&mut self, percent: f64, phase: &str) {
        if self.quiet {
            return;
        }
        println!("blocksync: {phase}: {percent:.1}%");
    }
}
