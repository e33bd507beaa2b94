//! The source peer's state machine: `OPEN -> CONNECT -> RECV_HASHES ->
//! HASH -> DIFF -> SEND_BLOCKS -> DONE`.
//!
//! `OPEN` (opening the local file, possibly through
//! [`storage::open_source_reader`]) and `CONNECT` (via
//! [`crate::dialer::connect_with_retry`]) happen before this module is
//! reached; [`run_source`] drives everything from `RECV_HASHES` onward.

use std::io::{Read, Write};

use storage::StorageAdapter;
use wire::{BlockMessage, InStream, OutStream};

use crate::error::SessionError;
use crate::progress::{Phase, ProgressReporter, ProgressSink};
use crate::reader::AdapterReader;
use crate::target::SessionSummary;

/// Options fixed for the source's side of a session.
#[derive(Debug, Clone, Copy)]
pub struct SourceOptions {
    /// Fingerprint seed; must match the target's.
    pub seed: u64,
    /// Whether both peers compress the wire streams.
    pub compress: bool,
    /// Zstd compression level, used only when `compress` is set.
    pub compression_level: i32,
}

/// Runs `RECV_HASHES -> HASH -> DIFF -> SEND_BLOCKS` for the source peer
/// over an already-connected socket.
pub fn run_source<S: Read + Write>(
    stream: S,
    adapter: &mut dyn StorageAdapter,
    options: SourceOptions,
    sink: &mut dyn ProgressSink,
) -> Result<SessionSummary, SessionError> {
    let (remote_fingerprints, stream) = recv_hashes(stream, options)?;

    let source_size = adapter.size()?;
    let local_fingerprints = {
        let mut reader = AdapterReader::new(adapter);
        let mut hash_progress = ProgressReporter::new(&mut *sink, Phase::Hash, source_size);
        let stream = checksum::hash_reader(
            &mut reader,
            remote_fingerprints.block_size,
            options.seed,
        )?;
        hash_progress.finish();
        stream
    };

    let diff = checksum::diff(&local_fingerprints, &remote_fingerprints);

    send_blocks(
        stream,
        adapter,
        source_size,
        &diff,
        remote_fingerprints.block_size,
        options,
        sink,
    )
}

fn recv_hashes<S: Read>(
    stream: S,
    options: SourceOptions,
) -> Result<(checksum::FingerprintStream, S), SessionError> {
    let mut in_stream = if options.compress {
        InStream::zstd(stream).map_err(SessionError::Io)?
    } else {
        InStream::plain(stream)
    };
    let fingerprints = wire::codec::read_fingerprint_stream(&mut in_stream)?;
    Ok((fingerprints, in_stream.into_inner()))
}

#[allow(clippy::too_many_arguments)]
fn send_blocks<S: Write>(
    stream: S,
    adapter: &mut dyn StorageAdapter,
    source_size: u64,
    diff: &checksum::DiffSet,
    block_size: u64,
    options: SourceOptions,
    sink: &mut dyn ProgressSink,
) -> Result<SessionSummary, SessionError> {
    let mut out = if options.compress {
        OutStream::zstd(stream, options.compression_level).map_err(SessionError::Io)?
    } else {
        OutStream::plain(stream)
    };

    wire::codec::write_source_size(&mut out, source_size)?;

    let mut progress = ProgressReporter::new(sink, Phase::Sync, source_size);
    let mut summary = SessionSummary {
        source_size,
        data_blocks: 0,
        hole_blocks: 0,
    };

    let mut buf = vec![0u8; block_size as usize];
    for &offset in &diff.changed_blocks {
        let len = block_size.min(source_size.saturating_sub(offset));
        if len == 0 {
            continue;
        }
        let slice = &mut buf[..len as usize];
        adapter.read_at(offset, slice)?;

        if wire::BlockMessage::is_all_zero(slice) {
            wire::codec::write_block_message(&mut out, &BlockMessage::Hole { offset, len })?;
            summary.hole_blocks += 1;
        } else {
            wire::codec::write_block_message(
                &mut out,
                &BlockMessage::Data {
                    offset,
                    data: slice.to_vec(),
                },
            )?;
            summary.data_blocks += 1;
        }
        progress.update(offset + len);
    }

    out.finish().map_err(SessionError::Io)?;
    progress.finish();

    Ok(summary)
}
