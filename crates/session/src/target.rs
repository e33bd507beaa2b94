//! The target peer's state machine: `OPEN -> HASH -> LISTEN -> ACCEPT ->
//! SEND_HASHES -> RECV_BLOCKS -> DONE`.
//!
//! `OPEN` (adapter selection) happens before this module is reached — the
//! caller passes in an already-opened [`StorageAdapter`]. `LISTEN`/`ACCEPT`
//! are a thin wrapper over [`TcpListener`]; everything from `HASH` onward is
//! [`run_target`].

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use storage::StorageAdapter;
use wire::{BlockMessage, InStream, OutStream};

use crate::error::SessionError;
use crate::progress::{Phase, ProgressReporter, ProgressSink};
use crate::reader::AdapterReader;

/// Options fixed for the target's side of a session.
#[derive(Debug, Clone, Copy)]
pub struct TargetOptions {
    /// Block size used to hash the target's current contents.
    pub block_size: u64,
    /// Fingerprint seed, shared with the source out of band.
    pub seed: u64,
    /// Whether both peers compress the wire streams.
    pub compress: bool,
    /// Zstd compression level, used only when `compress` is set.
    pub compression_level: i32,
}

/// Counters describing what a completed session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Final length of the source (and, after apply, the target) file.
    pub source_size: u64,
    /// Number of DATA block messages applied.
    pub data_blocks: u64,
    /// Number of HOLE block messages applied.
    pub hole_blocks: u64,
}

/// Listens on `port` and accepts exactly one connection, per the target's
/// `LISTEN`/`ACCEPT` states. The listener is returned so the caller can
/// decide when to drop it (closing the socket).
pub fn accept_one(port: u16) -> std::io::Result<(TcpStream, TcpListener)> {
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    let (stream, _peer) = listener.accept()?;
    Ok((stream, listener))
}

/// Runs `HASH -> SEND_HASHES -> RECV_BLOCKS` for the target peer over an
/// already-accepted connection.
pub fn run_target<S: Read + Write>(
    stream: S,
    adapter: &mut dyn StorageAdapter,
    options: TargetOptions,
    sink: &mut dyn ProgressSink,
) -> Result<SessionSummary, SessionError> {
    let current_size = adapter.size()?;

    let local_fingerprints = {
        let mut reader = AdapterReader::new(adapter);
        let mut hash_progress = ProgressReporter::new(&mut *sink, Phase::Hash, current_size);
        let stream = checksum::hash_reader(&mut reader, options.block_size, options.seed)?;
        hash_progress.finish();
        stream
    };

    let stream = send_hashes(stream, &local_fingerprints, options)?;
    let summary = recv_blocks(stream, adapter, current_size, options, sink)?;

    Ok(summary)
}

fn send_hashes<S: Write>(
    stream: S,
    fingerprints: &checksum::FingerprintStream,
    options: TargetOptions,
) -> Result<S, SessionError> {
    let mut out = if options.compress {
        OutStream::zstd(stream, options.compression_level).map_err(SessionError::Io)?
    } else {
        OutStream::plain(stream)
    };
    wire::codec::write_fingerprint_stream(&mut out, fingerprints)?;
    Ok(out.finish().map_err(SessionError::Io)?)
}

fn recv_blocks<S: Read>(
    stream: S,
    adapter: &mut dyn StorageAdapter,
    current_size: u64,
    options: TargetOptions,
    sink: &mut dyn ProgressSink,
) -> Result<SessionSummary, SessionError> {
    let mut in_stream = if options.compress {
        InStream::zstd(stream).map_err(SessionError::Io)?
    } else {
        InStream::plain(stream)
    };

    let source_size = wire::codec::read_source_size(&mut in_stream)?;

    // Resize before applying any block: a grown target must accept writes
    // past the old end, and the compressed-sparse adapter rejects any
    // offset beyond its current logical size.
    if source_size != current_size {
        adapter.truncate(source_size)?;
    }

    let mut progress = ProgressReporter::new(sink, Phase::Sync, source_size);

    let mut summary = SessionSummary {
        source_size,
        data_blocks: 0,
        hole_blocks: 0,
    };

    loop {
        match wire::codec::read_block_message(&mut in_stream, options.block_size, source_size)? {
            None => break,
            Some(BlockMessage::Data { offset, data }) => {
                let end = offset + data.len() as u64;
                adapter.write_at(offset, &data)?;
                summary.data_blocks += 1;
                progress.update(end);
            }
            Some(BlockMessage::Hole { offset, len }) => {
                let end = offset + len;
                adapter.punch_hole(offset, len)?;
                summary.hole_blocks += 1;
                progress.update(end);
            }
        }
    }

    progress.finish();

    Ok(summary)
}
