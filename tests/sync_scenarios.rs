//! End-to-end sync scenarios over an in-process TCP loopback, covering the
//! invariants and scenarios S1-S6.

use std::io::{Seek, SeekFrom, Write};
use std::net::TcpListener;
use std::thread;

use session::progress::NullProgress;
use session::{run_source, run_target, SourceOptions, TargetOptions};
use storage::{SparseFileAdapter, StorageAdapter};

const BLOCK_SIZE: u64 = 4096;
const SEED: u64 = 0;

fn options() -> (TargetOptions, SourceOptions) {
    let target = TargetOptions {
        block_size: BLOCK_SIZE,
        seed: SEED,
        compress: false,
        compression_level: 0,
    };
    let source = SourceOptions {
        seed: SEED,
        compress: false,
        compression_level: 0,
    };
    (target, source)
}

fn file_with_contents(contents: &[u8]) -> std::fs::File {
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(contents).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    file
}

/// Runs a full sync session: target listens, source dials, both drive their
/// state machine to completion. Returns `(target_summary, source_summary)`.
fn sync(
    source_contents: &[u8],
    target_contents: &[u8],
) -> (session::SessionSummary, session::SessionSummary, Vec<u8>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let (target_options, source_options) = options();
    let mut target_adapter = SparseFileAdapter::new(file_with_contents(target_contents));

    let target_thread = thread::spawn(move || {
        let (stream, _listener) = (listener.accept().unwrap().0, listener);
        run_target(
            stream,
            &mut target_adapter,
            target_options,
            &mut NullProgress,
        )
        .map(|summary| (summary, target_adapter))
    });

    // Give the listener a moment to be ready to accept; connect retries
    // inside a real session, but a plain connect suffices for a loopback
    // test since the listener is already bound before the thread spawns.
    let stream = std::net::TcpStream::connect(("127.0.0.1", port)).unwrap();
    let mut source_adapter = SparseFileAdapter::new(file_with_contents(source_contents));
    let source_summary = run_source(
        stream,
        &mut source_adapter,
        source_options,
        &mut NullProgress,
    )
    .unwrap();

    let (target_summary, mut target_adapter) = target_thread.join().unwrap().unwrap();

    let mut applied = vec![0u8; target_summary.source_size as usize];
    let mut read = 0usize;
    while read < applied.len() {
        let n = target_adapter.read_at(read as u64, &mut applied[read..]).unwrap();
        if n == 0 {
            break;
        }
        read += n;
    }
    applied.truncate(read);

    (target_summary, source_summary, applied)
}

#[test]
fn s1_identical_files_produce_an_empty_diff() {
    let contents = vec![0x42u8; (BLOCK_SIZE * 4) as usize];
    let (target_summary, _source_summary, applied) = sync(&contents, &contents);

    assert_eq!(target_summary.data_blocks, 0);
    assert_eq!(target_summary.hole_blocks, 0);
    assert_eq!(applied, contents);
}

#[test]
fn s2_single_changed_block_transmits_exactly_one_message() {
    let mut source = vec![0xAAu8; (BLOCK_SIZE * 4) as usize];
    let target = source.clone();
    source[(BLOCK_SIZE * 2) as usize] = 0xFF;

    let (target_summary, _source_summary, applied) = sync(&source, &target);

    assert_eq!(target_summary.data_blocks, 1);
    assert_eq!(target_summary.hole_blocks, 0);
    assert_eq!(applied, source);
}

#[test]
fn s3_all_zero_block_is_encoded_as_a_hole() {
    let mut source = vec![0x11u8; (BLOCK_SIZE * 3) as usize];
    let target = source.clone();
    source[BLOCK_SIZE as usize..(BLOCK_SIZE * 2) as usize].fill(0);

    let (target_summary, _source_summary, applied) = sync(&source, &target);

    assert_eq!(target_summary.data_blocks, 0);
    assert_eq!(target_summary.hole_blocks, 1);
    assert_eq!(applied, source);
}

#[test]
fn s4_source_longer_than_target_extends_and_fills_the_target() {
    let target = vec![0x22u8; (BLOCK_SIZE * 2) as usize];
    let mut source = target.clone();
    source.extend(vec![0x33u8; (BLOCK_SIZE * 2) as usize]);

    let (target_summary, _source_summary, applied) = sync(&source, &target);

    assert_eq!(target_summary.source_size, source.len() as u64);
    assert_eq!(applied, source);
}

#[test]
fn s5_source_shorter_than_target_truncates_the_target() {
    let source = vec![0x44u8; (BLOCK_SIZE * 2) as usize];
    let mut target = source.clone();
    target.extend(vec![0x55u8; (BLOCK_SIZE * 3) as usize]);

    let (target_summary, _source_summary, applied) = sync(&source, &target);

    assert_eq!(target_summary.source_size, source.len() as u64);
    assert_eq!(applied, source);
}

#[test]
fn s6_final_partial_block_round_trips() {
    let mut source = vec![0x66u8; (BLOCK_SIZE * 3 + 100) as usize];
    let target = vec![0x66u8; (BLOCK_SIZE * 3) as usize];
    let tail_start = source.len() - 50;
    source[tail_start..].fill(0x77);

    let (target_summary, _source_summary, applied) = sync(&source, &target);

    assert_eq!(target_summary.source_size, source.len() as u64);
    assert_eq!(applied, source);
}

#[test]
fn idempotent_resync_transmits_zero_block_messages() {
    let contents = vec![0x88u8; (BLOCK_SIZE * 3) as usize];
    let (_target_summary, _source_summary, applied) = sync(&contents, &contents);
    assert_eq!(applied, contents);

    let (second_summary, _source_summary, second_applied) = sync(&applied, &applied);
    assert_eq!(second_summary.data_blocks, 0);
    assert_eq!(second_summary.hole_blocks, 0);
    assert_eq!(second_applied, contents);
}
