//! Integration-level round-trip coverage for the zstd helpers, exercised as
//! an external crate the way the wire codec consumes them.

use compress::zstd::{compress_to_vec, decompress_to_vec, CountingZstdDecoder, CountingZstdEncoder};
use std::io::Read;

#[test]
fn large_highly_compressible_input_round_trips() {
    let input: Vec<u8> = std::iter::repeat(b"sync me please ".iter().copied())
        .take(4096)
        .flatten()
        .collect();

    let compressed = compress_to_vec(&input, 3).unwrap();
    assert!(compressed.len() < input.len());

    let decompressed = decompress_to_vec(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn incompressible_input_still_round_trips() {
    let mut input = vec![0u8; 2048];
    let mut state = 0x9E3779B9u32;
    for byte in &mut input {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        *byte = (state >> 24) as u8;
    }

    let compressed = compress_to_vec(&input, 3).unwrap();
    let decompressed = decompress_to_vec(&compressed).unwrap();
    assert_eq!(decompressed, input);
}

#[test]
fn streaming_encoder_and_decoder_agree_with_one_shot_helpers() {
    let input = b"streamed across several write calls, one block at a time";

    let mut encoder = CountingZstdEncoder::with_sink(Vec::new(), 3).unwrap();
    for chunk in input.chunks(7) {
        encoder.write(chunk).unwrap();
    }
    let (compressed, bytes_written) = encoder.finish_into_inner().unwrap();
    assert_eq!(bytes_written as usize, compressed.len());

    let mut decoder = CountingZstdDecoder::new(&compressed[..]).unwrap();
    let mut output = Vec::new();
    decoder.read_to_end(&mut output).unwrap();
    assert_eq!(output, input);
    assert_eq!(decoder.bytes_read(), output.len() as u64);
}
