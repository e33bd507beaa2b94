//! Fingerprint streams: computing them from a file, and the wire framing
//! used to exchange them between peers.
//!
//! Wire format (all integers little-endian):
//!
//! ```text
//! blockSize: u64
//! count:     u64
//! fingerprints: [u8; 16] * count
//! ```

use std::io::{Read, Write};

use crate::error::HashError;
use crate::fingerprint::{BlockHasher, Fingerprint, FINGERPRINT_LEN};

/// The complete set of per-block fingerprints for one file, at one block size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintStream {
    /// Size, in bytes, of every block except possibly the last.
    pub block_size: u64,
    /// Fingerprints in block order.
    pub fingerprints: Vec<Fingerprint>,
}

impl FingerprintStream {
    /// Number of blocks covered by this stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Returns `true` when the stream has no blocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Serializes the stream onto `writer` using the wire framing above.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HashError> {
        writer.write_all(&self.block_size.to_le_bytes())?;
        writer.write_all(&(self.fingerprints.len() as u64).to_le_bytes())?;
        for fp in &self.fingerprints {
            writer.write_all(fp.as_bytes())?;
        }
        Ok(())
    }

    /// Reads a stream previously written by [`Self::write_to`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, HashError> {
        let mut header = [0u8; 16];
        reader.read_exact(&mut header)?;
        let block_size = u64::from_le_bytes(header[0..8].try_into().unwrap());
        let count = u64::from_le_bytes(header[8..16].try_into().unwrap());

        validate_block_size(block_size)?;

        let mut fingerprints = Vec::with_capacity(count.min(1 << 20) as usize);
        let mut buf = [0u8; FINGERPRINT_LEN];
        for _ in 0..count {
            reader.read_exact(&mut buf)?;
            fingerprints.push(Fingerprint::from_bytes(buf));
        }

        if fingerprints.len() as u64 != count {
            return Err(HashError::FingerprintCountMismatch {
                declared: count,
                actual: fingerprints.len() as u64,
            });
        }

        Ok(Self {
            block_size,
            fingerprints,
        })
    }
}

/// Checks that `block_size` is a non-zero power of two, as required for a
/// fingerprint stream's block size.
pub fn validate_block_size(block_size: u64) -> Result<(), HashError> {
    if block_size == 0 || !block_size.is_power_of_two() {
        return Err(HashError::InvalidBlockSize(block_size));
    }
    Ok(())
}

/// Hashes `reader` in `block_size`-aligned chunks, returning one fingerprint
/// per block (the final block may be shorter than `block_size`).
///
/// Uses a single reusable buffer, never allocating per block, so memory use
/// stays O(1) in file size.
pub fn hash_reader<R: Read>(
    mut reader: R,
    block_size: u64,
    seed: u64,
) -> Result<FingerprintStream, HashError> {
    validate_block_size(block_size)?;

    let mut buf = vec![0u8; block_size as usize];
    let mut fingerprints = Vec::new();

    loop {
        let mut filled = 0;
        while filled < buf.len() {
            let read = reader.read(&mut buf[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        if filled == 0 {
            break;
        }

        let mut hasher = BlockHasher::new(seed);
        hasher.update(&buf[..filled]);
        fingerprints.push(hasher.finalize());

        if filled < buf.len() {
            break;
        }
    }

    Ok(FingerprintStream {
        block_size,
        fingerprints,
    })
}
