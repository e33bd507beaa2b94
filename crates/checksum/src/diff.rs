//! Diffing two fingerprint streams into the set of blocks that must be sent.

use crate::stream::FingerprintStream;

/// The set of block indices that differ between a local and a remote
/// fingerprint stream, in ascending order.
///
/// Blocks present only on one side (because the two files differ in length)
/// are always included: the source has nothing to compare them against, so
/// they are conservatively treated as changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSet {
    /// Byte offsets (multiples of the shared block size) that must be
    /// transferred, in ascending order.
    pub changed_blocks: Vec<u64>,
}

impl DiffSet {
    /// Number of blocks that must be transferred.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changed_blocks.len()
    }

    /// Returns `true` when no blocks differ.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_blocks.is_empty()
    }
}

/// Compares `local` (freshly hashed on the source) against `remote`
/// (received from the target) and returns the blocks that differ.
///
/// Both streams must share the same `block_size`; this is guaranteed by the
/// session driver always hashing at the block size the target advertised.
#[must_use]
pub fn diff(local: &FingerprintStream, remote: &FingerprintStream) -> DiffSet {
    let block_size = local.block_size;
    let shared = local.fingerprints.len().min(remote.fingerprints.len());
    let mut changed_blocks = Vec::new();

    for index in 0..shared {
        if local.fingerprints[index] != remote.fingerprints[index] {
            changed_blocks.push(index as u64 * block_size);
        }
    }

    for index in shared..local.fingerprints.len() {
        changed_blocks.push(index as u64 * block_size);
    }

    DiffSet { changed_blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;

    fn stream(block_size: u64, seeds: &[u64]) -> FingerprintStream {
        FingerprintStream {
            block_size,
            fingerprints: seeds.iter().map(|&s| Fingerprint::of(s, b"x")).collect(),
        }
    }

    #[test]
    fn identical_streams_produce_no_diff() {
        let a = stream(1024, &[1, 2, 3]);
        let b = stream(1024, &[1, 2, 3]);
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn differing_block_is_reported_as_a_byte_offset() {
        let a = stream(1024, &[1, 9, 3]);
        let b = stream(1024, &[1, 2, 3]);
        let d = diff(&a, &b);
        assert_eq!(d.changed_blocks, vec![1024]);
    }

    #[test]
    fn extra_local_blocks_are_always_changed() {
        let a = stream(1024, &[1, 2, 3, 4]);
        let b = stream(1024, &[1, 2]);
        let d = diff(&a, &b);
        assert_eq!(d.changed_blocks, vec![2048, 3072]);
    }

    #[test]
    fn shorter_local_reports_only_overlapping_diffs() {
        let a = stream(1024, &[1, 9]);
        let b = stream(1024, &[1, 2, 3, 4]);
        let d = diff(&a, &b);
        assert_eq!(d.changed_blocks, vec![1024]);
    }
}
