//! Seeded 128-bit block fingerprints.
//!
//! A non-cryptographic fingerprint is sufficient here: the sync protocol is
//! an integrity shortcut, not an authentication mechanism, and the caller is
//! assumed to already have a secure transport underneath. XXH3-128 gives a
//! fast streaming hasher with a low accidental-collision rate at the block
//! counts this protocol deals with.

use std::fmt;

/// Width, in bytes, of a [`Fingerprint`].
pub const FINGERPRINT_LEN: usize = 16;

/// A single block's fingerprint.
///
/// # Examples
///
/// ```
/// use checksum::Fingerprint;
///
/// let a = Fingerprint::of(0, b"block contents");
/// let b = Fingerprint::of(0, b"block contents");
/// assert_eq!(a, b);
///
/// let c = Fingerprint::of(1, b"block contents");
/// assert_ne!(a, c);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Computes the fingerprint of `data` in one shot using `seed`.
    #[must_use]
    pub fn of(seed: u64, data: &[u8]) -> Self {
        Self(xxh3::hash128_with_seed(data, seed).to_le_bytes())
    }

    /// Returns the fingerprint's raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Builds a fingerprint from raw bytes, as read off the wire.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Streaming hasher producing one [`Fingerprint`] per update/reset cycle.
///
/// Mirrors the shape of a `StrongDigest` implementation: `update` feeds
/// bytes incrementally, `finalize` consumes the hasher and returns the
/// digest. `blocksync` only ever finalizes once per block, so there is no
/// `reset` — callers construct a fresh hasher per block instead.
pub struct BlockHasher {
    inner: xxhash_rust::xxh3::Xxh3,
}

impl BlockHasher {
    /// Creates a hasher seeded for the current session.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: xxhash_rust::xxh3::Xxh3::with_seed(seed),
        }
    }

    /// Feeds additional bytes into the digest state.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalizes the digest into a [`Fingerprint`].
    #[must_use]
    pub fn finalize(self) -> Fingerprint {
        Fingerprint(self.inner.digest128().to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_matches_streaming() {
        let seed = 7;
        let data = b"The quick brown fox jumps over the lazy dog";

        let one_shot = Fingerprint::of(seed, data);

        let mut hasher = BlockHasher::new(seed);
        let mid = data.len() / 2;
        hasher.update(&data[..mid]);
        hasher.update(&data[mid..]);
        let streamed = hasher.finalize();

        assert_eq!(one_shot, streamed);
    }

    #[test]
    fn different_seeds_differ() {
        let data = b"same data, different seed";
        assert_ne!(Fingerprint::of(0, data), Fingerprint::of(1, data));
    }

    #[test]
    fn round_trips_through_bytes() {
        let fp = Fingerprint::of(0, b"round trip");
        let restored = Fingerprint::from_bytes(*fp.as_bytes());
        assert_eq!(fp, restored);
    }

    #[test]
    fn debug_format_is_hex() {
        let fp = Fingerprint::from_bytes([0xab; FINGERPRINT_LEN]);
        assert_eq!(format!("{fp:?}"), "ab".repeat(FINGERPRINT_LEN));
    }
}
