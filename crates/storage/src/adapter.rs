//! The storage adapter trait every target backend implements.

use crate::error::AdapterError;

/// A target-side backing store for the synced file.
///
/// Implementors never need to support concurrent access: the session
/// driver issues one operation at a time and always finishes a `RECV_BLOCKS`
/// pass before calling [`Self::close`].
pub trait StorageAdapter {
    /// Reads up to `buf.len()` bytes starting at `offset`, returning the
    /// number of bytes actually read (short only at end of file).
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, AdapterError>;

    /// Writes `data` at `offset`, growing the backing store if needed.
    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), AdapterError>;

    /// Punches a hole of `len` zero bytes at `offset`. Implementations that
    /// cannot represent holes natively fall back to writing explicit zeros.
    fn punch_hole(&mut self, offset: u64, len: u64) -> Result<(), AdapterError>;

    /// Sets the logical size of the backing store.
    fn truncate(&mut self, len: u64) -> Result<(), AdapterError>;

    /// Returns the current logical size of the backing store.
    fn size(&self) -> Result<u64, AdapterError>;

    /// Flushes and releases any resources held by the adapter.
    fn close(self: Box<Self>) -> Result<(), AdapterError>;
}
