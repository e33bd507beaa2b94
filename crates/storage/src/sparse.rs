//! Adapter for a plain regular file, using real hole punching where the
//! filesystem supports it and falling back to explicit zero writes otherwise.

use std::fs::File;
#[cfg(unix)]
use std::os::unix::fs::FileExt;

use crate::adapter::StorageAdapter;
use crate::error::AdapterError;

/// Backs onto a regular file, punching real holes via `fallocate` when the
/// filesystem allows it.
///
/// Falls back to writing explicit zero bytes when `fallocate` reports
/// `ENOTSUP` or `EOPNOTSUPP` (common on filesystems without extent-level
/// hole support, or on non-Linux Unixes) so the adapter never fails a sync
/// purely because the filesystem lacks the optimization.
pub struct SparseFileAdapter {
    file: File,
}

impl SparseFileAdapter {
    /// Wraps an already-opened, already-sized file.
    #[must_use]
    pub const fn new(file: File) -> Self {
        Self { file }
    }

    #[cfg(unix)]
    fn try_fallocate_punch(&self, offset: u64, len: u64) -> std::io::Result<bool> {
        use rustix::fs::{fallocate, FallocateFlags};

        match fallocate(
            &self.file,
            FallocateFlags::PUNCH_HOLE | FallocateFlags::KEEP_SIZE,
            offset,
            len,
        ) {
            Ok(()) => Ok(true),
            Err(errno) if errno == rustix::io::Errno::OPNOTSUPP || errno == rustix::io::Errno::NOSYS => {
                Ok(false)
            }
            Err(errno) => Err(errno.into()),
        }
    }

    #[cfg(not(unix))]
    fn try_fallocate_punch(&self, _offset: u64, _len: u64) -> std::io::Result<bool> {
        Ok(false)
    }
}

impl StorageAdapter for SparseFileAdapter {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, AdapterError> {
        Ok(self.file.read_at(buf, offset)?)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), AdapterError> {
        self.file.write_at(data, offset)?;
        Ok(())
    }

    fn punch_hole(&mut self, offset: u64, len: u64) -> Result<(), AdapterError> {
        if self.try_fallocate_punch(offset, len)? {
            return Ok(());
        }
        let zeros = vec![0u8; len as usize];
        self.file.write_at(&zeros, offset)?;
        Ok(())
    }

    fn truncate(&mut self, len: u64) -> Result<(), AdapterError> {
        self.file.set_len(len)?;
        Ok(())
    }

    fn size(&self) -> Result<u64, AdapterError> {
        Ok(self.file.metadata()?.len())
    }

    fn close(self: Box<Self>) -> Result<(), AdapterError> {
        Ok(())
    }
}
