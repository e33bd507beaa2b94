//! Adapter for a fixed-size block device: no hole punching, no resizing.

use std::fs::File;
use std::io::{Seek, SeekFrom};
#[cfg(unix)]
use std::os::unix::fs::FileExt;

use crate::adapter::StorageAdapter;
use crate::error::AdapterError;

/// Backs onto a block device (or any fixed-size file) opened for read/write.
///
/// Devices have a size fixed by their underlying block layer: there is
/// nothing to punch a hole in or truncate, so both operations degrade to
/// writing explicit zero bytes (`punch_hole`) or a no-op validation
/// (`truncate`, which only succeeds when `len` already matches the
/// device's size).
pub struct DeviceAdapter {
    file: File,
    size: u64,
}

impl DeviceAdapter {
    /// Opens `file`, determining its size by seeking to the end.
    pub fn new(mut file: File) -> Result<Self, AdapterError> {
        let size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;
        Ok(Self { file, size })
    }
}

impl StorageAdapter for DeviceAdapter {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, AdapterError> {
        Ok(self.file.read_at(buf, offset)?)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), AdapterError> {
        if offset.saturating_add(data.len() as u64) > self.size {
            return Err(AdapterError::OutOfRange {
                offset,
                len: data.len() as u64,
                size: self.size,
            });
        }
        self.file.write_at(data, offset)?;
        Ok(())
    }

    fn punch_hole(&mut self, offset: u64, len: u64) -> Result<(), AdapterError> {
        let zeros = vec![0u8; len as usize];
        self.write_at(offset, &zeros)
    }

    fn truncate(&mut self, len: u64) -> Result<(), AdapterError> {
        if len != self.size {
            return Err(AdapterError::OutOfRange {
                offset: 0,
                len,
                size: self.size,
            });
        }
        Ok(())
    }

    fn size(&self) -> Result<u64, AdapterError> {
        Ok(self.size)
    }

    fn close(self: Box<Self>) -> Result<(), AdapterError> {
        Ok(())
    }
}
