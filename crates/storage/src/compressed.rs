//! A minimal compressed, hole-aware container used as the default target
//! backing store when `--no-compress` is not set and the target path is a
//! regular file rather than a block device.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! header: magic[8] version:u32 chunk_size:u64 total_size:u64 chunk_count:u64
//! index:  (stored_len:u32 logical_len:u32 flags:u32 reserved:u32) * chunk_count
//! data:   chunk_size bytes per chunk, only the first stored_len meaningful
//! ```
//!
//! A chunk whose `stored_len` is zero is a hole: every logical byte in it
//! reads back as zero, and the on-disk slot is punched rather than written.
//! Chunks are addressed directly (`header + index + index * chunk_size`),
//! so reading or writing a byte range never requires scanning the index.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
#[cfg(unix)]
use std::os::unix::fs::FileExt;

use compress::zstd::{compress_to_vec, decompress_to_vec};

use crate::adapter::StorageAdapter;
use crate::error::AdapterError;

const MAGIC: &[u8; 8] = b"BSYNCSPG";
const VERSION: u32 = 1;
const HEADER_LEN: u64 = 8 + 4 + 8 + 8 + 8;
const INDEX_ENTRY_LEN: u64 = 16;
const FLAG_COMPRESSED: u32 = 0b01;

/// Backs onto a regular file using the layout documented above.
pub struct CompressedSparseAdapter {
    file: File,
    chunk_size: u64,
    total_size: u64,
    chunk_count: u64,
}

impl CompressedSparseAdapter {
    /// Creates a fresh container for a file of `total_size` bytes, grouped
    /// into chunks of `chunk_size` bytes (independent of the sync protocol's
    /// own block size).
    pub fn create(mut file: File, chunk_size: u64, total_size: u64) -> Result<Self, AdapterError> {
        let chunk_count = chunk_count_for(total_size, chunk_size);
        let mut adapter = Self {
            file: {
                file.set_len(0)?;
                file
            },
            chunk_size,
            total_size,
            chunk_count,
        };
        adapter.write_header()?;
        adapter.zero_index()?;
        let file_len = adapter.data_offset() + adapter.chunk_count * adapter.chunk_size;
        adapter.file.set_len(file_len)?;
        Ok(adapter)
    }

    /// Opens a container previously created by [`Self::create`].
    pub fn open(mut file: File) -> Result<Self, AdapterError> {
        file.seek(SeekFrom::Start(0))?;
        let mut header = [0u8; HEADER_LEN as usize];
        file.read_exact(&mut header)?;

        if &header[0..8] != MAGIC {
            return Err(AdapterError::NotCompressedSparse);
        }
        let version = u32::from_le_bytes(header[8..12].try_into().unwrap());
        if version != VERSION {
            return Err(AdapterError::UnsupportedVersion(version));
        }
        let chunk_size = u64::from_le_bytes(header[12..20].try_into().unwrap());
        let total_size = u64::from_le_bytes(header[20..28].try_into().unwrap());
        let chunk_count = u64::from_le_bytes(header[28..36].try_into().unwrap());

        Ok(Self {
            file,
            chunk_size,
            total_size,
            chunk_count,
        })
    }

    /// Peeks at the first 8 bytes of `file`, returning `true` if they match
    /// the magic written by [`Self::create`].
    pub fn looks_like(file: &File) -> Result<bool, AdapterError> {
        let mut probe = [0u8; 8];
        match file.read_exact_at(&mut probe, 0) {
            Ok(()) => Ok(&probe == MAGIC),
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn index_len(&self) -> u64 {
        self.chunk_count * INDEX_ENTRY_LEN
    }

    fn data_offset(&self) -> u64 {
        HEADER_LEN + self.index_len()
    }

    fn slot_offset(&self, chunk_index: u64) -> u64 {
        self.data_offset() + chunk_index * self.chunk_size
    }

    fn index_entry_offset(&self, chunk_index: u64) -> u64 {
        HEADER_LEN + chunk_index * INDEX_ENTRY_LEN
    }

    fn logical_len_for(&self, chunk_index: u64) -> u64 {
        if self.chunk_count == 0 {
            return 0;
        }
        if chunk_index + 1 < self.chunk_count {
            self.chunk_size
        } else {
            let covered = chunk_index * self.chunk_size;
            self.total_size.saturating_sub(covered)
        }
    }

    fn write_header(&mut self) -> Result<(), AdapterError> {
        let mut header = [0u8; HEADER_LEN as usize];
        header[0..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&VERSION.to_le_bytes());
        header[12..20].copy_from_slice(&self.chunk_size.to_le_bytes());
        header[20..28].copy_from_slice(&self.total_size.to_le_bytes());
        header[28..36].copy_from_slice(&self.chunk_count.to_le_bytes());
        self.file.write_at(&header, 0)?;
        Ok(())
    }

    fn zero_index(&mut self) -> Result<(), AdapterError> {
        if self.chunk_count == 0 {
            return Ok(());
        }
        let zeros = vec![0u8; self.index_len() as usize];
        self.file.write_at(&zeros, HEADER_LEN)?;
        Ok(())
    }

    fn read_index_entry(&mut self, chunk_index: u64) -> Result<(u32, u32, u32), AdapterError> {
        let mut buf = [0u8; INDEX_ENTRY_LEN as usize];
        self.file
            .read_at(&mut buf, self.index_entry_offset(chunk_index))?;
        let stored_len = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let logical_len = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        let flags = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        Ok((stored_len, logical_len, flags))
    }

    fn write_index_entry(
        &mut self,
        chunk_index: u64,
        stored_len: u32,
        logical_len: u32,
        flags: u32,
    ) -> Result<(), AdapterError> {
        let mut buf = [0u8; INDEX_ENTRY_LEN as usize];
        buf[0..4].copy_from_slice(&stored_len.to_le_bytes());
        buf[4..8].copy_from_slice(&logical_len.to_le_bytes());
        buf[8..12].copy_from_slice(&flags.to_le_bytes());
        self.file
            .write_at(&buf, self.index_entry_offset(chunk_index))?;
        Ok(())
    }

    fn read_chunk(&mut self, chunk_index: u64) -> Result<Vec<u8>, AdapterError> {
        let logical_len = self.logical_len_for(chunk_index);
        let (stored_len, _, flags) = self.read_index_entry(chunk_index)?;
        if stored_len == 0 {
            return Ok(vec![0u8; logical_len as usize]);
        }

        let mut stored = vec![0u8; stored_len as usize];
        self.file
            .read_at(&mut stored, self.slot_offset(chunk_index))?;

        if flags & FLAG_COMPRESSED != 0 {
            Ok(decompress_to_vec(&stored)?)
        } else {
            Ok(stored)
        }
    }

    fn write_chunk(&mut self, chunk_index: u64, logical: &[u8]) -> Result<(), AdapterError> {
        let all_zero = logical.iter().all(|&b| b == 0);
        if all_zero {
            self.punch_chunk_slot(chunk_index)?;
            self.write_index_entry(chunk_index, 0, logical.len() as u32, 0)?;
            return Ok(());
        }

        let compressed = compress_to_vec(logical, compress::zstd::default_level())?;
        let (stored, flags) = if compressed.len() < logical.len() {
            (compressed, FLAG_COMPRESSED)
        } else {
            (logical.to_vec(), 0)
        };

        self.file.write_at(&stored, self.slot_offset(chunk_index))?;
        self.write_index_entry(
            chunk_index,
            stored.len() as u32,
            logical.len() as u32,
            flags,
        )?;

        let tail = self.chunk_size.saturating_sub(stored.len() as u64);
        if tail > 0 {
            self.punch_region(self.slot_offset(chunk_index) + stored.len() as u64, tail)?;
        }
        Ok(())
    }

    fn punch_chunk_slot(&mut self, chunk_index: u64) -> Result<(), AdapterError> {
        self.punch_region(self.slot_offset(chunk_index), self.chunk_size)
    }

    #[cfg(unix)]
    fn punch_region(&mut self, offset: u64, len: u64) -> Result<(), AdapterError> {
        use rustix::fs::{fallocate, FallocateFlags};
        if len == 0 {
            return Ok(());
        }
        match fallocate(
            &self.file,
            FallocateFlags::PUNCH_HOLE | FallocateFlags::KEEP_SIZE,
            offset,
            len,
        ) {
            Ok(()) => Ok(()),
            Err(errno)
                if errno == rustix::io::Errno::OPNOTSUPP || errno == rustix::io::Errno::NOSYS =>
            {
                Ok(())
            }
            Err(errno) => Err(errno.into()),
        }
    }

    #[cfg(not(unix))]
    fn punch_region(&mut self, _offset: u64, _len: u64) -> Result<(), AdapterError> {
        Ok(())
    }
}

fn chunk_count_for(total_size: u64, chunk_size: u64) -> u64 {
    if total_size == 0 {
        0
    } else {
        total_size.div_ceil(chunk_size)
    }
}

impl StorageAdapter for CompressedSparseAdapter {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize, AdapterError> {
        if self.chunk_size == 0 {
            return Ok(0);
        }
        let mut produced = 0usize;
        let mut pos = offset;
        while produced < buf.len() && pos < self.total_size {
            let chunk_index = pos / self.chunk_size;
            let chunk_start = chunk_index * self.chunk_size;
            let in_chunk_offset = (pos - chunk_start) as usize;

            let chunk = self.read_chunk(chunk_index)?;
            let available = chunk.len().saturating_sub(in_chunk_offset);
            let wanted = (buf.len() - produced).min(available);
            if wanted == 0 {
                break;
            }
            buf[produced..produced + wanted]
                .copy_from_slice(&chunk[in_chunk_offset..in_chunk_offset + wanted]);
            produced += wanted;
            pos += wanted as u64;
        }
        Ok(produced)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<(), AdapterError> {
        if data.is_empty() {
            return Ok(());
        }
        if offset + data.len() as u64 > self.total_size {
            return Err(AdapterError::OutOfRange {
                offset,
                len: data.len() as u64,
                size: self.total_size,
            });
        }

        let mut consumed = 0usize;
        let mut pos = offset;
        while consumed < data.len() {
            let chunk_index = pos / self.chunk_size;
            let chunk_start = chunk_index * self.chunk_size;
            let in_chunk_offset = (pos - chunk_start) as usize;
            let logical_len = self.logical_len_for(chunk_index) as usize;

            let mut chunk = self.read_chunk(chunk_index)?;
            chunk.resize(logical_len, 0);

            let room = logical_len - in_chunk_offset;
            let take = (data.len() - consumed).min(room);
            chunk[in_chunk_offset..in_chunk_offset + take]
                .copy_from_slice(&data[consumed..consumed + take]);

            self.write_chunk(chunk_index, &chunk)?;

            consumed += take;
            pos += take as u64;
        }
        Ok(())
    }

    fn punch_hole(&mut self, offset: u64, len: u64) -> Result<(), AdapterError> {
        let zeros = vec![0u8; len as usize];
        self.write_at(offset, &zeros)
    }

    fn truncate(&mut self, len: u64) -> Result<(), AdapterError> {
        let new_chunk_count = chunk_count_for(len, self.chunk_size.max(1));
        if new_chunk_count <= self.chunk_count {
            self.total_size = len;
            self.chunk_count = new_chunk_count;
            self.write_header()?;
            let file_len = self.data_offset() + self.chunk_count * self.chunk_size;
            self.file.set_len(file_len)?;
            return Ok(());
        }

        let mut chunks = Vec::with_capacity(self.chunk_count as usize);
        for index in 0..self.chunk_count {
            chunks.push(self.read_chunk(index)?);
        }

        self.total_size = len;
        self.chunk_count = new_chunk_count;
        self.write_header()?;
        self.zero_index()?;
        let file_len = self.data_offset() + self.chunk_count * self.chunk_size;
        self.file.set_len(file_len)?;

        for (index, chunk) in chunks.into_iter().enumerate() {
            self.write_chunk(index as u64, &chunk)?;
        }
        Ok(())
    }

    fn size(&self) -> Result<u64, AdapterError> {
        Ok(self.total_size)
    }

    fn close(self: Box<Self>) -> Result<(), AdapterError> {
        self.file.sync_all()?;
        Ok(())
    }
}
